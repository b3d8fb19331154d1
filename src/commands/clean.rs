use clap::Args;
use serde::Serialize;

use solution_renamer::local_files::LocalFs;
use solution_renamer::logs::{LogEntry, MemoryLogger, StatusLogger, TeeLogger};
use solution_renamer::refactor::Renamer;
use solution_renamer::utils::validation;

use crate::commands::{resolve_target, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct CleanArgs {
    /// Solution folder to clean
    #[arg(long)]
    pub path: String,
    /// Folder name to empty (repeatable; defaults to the configured list)
    #[arg(long = "folder", value_name = "NAME")]
    pub folders: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CleanOutput {
    pub command: &'static str,
    pub root: String,
    pub success: bool,
    pub folders: Vec<FolderResult>,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Serialize)]
pub struct FolderResult {
    pub folder: String,
    pub success: bool,
}

pub fn run(args: CleanArgs, global: &GlobalArgs) -> CmdResult<CleanOutput> {
    let folders = if args.folders.is_empty() {
        global.config.clean_folders.clone()
    } else {
        args.folders
    };
    validation::require_non_empty_vec(&folders, "folder", "No folder names to clean")?;
    let path = resolve_target(&args.path)?;

    let memory = MemoryLogger::new();
    let status = StatusLogger::new();
    let logger = TeeLogger::new(&status, &memory);

    let mut renamer = Renamer::new(&logger, Box::new(LocalFs::new()), global.config.clone());
    renamer.set_target_folder(&path)?;

    // Stops at the first folder name that fails.
    let mut results = Vec::new();
    for folder in folders {
        let success = renamer.clean_folders(&folder);
        results.push(FolderResult { folder, success });
        if !success {
            break;
        }
    }

    let success = results.iter().all(|r| r.success);

    Ok((
        CleanOutput {
            command: "clean",
            root: path.display().to_string(),
            success,
            folders: results,
            log: memory.entries(),
        },
        if success { 0 } else { 1 },
    ))
}
