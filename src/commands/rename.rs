use clap::Args;
use serde::Serialize;

use solution_renamer::local_files::LocalFs;
use solution_renamer::logs::{LogEntry, Logger, MemoryLogger, StatusLogger, TeeLogger};
use solution_renamer::refactor::path_utils::{can_replace_path, replace_filename};
use solution_renamer::refactor::{validate_name, ProgressRecord, Renamer};
use solution_renamer::tree::TreeNode;
use solution_renamer::utils::validation;
use solution_renamer::Error;

use crate::commands::{resolve_target, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct RenameArgs {
    /// Solution folder to rename
    #[arg(long)]
    pub path: String,
    /// Current solution name
    #[arg(long)]
    pub from: String,
    /// New solution name
    #[arg(long)]
    pub to: String,
    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "command")]
pub enum RenameOutput {
    #[serde(rename = "rename.plan")]
    Plan {
        from: String,
        to: String,
        root: String,
        is_solution_folder: bool,
        total_items: usize,
        included_items: usize,
        path_renames: Vec<PathRename>,
        log: Vec<LogEntry>,
    },
    #[serde(rename = "rename.apply")]
    Apply {
        from: String,
        to: String,
        root: String,
        completed: bool,
        errors: usize,
        progress: Vec<ProgressRecord>,
        log: Vec<LogEntry>,
    },
}

#[derive(Debug, Serialize)]
pub struct PathRename {
    pub from: String,
    pub to: String,
}

pub fn run(args: RenameArgs, global: &GlobalArgs) -> CmdResult<RenameOutput> {
    let from = validation::require_non_empty(&args.from, "from", "'From' name is required")?;
    let to = validation::require_non_empty(&args.to, "to", "'To' name is required")?;
    for (field, name) in [("from", from), ("to", to)] {
        if let Some(problem) = validate_name(name, &global.config) {
            return Err(Error::validation_invalid_name(field, name, problem));
        }
    }
    let path = resolve_target(&args.path)?;

    let memory = MemoryLogger::new();
    let status = StatusLogger::new();
    let logger = TeeLogger::new(&status, &memory);

    let mut renamer = Renamer::new(&logger, Box::new(LocalFs::new()), global.config.clone());
    renamer.set_rename(from, to);
    renamer.set_target_folder(&path)?;

    let root = validation::require(renamer.root(), "path", "Target folder could not be selected")?;

    if !args.write {
        let mut path_renames = Vec::new();
        plan_renames(root, from, to, &mut path_renames);

        return Ok((
            RenameOutput::Plan {
                from: from.to_string(),
                to: to.to_string(),
                root: root.path().display().to_string(),
                is_solution_folder: root.contains_exactly_one_solution_file(),
                total_items: root.item_count(true),
                included_items: root.item_count(false),
                path_renames,
                log: memory.entries(),
            },
            0,
        ));
    }

    let root_display = root.path().display().to_string();
    let mut progress: Vec<ProgressRecord> = Vec::new();
    let mut sink = |record: ProgressRecord| {
        if record.is_error {
            status.write_warning(&record.message);
        } else {
            status.write_info(&record.message);
        }
        progress.push(record);
    };
    renamer.do_rename(&mut sink)?;

    if !renamer.is_completed() {
        let reason = progress
            .iter()
            .rev()
            .find(|r| r.is_error)
            .map(|r| r.message.clone())
            .unwrap_or_else(|| "Backup failed.".to_string());
        return Err(Error::backup_failed(reason));
    }

    let errors = progress.iter().filter(|r| r.is_error).count();
    let exit_code = if errors > 0 { 1 } else { 0 };

    Ok((
        RenameOutput::Apply {
            from: from.to_string(),
            to: to.to_string(),
            root: root_display,
            completed: true,
            errors,
            progress,
            log: memory.entries(),
        },
        exit_code,
    ))
}

/// Paths whose final segment would change, in walk order. Excluded
/// subtrees are not entered.
fn plan_renames(node: &TreeNode, from: &str, to: &str, out: &mut Vec<PathRename>) {
    if !node.is_included {
        return;
    }

    for child in &node.children {
        plan_renames(child, from, to, out);
    }

    let target = replace_filename(node.path(), from, to);
    if can_replace_path(node.path(), &target) {
        out.push(PathRename {
            from: node.path().display().to_string(),
            to: target.display().to_string(),
        });
    }
}
