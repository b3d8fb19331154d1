use std::path::{Path, PathBuf};

use solution_renamer::defaults::{self, RenamerConfig};
use solution_renamer::local_files::{FileSystem, LocalFs};
use solution_renamer::refactor::path_utils;
use solution_renamer::utils::validation;

pub type CmdResult<T> = solution_renamer::Result<(T, i32)>;

/// Context shared by every command.
pub(crate) struct GlobalArgs {
    pub config: RenamerConfig,
}

impl GlobalArgs {
    /// Use `config_path` when given, otherwise the user config with built-in fallback.
    pub fn load(config_path: Option<&str>) -> solution_renamer::Result<Self> {
        let config = match config_path {
            Some(path) => defaults::load_config_from_file(&expand_path(path))?,
            None => defaults::load_config(),
        };
        Ok(Self { config })
    }
}

/// Tilde-expand and absolutize a path given on the command line.
pub(crate) fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    path_utils::normalize(Path::new(expanded.as_ref()))
}

/// Resolve `--path` to an existing, rooted directory.
pub(crate) fn resolve_target(raw: &str) -> solution_renamer::Result<PathBuf> {
    let raw = validation::require_non_empty(raw, "path", "Target folder is required")?;
    let path = expand_path(raw);

    if !LocalFs::new().is_valid_folder(&path) {
        return Err(solution_renamer::Error::validation_invalid_argument(
            "path",
            format!("'{}' is not a valid folder.", path.display()),
        ));
    }

    Ok(path)
}

pub mod clean;
pub mod config;
pub mod rename;
pub mod tree;
pub mod validate;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (solution_renamer::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Validate(args) => dispatch!(args, global, validate),
        crate::Commands::Tree(args) => dispatch!(args, global, tree),
        crate::Commands::Rename(args) => dispatch!(args, global, rename),
        crate::Commands::Clean(args) => dispatch!(args, global, clean),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
