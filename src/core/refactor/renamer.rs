use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::backup;
use crate::cleanup;
use crate::defaults::RenamerConfig;
use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::logs::Logger;
use crate::tree::{build_tree, RuleChain, TreeNode};

use super::progress::{ProgressCounter, ProgressRecord, ProgressSink};
use super::strategy::RenameStrategy;

/// Notifications raised by the renamer. Every method defaults to a no-op.
pub trait RenamerEvents {
    fn target_folder_added(&mut self, _path: &Path, _is_valid: bool) {}
    fn names_set(&mut self, _from_valid: bool, _to_valid: bool) {}
    fn rename_finished(&mut self) {}
}

/// Check a candidate solution name. Returns a human message when invalid.
pub fn validate_name(candidate: &str, config: &RenamerConfig) -> Option<String> {
    let problem = if candidate.trim().is_empty() {
        "Null or whitespace names are not allowed."
    } else if candidate.starts_with(|c: char| c.is_ascii_digit()) {
        "Names cannot start with a number."
    } else if candidate.contains(char::is_whitespace) {
        "Spaces are not allowed."
    } else if candidate.starts_with('.') || candidate.ends_with('.') || candidate.contains("..") {
        "Dots cannot be at the beginning, end, or adjacent to each other."
    } else if !candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        "Only a-Z, 0-9, _ and . are allowed in the name."
    } else if candidate.split('.').any(|segment| config.is_reserved(segment)) {
        "Reserved words in c# cannot be used as a solution name."
    } else {
        return None;
    };

    Some(problem.to_string())
}

/// Drives one solution rename: name validation, target selection, the
/// backup gate, the post-order rename walk and folder cleanup.
///
/// Not reentrant. A finished run must be followed by `set_target_folder`
/// before `do_rename` is accepted again.
pub struct Renamer<'a> {
    logger: &'a dyn Logger,
    fs: Box<dyn FileSystem>,
    rules: RuleChain,
    config: RenamerConfig,
    events: Option<Box<dyn RenamerEvents + 'a>>,
    old_name: Option<String>,
    new_name: Option<String>,
    root: Option<TreeNode>,
    completed: bool,
}

impl<'a> Renamer<'a> {
    pub fn new(logger: &'a dyn Logger, fs: Box<dyn FileSystem>, config: RenamerConfig) -> Self {
        Self {
            logger,
            fs,
            rules: RuleChain::standard(),
            config,
            events: None,
            old_name: None,
            new_name: None,
            root: None,
            completed: false,
        }
    }

    pub fn with_rules(mut self, rules: RuleChain) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_events(mut self, events: Box<dyn RenamerEvents + 'a>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &RenamerConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn target_folder(&self) -> Option<&Path> {
        self.root.as_ref().map(TreeNode::path)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn ready(&self) -> bool {
        self.missing().is_empty()
    }

    fn missing(&self) -> Vec<String> {
        let blank = |name: &Option<String>| name.as_deref().map_or(true, |n| n.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.old_name) {
            missing.push("from".to_string());
        }
        if blank(&self.new_name) {
            missing.push("to".to_string());
        }
        if self.root.is_none() {
            missing.push("target_folder".to_string());
        }
        missing
    }

    /// Store both names. Invalid names are logged, never rejected.
    pub fn set_rename(&mut self, old_name: &str, new_name: &str) {
        let from_problem = validate_name(old_name, &self.config);
        let to_problem = validate_name(new_name, &self.config);
        let from_blank = old_name.trim().is_empty();
        let to_blank = new_name.trim().is_empty();

        match (&from_problem, &to_problem) {
            (Some(msg), _) if !from_blank => self
                .logger
                .write_warning(&format!("'From' solution name is invalid: {}", msg)),
            (_, Some(msg)) if !to_blank => self
                .logger
                .write_warning(&format!("'To' solution name is invalid: {}", msg)),
            (None, None) => self.logger.write_info("solution names are valid."),
            _ => {}
        }

        self.old_name = Some(old_name.to_string());
        self.new_name = Some(new_name.to_string());

        if let Some(events) = self.events.as_mut() {
            events.names_set(from_problem.is_none(), to_problem.is_none());
        }
    }

    /// Select `path` and rebuild the tree. Blank or invalid folders are
    /// logged and leave the current selection untouched.
    pub fn set_target_folder(&mut self, path: &Path) -> Result<()> {
        let shown = path.display().to_string();

        if shown.trim().is_empty() {
            self.logger
                .write_warning("Invalid folder selected. Folder: [empty]");
            return Ok(());
        }

        if !self.fs.is_valid_folder(path) {
            self.logger
                .write_warning(&format!("'{}' is not a valid folder.", shown));
            return Ok(());
        }

        let root = build_tree(path, &self.rules, self.fs.as_ref())?;
        let is_valid = root.contains_exactly_one_solution_file();

        self.logger.write_info(&format!("'{}' folder selected.", shown));
        self.root = Some(root);
        self.completed = false;

        if !is_valid {
            self.logger.write_warning(
                "WARNING: no solution or more than one solution was found in this folder.",
            );
        }

        if let Some(events) = self.events.as_mut() {
            events.target_folder_added(path, is_valid);
        }

        Ok(())
    }

    /// Back up the target folder and rename everything in it.
    ///
    /// A failed backup is reported through `sink` as an error at 1.0 and
    /// returns `Ok` with nothing changed on disk; `is_completed()` stays false.
    pub fn do_rename(&mut self, sink: &mut dyn ProgressSink) -> Result<()> {
        if self.completed {
            let target = self
                .target_folder()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            return Err(Error::rename_already_completed(target));
        }

        let missing = self.missing();
        if !missing.is_empty() {
            return Err(Error::rename_not_ready(missing));
        }
        let (Some(old_name), Some(new_name), Some(mut root)) = (
            self.old_name.clone(),
            self.new_name.clone(),
            self.root.take(),
        ) else {
            return Err(Error::rename_not_ready(missing));
        };

        sink.report(ProgressRecord::info("=== Starting rename process ===", 0.0));
        sink.report(ProgressRecord::info("Backing up solution folder to zip", 0.1));

        let outcome = backup::backup(
            &root,
            &old_name,
            self.config.backup_max_attempts,
            self.fs.as_ref(),
        );
        if !outcome.success {
            sink.report(ProgressRecord::error(outcome.message, 1.0));
            self.root = Some(root);
            return Ok(());
        }
        sink.report(ProgressRecord::info(outcome.message, 0.3));
        pause(self.config.backup_delay());

        let mut walk = Walk {
            old_name: &old_name,
            new_name: &new_name,
            fs: self.fs.as_ref(),
            sink: &mut *sink,
            counter: ProgressCounter::new(root.item_count(false)),
            delay: self.config.progress_delay(),
        };
        walk.visit(&mut root);

        sink.report(ProgressRecord::info("=== Finished rename process ===", 1.0));
        self.root = Some(root);
        self.completed = true;

        if let Some(events) = self.events.as_mut() {
            events.rename_finished();
        }

        Ok(())
    }

    /// Re-select the current target and empty every `folder_name` directory
    /// in it. True only when every matched directory was cleaned.
    pub fn clean_folders(&mut self, folder_name: &str) -> bool {
        let Some(path) = self.target_folder().map(Path::to_path_buf) else {
            self.logger.write_warning("Target folder is not set!");
            return false;
        };

        if let Err(e) = self.set_target_folder(&path) {
            self.logger
                .write_warning_with("Clean was not successful.", &e.detail_text());
            return false;
        }

        let Some(root) = self.root.as_mut() else {
            return false;
        };

        let outcomes = match cleanup::clean_folders(root, folder_name, self.fs.as_ref()) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                self.logger
                    .write_warning_with("Clean was not successful.", &e.message);
                return false;
            }
        };

        let mut all_succeeded = true;
        for outcome in &outcomes {
            if outcome.success {
                self.logger.write_info(&outcome.message);
            } else {
                self.logger.write_warning(&outcome.message);
                all_succeeded = false;
            }
        }

        if !all_succeeded {
            self.logger.write_warning("Clean was not successful.");
        }

        all_succeeded
    }
}

/// State for one post-order rename walk.
struct Walk<'w, S: ProgressSink + ?Sized> {
    old_name: &'w str,
    new_name: &'w str,
    fs: &'w dyn FileSystem,
    sink: &'w mut S,
    counter: ProgressCounter,
    delay: Duration,
}

impl<S: ProgressSink + ?Sized> Walk<'_, S> {
    fn visit(&mut self, node: &mut TreeNode) {
        if !node.is_included {
            let fraction = self.counter.advance();
            self.emit(ProgressRecord::info(
                format!("{}: Skipped.", node.path().display()),
                fraction,
            ));
            return;
        }

        for child in node.children.iter_mut() {
            self.visit(child);
        }

        let outcome =
            RenameStrategy::for_node(node).rename(node, self.old_name, self.new_name, self.fs);
        let fraction = self.counter.advance();
        self.emit(ProgressRecord::new(outcome.message, fraction, !outcome.success));
    }

    fn emit(&mut self, record: ProgressRecord) {
        self.sink.report(record);
        pause(self.delay);
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
