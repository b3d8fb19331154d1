//! Per-node rename operations.
//!
//! Directories are moved; files have their contents rewritten and are then
//! moved. Failures are folded into the returned `Outcome` so a walk over the
//! whole tree can keep going.

use std::path::Path;

use regex::{NoExpand, RegexBuilder};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::tree::{FileType, TreeNode};

use super::path_utils::{can_replace_path, replace_filename};

/// Message plus success flag for one unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub message: String,
    pub success: bool,
}

impl Outcome {
    pub fn new(message: impl Into<String>, success: bool) -> Self {
        Self {
            message: message.into(),
            success,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, true)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStrategy {
    Directory,
    File,
}

impl RenameStrategy {
    pub fn for_file_type(file_type: FileType) -> Self {
        if file_type == FileType::Directory {
            RenameStrategy::Directory
        } else {
            RenameStrategy::File
        }
    }

    pub fn for_node(node: &TreeNode) -> Self {
        Self::for_file_type(node.file_type)
    }

    /// Apply this strategy to `node`. Excluded nodes are reported as skipped.
    pub fn rename(
        &self,
        node: &mut TreeNode,
        old_name: &str,
        new_name: &str,
        fs: &dyn FileSystem,
    ) -> Outcome {
        match self {
            RenameStrategy::Directory => rename_directory(node, old_name, new_name, fs),
            RenameStrategy::File => rename_file(node, old_name, new_name, fs),
        }
    }
}

fn rename_directory(
    node: &mut TreeNode,
    old_name: &str,
    new_name: &str,
    fs: &dyn FileSystem,
) -> Outcome {
    let mut message = format!("{}: ", node.path().display());

    if !node.is_included {
        message.push_str("Directory skipped.");
        return Outcome::success(message);
    }

    let current = node.path().to_path_buf();
    let target = replace_filename(&current, old_name, new_name);

    if !can_replace_path(&current, &target) {
        message.push_str("Directory unchanged.");
        return Outcome::success(message);
    }

    match fs.rename(&current, &target) {
        Ok(()) => {
            message.push_str(&format!(
                "Renamed '{}' directory to '{}'. ",
                current.display(),
                target.display()
            ));
            node.set_path(target);
            Outcome::success(message)
        }
        Err(e) => {
            message.push_str(&format!(
                "Failed to rename '{}'. {}. ",
                current.display(),
                e.detail_text()
            ));
            Outcome::failure(message)
        }
    }
}

fn rename_file(node: &mut TreeNode, old_name: &str, new_name: &str, fs: &dyn FileSystem) -> Outcome {
    let mut message = format!("{}: ", node.path().display());

    if !node.is_included {
        message.push_str("skipped. ");
        return Outcome::success(message);
    }

    match replace_contents(node.path(), old_name, new_name, fs) {
        Ok(Replacement { count: 0, .. }) => message.push_str("Unchanged. "),
        Ok(Replacement {
            count,
            written: true,
        }) => {
            message.push_str(&format!(
                "Replaced {} {} of '{}'. ",
                count,
                occurrences(count),
                old_name
            ));
        }
        Ok(Replacement {
            count,
            written: false,
        }) => {
            message.push_str(&format!(
                "Found {} {} of '{}' in binary content, left unchanged. ",
                count,
                occurrences(count),
                old_name
            ));
        }
        Err(e) => {
            message.push_str(&format!("Failed to replace contents. {} ", e.detail_text()));
            return Outcome::failure(message);
        }
    }

    let current = node.path().to_path_buf();
    let target = replace_filename(&current, old_name, new_name);

    if !can_replace_path(&current, &target) {
        return Outcome::success(message);
    }

    match fs.rename(&current, &target) {
        Ok(()) => {
            message.push_str(&format!(
                "Renamed '{}' file to '{}' ",
                current.display(),
                target.display()
            ));
            node.set_path(target);
            Outcome::success(message)
        }
        Err(e) => {
            message.push_str(&format!(
                "Failed to rename '{}'. {} ",
                current.display(),
                e.detail_text()
            ));
            Outcome::failure(message)
        }
    }
}

fn occurrences(count: usize) -> &'static str {
    if count == 1 {
        "occurrence"
    } else {
        "occurrences"
    }
}

/// Result of a content rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub count: usize,
    pub written: bool,
}

/// Rewrite every case-insensitive match of `old_name` line by line.
///
/// `old_name` is compiled as a regular expression, not escaped. The file is
/// only written back when something matched and it decoded as text; binary
/// content is counted but never rewritten.
pub fn replace_contents(
    path: &Path,
    old_name: &str,
    new_name: &str,
    fs: &dyn FileSystem,
) -> Result<Replacement> {
    let pattern = RegexBuilder::new(old_name)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::validation_invalid_argument("old_name", e.to_string()))?;

    let text = fs.read_text(path)?;
    let count: usize = text
        .lines
        .iter()
        .map(|line| pattern.find_iter(line).count())
        .sum();

    if count == 0 || text.is_binary() {
        return Ok(Replacement {
            count,
            written: false,
        });
    }

    let rewritten = text
        .lines
        .iter()
        .map(|line| pattern.replace_all(line, NoExpand(new_name)).into_owned())
        .collect();
    fs.write_text(path, &text.with_lines(rewritten))?;

    Ok(Replacement {
        count,
        written: true,
    })
}
