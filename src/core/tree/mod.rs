//! Typed view of a solution folder on disk.
//!
//! `build_tree` walks the target folder, classifies every entry, and asks a
//! `RuleChain` whether the entry may be touched by a rename. The resulting
//! `TreeNode` hierarchy is what the renamer and the cleanup walk operate on.

mod builder;
mod rules;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use builder::build_tree;
pub use rules::{directory_or_file_contains, extension_contains, Rule, RuleChain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileType {
    Other,
    Directory,
    Solution,
    Executable,
    Library,
    Config,
    Code,
    Project,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Other => "Other",
            FileType::Directory => "Directory",
            FileType::Solution => "Solution",
            FileType::Executable => "Executable",
            FileType::Library => "Library",
            FileType::Config => "Config",
            FileType::Code => "Code",
            FileType::Project => "Project",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a filesystem entry. Directories win; files go by extension, case-insensitively.
pub fn classify(path: &Path, is_dir: bool) -> FileType {
    if is_dir {
        return FileType::Directory;
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "sln" => FileType::Solution,
        "dll" => FileType::Library,
        "exe" => FileType::Executable,
        "config" => FileType::Config,
        "cs" => FileType::Code,
        "csproj" | "sqlproj" => FileType::Project,
        _ => FileType::Other,
    }
}

/// One filesystem entry in the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    path: PathBuf,
    previous_path: Option<PathBuf>,
    pub file_type: FileType,
    /// Decided once by the rule chain when the tree is built.
    pub is_included: bool,
    /// Filesystem enumeration order. Empty for files.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(path: impl Into<PathBuf>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            file_type,
            is_included: false,
            children: Vec::new(),
        }
    }

    /// Root of a tree: always a directory, always included.
    pub fn root(path: impl Into<PathBuf>) -> Self {
        let mut node = Self::new(path, FileType::Directory);
        node.is_included = true;
        node
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path held before the last `set_path`. Only one step of history is kept.
    pub fn previous_path(&self) -> Option<&Path> {
        self.previous_path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let old = std::mem::replace(&mut self.path, path.into());
        self.previous_path = Some(old);
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// True when exactly one direct child is a solution file.
    pub fn contains_exactly_one_solution_file(&self) -> bool {
        self.children
            .iter()
            .filter(|c| c.file_type == FileType::Solution)
            .count()
            == 1
    }

    /// Count of this node plus its descendants.
    ///
    /// With `include_all == false` an excluded node counts as zero and its
    /// subtree is not entered.
    pub fn item_count(&self, include_all: bool) -> usize {
        if !self.is_included && !include_all {
            return 0;
        }

        1 + self
            .children
            .iter()
            .map(|c| c.item_count(include_all))
            .sum::<usize>()
    }

    /// Pre-order iterator over this node and every descendant.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.file_name(), self.file_type)?;
        if !self.is_included {
            write!(f, " - excluded")?;
        }
        Ok(())
    }
}
