use std::path::Path;

use crate::error::{Error, Result};
use crate::local_files::FileSystem;

use super::{classify, FileType, RuleChain, TreeNode};

/// Build the tree rooted at `root`.
///
/// The root itself is always included. Every entry below it is classified
/// and run through `rules`. Subdirectories are only entered when the root's
/// own top-level entries contain exactly one solution file; otherwise the
/// tree stops at the root's immediate children.
pub fn build_tree(root: &Path, rules: &RuleChain, fs: &dyn FileSystem) -> Result<TreeNode> {
    if root.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(Error::validation_missing_argument(vec!["root".to_string()]));
    }

    let mut node = TreeNode::root(root);
    populate(&mut node, rules, fs, true)?;
    Ok(node)
}

fn populate(
    parent: &mut TreeNode,
    rules: &RuleChain,
    fs: &dyn FileSystem,
    is_root: bool,
) -> Result<()> {
    for entry in fs.list(parent.path())? {
        let file_type = classify(&entry.path, entry.is_dir);
        let mut child = TreeNode::new(entry.path, file_type);
        child.is_included = rules.is_satisfied_by(&child, fs);
        parent.children.push(child);
    }

    if is_root && !parent.contains_exactly_one_solution_file() {
        return Ok(());
    }

    for child in parent.children.iter_mut() {
        if child.file_type == FileType::Directory {
            populate(child, rules, fs, false)?;
        }
    }

    Ok(())
}
