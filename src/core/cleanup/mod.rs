//! Folder cleanup: empty every directory with a given name (typically `bin`
//! and `obj`) anywhere in the tree.

use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::refactor::Outcome;
use crate::tree::TreeNode;

/// Empty every directory under `root` whose name equals `folder_name`
/// (case-insensitive). Matched directories are kept, their children dropped,
/// and the walk does not go below them. One outcome per matched directory.
pub fn clean_folders(
    root: &mut TreeNode,
    folder_name: &str,
    fs: &dyn FileSystem,
) -> Result<Vec<Outcome>> {
    if folder_name.trim().is_empty() {
        return Err(Error::validation_missing_argument(vec![
            "folder_name".to_string(),
        ]));
    }

    let mut outcomes = Vec::new();
    clean_recursive(root, &folder_name.to_lowercase(), fs, &mut outcomes);
    Ok(outcomes)
}

fn clean_recursive(
    node: &mut TreeNode,
    folder_name: &str,
    fs: &dyn FileSystem,
    outcomes: &mut Vec<Outcome>,
) {
    if node.is_directory() && node.file_name().to_lowercase() == folder_name {
        let outcome = match empty_directory(node, fs) {
            Ok(()) => {
                node.children.clear();
                Outcome::success(format!("Cleaned directory {}", node.path().display()))
            }
            Err(e) => Outcome::failure(format!(
                "Could not clean {}. {}",
                node.path().display(),
                e.detail_text()
            )),
        };
        outcomes.push(outcome);
        return;
    }

    for child in node.children.iter_mut() {
        clean_recursive(child, folder_name, fs, outcomes);
    }
}

/// Files first, then subdirectories recursively.
fn empty_directory(node: &TreeNode, fs: &dyn FileSystem) -> Result<()> {
    let entries = fs.list(node.path())?;

    for entry in entries.iter().filter(|e| !e.is_dir) {
        fs.delete(&entry.path)?;
    }
    for entry in entries.iter().filter(|e| e.is_dir) {
        fs.delete_dir_all(&entry.path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::local;
    use crate::tree::{build_tree, RuleChain};
    use std::fs;
    use tempfile::tempdir;

    fn project_with_build_output(root: &std::path::Path) {
        fs::write(root.join("Acme.sln"), "").unwrap();
        let web = root.join("Acme.Web");
        fs::create_dir_all(web.join("bin").join("Debug")).unwrap();
        fs::create_dir_all(web.join("obj")).unwrap();
        fs::write(web.join("bin").join("Acme.Web.dll"), "").unwrap();
        fs::write(web.join("bin").join("Debug").join("Acme.Web.pdb"), "").unwrap();
        fs::write(web.join("obj").join("project.assets.json"), "").unwrap();
        fs::write(web.join("Program.cs"), "").unwrap();
    }

    #[test]
    fn blank_folder_name_is_rejected() {
        let mut root = TreeNode::root("/src");
        let err = clean_folders(&mut root, " ", &local()).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationMissingArgument);
    }

    #[test]
    fn matched_folders_are_emptied_but_kept() {
        let dir = tempdir().unwrap();
        project_with_build_output(dir.path());
        let mut tree = build_tree(dir.path(), &RuleChain::standard(), &local()).unwrap();

        let outcomes = clean_folders(&mut tree, "BIN", &local()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert!(outcomes[0].message.starts_with("Cleaned directory"));

        let bin = dir.path().join("Acme.Web").join("bin");
        assert!(bin.is_dir());
        assert_eq!(fs::read_dir(&bin).unwrap().count(), 0);
        assert!(dir.path().join("Acme.Web").join("obj").join("project.assets.json").exists());
        assert!(dir.path().join("Acme.Web").join("Program.cs").exists());

        let bin_node = tree.iter().find(|n| n.file_name() == "bin").unwrap();
        assert!(bin_node.children.is_empty());
    }

    #[test]
    fn files_named_like_the_folder_are_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("A.sln"), "").unwrap();
        fs::write(dir.path().join("obj"), "not a directory").unwrap();
        let mut tree = build_tree(dir.path(), &RuleChain::new(), &local()).unwrap();

        let outcomes = clean_folders(&mut tree, "obj", &local()).unwrap();

        assert!(outcomes.is_empty());
        assert!(dir.path().join("obj").exists());
    }

    #[test]
    fn walk_does_not_descend_into_matched_folder() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("A.sln"), "").unwrap();
        fs::create_dir_all(dir.path().join("bin").join("bin")).unwrap();
        let mut tree = build_tree(dir.path(), &RuleChain::new(), &local()).unwrap();

        let outcomes = clean_folders(&mut tree, "bin", &local()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(!dir.path().join("bin").join("bin").exists());
    }

    #[test]
    fn failure_is_recorded_and_walk_continues() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("two").join("bin")).unwrap();
        fs::write(dir.path().join("two").join("bin").join("x.dll"), "").unwrap();

        let mut root = TreeNode::root(dir.path());
        // Points at a directory that does not exist.
        let mut missing = TreeNode::new(dir.path().join("missing"), crate::tree::FileType::Directory);
        missing.children.push(TreeNode::new(
            dir.path().join("missing").join("bin"),
            crate::tree::FileType::Directory,
        ));
        let mut two = TreeNode::new(dir.path().join("two"), crate::tree::FileType::Directory);
        two.children.push(TreeNode::new(
            dir.path().join("two").join("bin"),
            crate::tree::FileType::Directory,
        ));
        root.children.push(missing);
        root.children.push(two);

        let outcomes = clean_folders(&mut root, "bin", &local()).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].success);
        assert!(outcomes[0].message.starts_with("Could not clean"));
        assert!(outcomes[1].success);
        assert!(!dir.path().join("two").join("bin").join("x.dll").exists());
    }
}
