//! Safety backup taken before any rename touches the disk.
//!
//! The archive lands beside the target folder as `<name>_<yyyyMMdd>.zip`,
//! stepping to `<name>_<date> (1).zip`, `(2)`, ... when a previous backup
//! from the same day is in the way.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::refactor::path_utils::increment_filename_for_collision;
use crate::refactor::Outcome;
use crate::tree::{FileType, TreeNode};

/// Pick the archive path for `root_path`.
///
/// After `max_attempts` increments the last candidate is used even if it
/// still exists; the archive step then fails instead of overwriting.
pub fn backup_path(
    root_path: &Path,
    zip_name: &str,
    date: NaiveDate,
    max_attempts: u32,
    fs: &dyn FileSystem,
) -> Result<PathBuf> {
    let parent = root_path.parent().ok_or_else(|| {
        Error::internal_io(
            format!("{} has no parent directory", root_path.display()),
            Some("choose backup location".to_string()),
        )
    })?;

    let mut zip_path = parent.join(format!("{}_{}.zip", zip_name, date.format("%Y%m%d")));
    let mut tries = max_attempts;

    while fs.exists(&zip_path) {
        zip_path = increment_filename_for_collision(&zip_path);
        tries = tries.saturating_sub(1);
        if tries == 0 {
            break;
        }
    }

    Ok(zip_path)
}

/// Back up `root` using today's local date.
pub fn backup(root: &TreeNode, zip_name: &str, max_attempts: u32, fs: &dyn FileSystem) -> Outcome {
    backup_on(root, zip_name, Local::now().date_naive(), max_attempts, fs)
}

/// Back up `root` into a dated archive beside it.
pub fn backup_on(
    root: &TreeNode,
    zip_name: &str,
    date: NaiveDate,
    max_attempts: u32,
    fs: &dyn FileSystem,
) -> Outcome {
    match write_backup(root, zip_name, date, max_attempts, fs) {
        Ok(zip_path) => Outcome::success(format!(
            "{} has been backed up successfully to {}",
            root.path().display(),
            zip_path.display()
        )),
        Err(e) => Outcome::failure(format!("Backup failed. {}", e.detail_text())),
    }
}

fn write_backup(
    root: &TreeNode,
    zip_name: &str,
    date: NaiveDate,
    max_attempts: u32,
    fs: &dyn FileSystem,
) -> Result<PathBuf> {
    let zip_path = backup_path(root.path(), zip_name, date, max_attempts, fs)?;

    if root.file_type == FileType::Directory {
        fs.zip_directory(root.path(), &zip_path)?;
    } else {
        fs.zip_file(root.path(), &zip_path)?;
    }

    Ok(zip_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::local;
    use std::fs;
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn backup_path_sits_beside_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Acme");

        let path = backup_path(&root, "Acme", date(), 20, &local()).unwrap();

        assert_eq!(path, dir.path().join("Acme_20240307.zip"));
    }

    #[test]
    fn backup_path_steps_past_existing_archives() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Acme");
        fs::write(dir.path().join("Acme_20240307.zip"), "").unwrap();
        fs::write(dir.path().join("Acme_20240307 (1).zip"), "").unwrap();

        let path = backup_path(&root, "Acme", date(), 20, &local()).unwrap();

        assert_eq!(path, dir.path().join("Acme_20240307 (2).zip"));
    }

    #[test]
    fn backup_path_gives_up_after_max_attempts() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Acme");
        fs::write(dir.path().join("Acme_20240307.zip"), "").unwrap();
        for n in 1..=3 {
            fs::write(dir.path().join(format!("Acme_20240307 ({}).zip", n)), "").unwrap();
        }

        let path = backup_path(&root, "Acme", date(), 2, &local()).unwrap();

        assert_eq!(path, dir.path().join("Acme_20240307 (2).zip"));
    }

    #[test]
    fn backup_archives_directory() {
        let dir = tempdir().unwrap();
        let root_path = dir.path().join("Acme");
        fs::create_dir(&root_path).unwrap();
        fs::write(root_path.join("Acme.sln"), "solution").unwrap();
        let root = TreeNode::root(&root_path);

        let outcome = backup_on(&root, "Acme", date(), 20, &local());

        assert!(outcome.success, "{}", outcome.message);
        assert!(outcome.message.contains("has been backed up successfully"));
        let zip_path = dir.path().join("Acme_20240307.zip");
        let archive = zip::ZipArchive::new(fs::File::open(zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn backup_archives_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Acme.sln");
        fs::write(&file, "solution").unwrap();
        let root = TreeNode::new(&file, FileType::Solution);

        let outcome = backup_on(&root, "Acme", date(), 20, &local());

        assert!(outcome.success, "{}", outcome.message);
        let mut archive =
            zip::ZipArchive::new(fs::File::open(dir.path().join("Acme_20240307.zip")).unwrap())
                .unwrap();
        assert!(archive.by_name("Acme.sln").is_ok());
    }

    #[test]
    fn backup_failure_is_reported() {
        let dir = tempdir().unwrap();
        let root = TreeNode::root(dir.path().join("Missing"));

        let outcome = backup_on(&root, "Acme", date(), 20, &local());

        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Backup failed."));
    }
}
