//! Path arithmetic for renames and backup naming.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use regex::{NoExpand, Regex, RegexBuilder};

/// Absolute, lexically cleaned form of `path` with trailing separators dropped.
pub fn normalize(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .clean()
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_string())
}

fn with_extension(stem: String, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Replace `old_name` with `new_name` inside the final segment's stem.
///
/// Matching is literal and case-insensitive. Parent directories and the
/// extension are never touched. Returns `path` unchanged when any input is blank.
pub fn replace_filename(path: &Path, old_name: &str, new_name: &str) -> PathBuf {
    if path.as_os_str().to_string_lossy().trim().is_empty()
        || old_name.trim().is_empty()
        || new_name.trim().is_empty()
    {
        return path.to_path_buf();
    }

    let cleaned = normalize(path);
    let Some(parent) = cleaned.parent() else {
        return cleaned;
    };

    let stem = stem_of(&cleaned);
    let Ok(pattern) = RegexBuilder::new(&regex::escape(old_name))
        .case_insensitive(true)
        .build()
    else {
        return cleaned;
    };

    let new_stem = pattern.replace_all(&stem, NoExpand(new_name)).to_string();
    let extension = extension_of(&cleaned);

    parent.join(with_extension(new_stem, extension.as_deref()))
}

/// Whether `old_path` may be moved to `new_path`.
///
/// Two paths whose parents match case-insensitively and whose stems match
/// exactly name the same file and are rejected. Otherwise the move is
/// allowed whenever the normalized paths differ.
pub fn can_replace_path(old_path: &Path, new_path: &Path) -> bool {
    let old_clean = normalize(old_path);
    let new_clean = normalize(new_path);

    let parent_of = |p: &Path| {
        p.parent()
            .map(|d| d.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    };

    if parent_of(&old_clean) == parent_of(&new_clean) && stem_of(&old_clean) == stem_of(&new_clean)
    {
        return false;
    }

    old_clean != new_clean
}

/// Next candidate name for a file that already exists.
///
/// Increments the last `(N)` group in the stem. Without one, appends ` (1)`
/// and uses a `.zip` extension.
pub fn increment_filename_for_collision(path: &Path) -> PathBuf {
    let stem = stem_of(path);
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let last_group = Regex::new(r"\(\d+\)")
        .ok()
        .and_then(|re| re.find_iter(&stem).last())
        .and_then(|m| {
            let digits = &stem[m.start() + 1..m.end() - 1];
            digits
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_add(1))
                .map(|next| (m.start(), m.end(), next))
        });

    let file_name = match last_group {
        Some((start, end, next)) => {
            let new_stem = format!("{}({}){}", &stem[..start], next, &stem[end..]);
            with_extension(new_stem, extension_of(path).as_deref())
        }
        None => format!("{} (1).zip", stem),
    };

    parent.join(file_name)
}
