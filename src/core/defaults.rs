use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::paths;

/// Root configuration structure for config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamerConfig {
    /// Words that may not appear as a dot-separated segment of a solution name.
    #[serde(default = "default_reserved_words")]
    pub reserved_words: Vec<String>,

    /// Folder names cleaned when `clean` is run without explicit folders.
    #[serde(default = "default_clean_folders")]
    pub clean_folders: Vec<String>,

    /// Pause after each progress emission, in milliseconds.
    #[serde(default = "default_progress_delay_ms")]
    pub progress_delay_ms: u64,

    /// Pause between a successful backup and the first mutation, in milliseconds.
    #[serde(default = "default_backup_delay_ms")]
    pub backup_delay_ms: u64,

    /// How many times a colliding backup name is incremented before giving up looking.
    #[serde(default = "default_backup_max_attempts")]
    pub backup_max_attempts: u32,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            reserved_words: default_reserved_words(),
            clean_folders: default_clean_folders(),
            progress_delay_ms: default_progress_delay_ms(),
            backup_delay_ms: default_backup_delay_ms(),
            backup_max_attempts: default_backup_max_attempts(),
        }
    }
}

impl RenamerConfig {
    pub fn progress_delay(&self) -> Duration {
        Duration::from_millis(self.progress_delay_ms)
    }

    pub fn backup_delay(&self) -> Duration {
        Duration::from_millis(self.backup_delay_ms)
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words.iter().any(|w| w == word)
    }

    /// Config with all pacing delays disabled.
    pub fn without_delays(mut self) -> Self {
        self.progress_delay_ms = 0;
        self.backup_delay_ms = 0;
        self
    }
}

// =============================================================================
// Default value functions
// =============================================================================

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

fn default_reserved_words() -> Vec<String> {
    CSHARP_KEYWORDS.iter().map(|w| w.to_string()).collect()
}

fn default_clean_folders() -> Vec<String> {
    vec!["bin".to_string(), "obj".to_string()]
}

fn default_progress_delay_ms() -> u64 {
    1
}

fn default_backup_delay_ms() -> u64 {
    10
}

fn default_backup_max_attempts() -> u32 {
    20
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load the config, falling back to built-in defaults on any error.
pub fn load_config() -> RenamerConfig {
    paths::config_json()
        .and_then(|path| load_config_from_file(&path))
        .unwrap_or_default()
}

/// Attempt to load config from a specific file.
pub fn load_config_from_file(path: &Path) -> crate::Result<RenamerConfig> {
    if !path.exists() {
        return Err(crate::Error::other(format!(
            "{} not found",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))
}

/// Save config to a file (creates parent directories if missing).
pub fn save_config(config: &RenamerConfig, path: &Path) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        crate::Error::internal_json(e.to_string(), Some("serialize config.json".to_string()))
    })?;

    fs::write(path, content).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
    })?;

    Ok(())
}
