// Public modules
pub mod backup;
pub mod cleanup;
pub mod error;
pub mod local_files;
pub mod logs;
pub mod refactor;
pub mod tree;

// Public modules for CLI access
pub mod defaults;
pub mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
