//! Solution rename: path helpers, per-node strategies, progress reporting
//! and the `Renamer` that drives a whole run.

pub mod path_utils;
mod progress;
mod renamer;
mod strategy;

pub use progress::{ProgressCounter, ProgressRecord, ProgressSink};
pub use renamer::{validate_name, Renamer, RenamerEvents};
pub use strategy::{replace_contents, Outcome, RenameStrategy, Replacement};
