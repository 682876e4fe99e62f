//! CLI module

mod commands;
mod progress;

pub use commands::{Cli, Commands, SourceArgs};
pub use progress::ProgressReporter;
