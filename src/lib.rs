// Export modules for library usage
pub mod baseline;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod filter;
pub mod io;
pub mod resolver;
pub mod testkit;

// Re-export commonly used types
pub use crate::baseline::{BaselineStore, OutputFormat, LOCK_FILE, SUMMARY_FILE};
pub use crate::config::{LockConfig, Mode, Platform};
pub use crate::errors::{CaplockError, ExitStatus, Result};
pub use crate::filter::PatternSet;
pub use crate::io::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use crate::resolver::{ImportResolver, Resolution};
