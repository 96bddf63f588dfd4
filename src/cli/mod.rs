//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the query service.

pub mod logs;

pub use logs::{handle_log_command, LogCommands};
