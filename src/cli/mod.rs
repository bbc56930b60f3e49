//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command};
pub use commands::{open_grabber, run_snapshot, run_watch, setup_ctrlc_handler, CliError};
pub use enums::Backend;
