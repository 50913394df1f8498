//! Timesheet CLI library.
//!
//! This crate provides the command-line interface over the timesheet engine:
//! argument parsing, configuration, and one module per subcommand.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, FilterArgs};
pub use config::Config;
