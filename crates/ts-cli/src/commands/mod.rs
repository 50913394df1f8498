//! CLI subcommand implementations.

pub mod export;
pub mod import;
pub mod report;
pub mod status;
pub mod util;
