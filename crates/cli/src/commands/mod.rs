//! CLI subcommand implementations.

pub mod maintenance;
pub mod migrate;
