//! CLI subcommand implementations.

pub mod apply;
pub mod resolve;
pub mod score;
