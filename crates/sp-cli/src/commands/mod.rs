//! CLI subcommand implementations.

pub mod plan;
pub mod sizes;
mod util;
