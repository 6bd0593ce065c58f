//! Slotplan CLI library.
//!
//! This crate provides the CLI interface for the time slot and group planner.

mod cli;
pub mod commands;
mod config;

pub use cli::{BoundsArgs, Cli, Commands};
pub use config::Config;
