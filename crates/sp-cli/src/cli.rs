//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::plan::PlanArgs;
use crate::commands::sizes::SizesArgs;

/// Time slot and group planner.
///
/// Sizes groups per category from aggregate demand, then assigns each
/// individual's preferences to distinct time slots without exceeding group
/// capacity.
#[derive(Debug, Parser)]
#[command(name = "slotplan", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how many groups each category would open.
    Sizes(SizesArgs),

    /// Assign individuals to time slots and groups.
    Plan(PlanArgs),
}

/// Overrides for the configured group bounds.
#[derive(Debug, Default, Args)]
pub struct BoundsArgs {
    /// Target minimum individuals per group and slot.
    #[arg(long)]
    pub min_per_group: Option<u32>,

    /// Hard cap on individuals per group and slot.
    #[arg(long)]
    pub max_per_group: Option<u32>,

    /// Maximum groups opened for one category.
    #[arg(long)]
    pub max_groups: Option<usize>,

    /// Field delimiter for input and output files.
    #[arg(long)]
    pub delimiter: Option<char>,
}
