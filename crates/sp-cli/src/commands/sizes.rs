//! Sizes command: group counts per category without planning.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sp_core::SizingWarning;

use super::util::{CategoryGroups, prepare, write_groups};
use crate::{BoundsArgs, Config};

#[derive(Debug, Args)]
pub struct SizesArgs {
    /// Input file with one individual per row.
    pub input: PathBuf,

    #[command(flatten)]
    pub bounds: BoundsArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SizesJson<'a> {
    individuals: usize,
    categories: Vec<CategoryGroups<'a>>,
    warnings: &'a [SizingWarning],
}

pub fn run<W: Write>(writer: &mut W, args: &SizesArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    config.apply(&args.bounds);
    let prepared = prepare(&args.input, &config)?;

    if args.json {
        let report = SizesJson {
            individuals: prepared.individuals.len(),
            categories: prepared.category_groups(),
            warnings: &prepared.sizing.warnings,
        };
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize group sizes")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    writeln!(writer, "Loaded {} individuals.", prepared.individuals.len())?;
    writeln!(writer)?;
    write_groups(writer, &prepared)
}
