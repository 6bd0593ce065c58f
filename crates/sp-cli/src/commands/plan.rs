//! Plan command: size groups, place individuals, and write the views.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sp_core::{PlanOutcome, Planner, SizingWarning, UnplacedRecord};

use super::util::{CategoryGroups, Prepared, prepare, write_groups};
use crate::{BoundsArgs, Config};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Input file with one individual per row.
    pub input: PathBuf,

    /// Write the per-individual planning (one column per time slot).
    #[arg(long)]
    pub per_individual: Option<PathBuf>,

    /// Write the per-group planning (one block per category group).
    #[arg(long)]
    pub per_group: Option<PathBuf>,

    /// Write the list of individuals that could not be placed.
    #[arg(long)]
    pub unplaced: Option<PathBuf>,

    #[command(flatten)]
    pub bounds: BoundsArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A view written to disk.
#[derive(Debug, Serialize)]
struct SavedView {
    view: &'static str,
    path: String,
}

#[derive(Debug, Serialize)]
struct PlanJson<'a> {
    total: usize,
    placed: usize,
    categories: Vec<CategoryGroups<'a>>,
    warnings: &'a [SizingWarning],
    unplaced: &'a [UnplacedRecord],
    saved: &'a [SavedView],
}

pub fn run<W: Write>(writer: &mut W, args: &PlanArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    config.apply(&args.bounds);
    let mut prepared = prepare(&args.input, &config)?;

    let mut planner = Planner::new(
        prepared.time_slots.clone(),
        prepared.sizing.group_counts.clone(),
        Some(config.max_per_group),
    )
    .context("failed to configure planner")?;
    let outcome = planner.plan(&mut prepared.individuals);

    let saved = save_views(args, &prepared, &outcome)?;

    if args.json {
        let summary = outcome.summary();
        let report = PlanJson {
            total: summary.total,
            placed: summary.placed,
            categories: prepared.category_groups(),
            warnings: &prepared.sizing.warnings,
            unplaced: &outcome.unplaced,
            saved: &saved,
        };
        let json = serde_json::to_string_pretty(&report).context("failed to serialize plan")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    write_report(writer, args, &prepared, &outcome, &saved)
}

fn save_views(
    args: &PlanArgs,
    prepared: &Prepared,
    outcome: &PlanOutcome,
) -> Result<Vec<SavedView>> {
    let mut saved = Vec::new();

    if let Some(path) = &args.per_individual {
        sp_csv::write_per_individual_to_path(
            path,
            &prepared.individuals,
            &prepared.time_slots,
            prepared.delimiter,
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        saved.push(SavedView {
            view: "per individual",
            path: path.display().to_string(),
        });
    }

    if let Some(path) = &args.per_group {
        sp_csv::write_per_group_to_path(
            path,
            &outcome.placements,
            &prepared.time_slots,
            prepared.delimiter,
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        saved.push(SavedView {
            view: "per group",
            path: path.display().to_string(),
        });
    }

    if let Some(path) = &args.unplaced {
        sp_csv::write_unplaced_to_path(path, &outcome.unplaced, prepared.delimiter)
            .with_context(|| format!("failed to write {}", path.display()))?;
        saved.push(SavedView {
            view: "unplaced",
            path: path.display().to_string(),
        });
    }

    for view in &saved {
        tracing::debug!(view = view.view, path = %view.path, "saved view");
    }
    Ok(saved)
}

fn write_report<W: Write>(
    writer: &mut W,
    args: &PlanArgs,
    prepared: &Prepared,
    outcome: &PlanOutcome,
    saved: &[SavedView],
) -> Result<()> {
    let summary = outcome.summary();

    writeln!(writer, "Loaded {} individuals.", summary.total)?;
    writeln!(writer)?;
    write_groups(writer, prepared)?;

    writeln!(writer)?;
    writeln!(writer, "RESULT")?;
    writeln!(writer, "──────")?;
    if summary.unplaced == 0 {
        writeln!(writer, "All {} individuals placed.", summary.total)?;
    } else {
        writeln!(
            writer,
            "{} of {} individuals placed.",
            summary.placed, summary.total
        )?;

        writeln!(writer)?;
        writeln!(writer, "UNPLACED")?;
        writeln!(writer, "────────")?;
        for record in &outcome.unplaced {
            writeln!(
                writer,
                "- {} ({}): {}: {}",
                record.individual_id,
                record.individual_group_label,
                record.failed_category_label(),
                record.reason
            )?;
        }

        if args.unplaced.is_none() {
            writeln!(writer)?;
            writeln!(
                writer,
                "Hint: pass --unplaced <path> to save the unplaced list."
            )?;
        }
    }

    if !saved.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "SAVED")?;
        writeln!(writer, "─────")?;
        for view in saved {
            writeln!(writer, "{}: {}", view.view, view.path)?;
        }
    }

    Ok(())
}
