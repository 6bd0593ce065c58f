//! Shared loading and sizing steps for CLI commands.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sp_core::{Category, GroupSizing, Individual, TimeSlots, compute_group_counts, count_demand};

use crate::Config;

/// Input loaded and sized, ready for planning.
#[derive(Debug)]
pub struct Prepared {
    pub individuals: Vec<Individual>,
    pub time_slots: TimeSlots,
    pub demand: BTreeMap<Category, u32>,
    pub sizing: GroupSizing,
    pub delimiter: u8,
}

/// Per-category row for JSON output.
#[derive(Debug, Serialize)]
pub struct CategoryGroups<'a> {
    pub category: &'a Category,
    pub demand: u32,
    pub groups: usize,
}

impl Prepared {
    pub fn category_groups(&self) -> Vec<CategoryGroups<'_>> {
        self.sizing
            .group_counts
            .iter()
            .map(|(category, &groups)| CategoryGroups {
                category,
                demand: self.demand.get(category).copied().unwrap_or(0),
                groups,
            })
            .collect()
    }
}

/// Validates configuration, loads individuals, and sizes groups.
pub fn prepare(input: &Path, config: &Config) -> Result<Prepared> {
    let time_slots = config.time_slots()?;
    let sizing_config = config.sizing(time_slots.len())?;
    let delimiter = config.delimiter_byte()?;

    let individuals =
        sp_csv::load_individuals_from_path(input, &config.column_layout(), delimiter)
            .with_context(|| format!("failed to read {}", input.display()))?;
    if individuals.is_empty() {
        anyhow::bail!("no individuals found in {}", input.display());
    }
    tracing::info!(
        count = individuals.len(),
        path = %input.display(),
        "loaded individuals"
    );

    let demand = count_demand(&individuals);
    let sizing = compute_group_counts(&demand, &sizing_config).context("failed to size groups")?;

    Ok(Prepared {
        individuals,
        time_slots,
        demand,
        sizing,
        delimiter,
    })
}

/// Writes the group table and any sizing warnings.
pub fn write_groups<W: Write>(writer: &mut W, prepared: &Prepared) -> Result<()> {
    writeln!(writer, "GROUPS PER CATEGORY")?;
    writeln!(writer, "───────────────────")?;

    let rows = prepared.category_groups();
    let width = rows
        .iter()
        .map(|row| row.category.as_str().chars().count())
        .max()
        .unwrap_or(0);
    for row in rows {
        writeln!(
            writer,
            "{:<width$}  {} group(s)  (demand {})",
            row.category.as_str(),
            row.groups,
            row.demand
        )?;
    }

    if !prepared.sizing.warnings.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "WARNINGS")?;
        writeln!(writer, "────────")?;
        for warning in &prepared.sizing.warnings {
            writeln!(writer, "- {warning}")?;
        }
    }

    Ok(())
}
