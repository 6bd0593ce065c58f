//! Writing the per-individual, per-group, and unplaced views.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Terminator, Writer, WriterBuilder};
use sp_core::{Category, Individual, PlacementRecord, TimeSlots, UnplacedReason, UnplacedRecord};

use crate::CsvError;

/// Rows printed under each group title, left blank for manual annotation.
const ANNOTATION_ROWS: [&str; 3] = ["1ere", "Term", "Salle"];

const UNPLACED_HEADER: [&str; 5] = [
    "Nom",
    "Classe",
    "Spécialités demandées",
    "Spécialité problématique",
    "Raison",
];

fn writer<W: Write>(inner: W, delimiter: u8) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(inner)
}

/// Reason text for the unplaced report, in the language of its headers.
fn reason_cell(reason: &UnplacedReason) -> String {
    match reason {
        UnplacedReason::OverCommitted { preferences, slots } => {
            format!("A {preferences} vœux pour {slots} créneaux disponibles")
        }
        UnplacedReason::CategorySaturated => {
            "Tous les créneaux/groupes sont pleins ou incompatibles".to_string()
        }
    }
}

/// Cell text for one assignment, with 1-based group numbers.
fn assignment_cell(category: &Category, group_index: usize) -> String {
    format!("{category} (g{})", group_index + 1)
}

/// Writes one row per individual with one column per time slot.
pub fn write_per_individual<W: Write>(
    inner: W,
    individuals: &[Individual],
    time_slots: &TimeSlots,
    delimiter: u8,
) -> Result<(), CsvError> {
    let mut out = writer(inner, delimiter);

    let mut header = vec!["Nom", "Classe"];
    header.extend(time_slots.labels());
    out.write_record(&header)?;

    for individual in individuals {
        let mut row = vec![individual.id.clone(), individual.group_label.clone()];
        row.extend(time_slots.iter().map(|slot| {
            individual
                .assignment_at(slot.index)
                .map(|a| assignment_cell(&a.category, a.group_index))
                .unwrap_or_default()
        }));
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Member identifiers keyed by category, group, then slot.
type GroupIndex<'a> = BTreeMap<&'a Category, BTreeMap<usize, BTreeMap<usize, Vec<&'a str>>>>;

fn index_placements(placements: &[PlacementRecord]) -> GroupIndex<'_> {
    let mut index: GroupIndex<'_> = BTreeMap::new();
    for record in placements {
        index
            .entry(&record.category)
            .or_default()
            .entry(record.group_index)
            .or_default()
            .entry(record.timeslot.index)
            .or_default()
            .push(record.individual_id.as_str());
    }
    index
}

/// Writes the block layout: one block per category group.
///
/// Categories are sorted by name and groups run from 1 to the highest group
/// that received anyone. Each block has a title row, blank annotation rows,
/// member rows aligned under slot columns, and a separator row; an extra
/// separator follows each category.
pub fn write_per_group<W: Write>(
    inner: W,
    placements: &[PlacementRecord],
    time_slots: &TimeSlots,
    delimiter: u8,
) -> Result<(), CsvError> {
    let mut out = writer(inner, delimiter);
    let blank_row = vec![""; time_slots.len() + 1];

    for (category, groups) in index_placements(placements) {
        let highest = groups.keys().next_back().copied().unwrap_or(0);

        for group in 0..=highest {
            let members = groups.get(&group);

            let mut title = vec![format!("{category} g{}", group + 1)];
            title.extend(time_slots.labels().map(str::to_string));
            out.write_record(&title)?;

            for label in ANNOTATION_ROWS {
                let mut row = blank_row.clone();
                row[0] = label;
                out.write_record(&row)?;
            }

            let depth = members
                .map(|slots| slots.values().map(Vec::len).max().unwrap_or(0))
                .unwrap_or(0);
            for line in 0..depth {
                let mut row = vec![""];
                row.extend(time_slots.iter().map(|slot| {
                    members
                        .and_then(|slots| slots.get(&slot.index))
                        .and_then(|names| names.get(line).copied())
                        .unwrap_or("")
                }));
                out.write_record(&row)?;
            }

            out.write_record(&blank_row)?;
        }

        out.write_record(&blank_row)?;
    }

    out.flush()?;
    Ok(())
}

/// Writes one row per unplaced individual with the failing category and reason.
pub fn write_unplaced<W: Write>(
    inner: W,
    unplaced: &[UnplacedRecord],
    delimiter: u8,
) -> Result<(), CsvError> {
    let mut out = writer(inner, delimiter);
    out.write_record(UNPLACED_HEADER)?;

    for record in unplaced {
        let requested = if record.preferences.is_empty() {
            "Aucune".to_string()
        } else {
            record
                .preferences
                .iter()
                .map(Category::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.write_record([
            record.individual_id.as_str(),
            record.individual_group_label.as_str(),
            requested.as_str(),
            record.failed_category_label(),
            reason_cell(&record.reason).as_str(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_per_individual_to_path(
    path: &Path,
    individuals: &[Individual],
    time_slots: &TimeSlots,
    delimiter: u8,
) -> Result<(), CsvError> {
    write_per_individual(File::create(path)?, individuals, time_slots, delimiter)
}

pub fn write_per_group_to_path(
    path: &Path,
    placements: &[PlacementRecord],
    time_slots: &TimeSlots,
    delimiter: u8,
) -> Result<(), CsvError> {
    write_per_group(File::create(path)?, placements, time_slots, delimiter)
}

pub fn write_unplaced_to_path(
    path: &Path,
    unplaced: &[UnplacedRecord],
    delimiter: u8,
) -> Result<(), CsvError> {
    write_unplaced(File::create(path)?, unplaced, delimiter)
}
