//! Loading individuals from delimited input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use sp_core::{Category, Individual};

use crate::CsvError;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Header names of the input columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column holding the individual's identifier.
    pub identifier: String,
    /// Column holding the secondary label.
    pub group_label: String,
    /// Preference columns, most wanted first.
    pub preferences: Vec<String>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        let ordinals = ["première", "deuxième", "troisième", "quatrième", "cinquième"];
        Self {
            identifier: "Nom des élèves".to_string(),
            group_label: "Classe".to_string(),
            preferences: ordinals
                .iter()
                .map(|ordinal| {
                    format!("Indiquez la {ordinal} spécialité à laquelle vous voulez participer.")
                })
                .collect(),
        }
    }
}

/// Resolved header positions for a layout.
struct ColumnIndices {
    identifier: usize,
    group_label: usize,
    preferences: Vec<usize>,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord, layout: &ColumnLayout) -> Result<Self, CsvError> {
        let names: Vec<String> = headers
            .iter()
            .map(|name| name.trim_start_matches(BYTE_ORDER_MARK).trim().to_string())
            .collect();

        let find = |column: &str| {
            names
                .iter()
                .position(|name| name == column.trim())
                .ok_or_else(|| CsvError::MissingColumn {
                    column: column.to_string(),
                    found: names.clone(),
                })
        };

        Ok(Self {
            identifier: find(&layout.identifier)?,
            group_label: find(&layout.group_label)?,
            preferences: layout
                .preferences
                .iter()
                .map(|column| find(column))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Reads individuals in file order.
///
/// Values are trimmed. Rows with an empty identifier are skipped and empty
/// preference cells are dropped.
pub fn load_individuals<R: Read>(
    reader: R,
    layout: &ColumnLayout,
    delimiter: u8,
) -> Result<Vec<Individual>, CsvError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndices::resolve(reader.headers()?, layout)?;

    let mut individuals = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |position: usize| record.get(position).unwrap_or("").trim();

        let id = cell(columns.identifier);
        if id.is_empty() {
            tracing::debug!(row = idx + 2, "skipping row without identifier");
            continue;
        }

        let preferences: Vec<Category> = columns
            .preferences
            .iter()
            .filter_map(|&position| Category::new(cell(position)).ok())
            .collect();

        individuals.push(Individual::new(
            id,
            cell(columns.group_label),
            preferences,
        ));
    }

    tracing::debug!(count = individuals.len(), "loaded individuals");
    Ok(individuals)
}

/// Opens `path` and reads individuals from it.
pub fn load_individuals_from_path(
    path: &Path,
    layout: &ColumnLayout,
    delimiter: u8,
) -> Result<Vec<Individual>, CsvError> {
    let file = File::open(path)?;
    load_individuals(file, layout, delimiter)
}
