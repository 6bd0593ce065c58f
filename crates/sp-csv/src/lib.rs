//! Record layer for slotplan.
//!
//! Loads individuals from a delimited file and writes the three views a
//! planning run produces:
//! - per individual: one row per person, one column per time slot
//! - per group: one block per category group, members listed under slots
//! - unplaced: one row per individual left without assignments
//!
//! # File Format
//!
//! Files are UTF-8, `;`-delimited by default, with a header row. A leading
//! byte order mark is tolerated on input. Column names for the input are
//! configurable through [`ColumnLayout`]; output headers are fixed.

mod reader;
mod writer;

use std::io;

use thiserror::Error;

pub use reader::{ColumnLayout, load_individuals, load_individuals_from_path};
pub use writer::{
    write_per_group, write_per_group_to_path, write_per_individual, write_per_individual_to_path,
    write_unplaced, write_unplaced_to_path,
};

/// Field delimiter used when none is configured.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Record layer errors.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to open or create a file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Malformed delimited data or a failed write.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A column required by the layout is absent from the header.
    #[error("missing column {column:?}; found columns: {}", found.join(", "))]
    MissingColumn { column: String, found: Vec<String> },
}
