//! Core planning engine for slotplan.
//!
//! This crate contains the fundamental types and logic for:
//! - Sizing: deriving how many groups each category opens from demand
//! - Planning: placing individuals' preferences into time slot/group cells
//!   with per-individual rollback
//!
//! It performs no I/O; loading and writing records lives in `sp-csv`.

pub mod model;
pub mod occupancy;
mod planner;
pub mod sizing;
pub mod timeslot;
mod types;

pub use model::{
    Assignment, Individual, NO_CATEGORY, PlacementRecord, UnplacedReason, UnplacedRecord,
};
pub use occupancy::{OccupancyGrid, OccupancyTable};
pub use planner::{PlanOutcome, PlanSummary, Planner};
pub use sizing::{GroupSizing, SizingConfig, SizingWarning, compute_group_counts, count_demand};
pub use timeslot::{DEFAULT_SLOT_LABELS, TimeSlot, TimeSlots};
pub use types::{Category, PlanError, ValidationError};
