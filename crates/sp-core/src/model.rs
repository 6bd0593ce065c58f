//! Individuals, their assignments, and the records a planning run produces.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::{Category, TimeSlot};

/// Category label used in reports when no single category failed.
pub const NO_CATEGORY: &str = "N/A";

/// A placed preference: one category in one group at one time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub category: Category,
    pub timeslot: TimeSlot,
    /// 0-based group index within the category.
    pub group_index: usize,
}

/// A person to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    /// Stable identifier (e.g. a name).
    pub id: String,
    /// Secondary label carried into reports (e.g. a class).
    pub group_label: String,
    /// Requested categories, most wanted first.
    pub preferences: Vec<Category>,
    /// Keyed by time slot index; at most one assignment per slot.
    assignments: BTreeMap<usize, Assignment>,
}

impl Individual {
    pub fn new(
        id: impl Into<String>,
        group_label: impl Into<String>,
        preferences: Vec<Category>,
    ) -> Self {
        Self {
            id: id.into(),
            group_label: group_label.into(),
            preferences,
            assignments: BTreeMap::new(),
        }
    }

    /// Assignments keyed by time slot index.
    pub const fn assignments(&self) -> &BTreeMap<usize, Assignment> {
        &self.assignments
    }

    pub fn assignment_at(&self, slot_index: usize) -> Option<&Assignment> {
        self.assignments.get(&slot_index)
    }

    /// Whether the individual currently holds any assignment.
    pub fn is_placed(&self) -> bool {
        !self.assignments.is_empty()
    }

    pub(crate) fn add_assignment(&mut self, assignment: Assignment) {
        let previous = self
            .assignments
            .insert(assignment.timeslot.index, assignment);
        debug_assert!(previous.is_none(), "time slot assigned twice");
    }

    pub(crate) fn clear_assignments(&mut self) {
        self.assignments.clear();
    }
}

/// Per-group view of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementRecord {
    pub category: Category,
    pub timeslot: TimeSlot,
    pub group_index: usize,
    pub individual_id: String,
    pub individual_group_label: String,
}

/// Why an individual could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnplacedReason {
    /// More preferences than available time slots.
    OverCommitted { preferences: usize, slots: usize },
    /// Every compatible slot/group cell of a category was at capacity.
    CategorySaturated,
}

impl fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverCommitted { preferences, slots } => write!(
                f,
                "requested {preferences} preferences for {slots} available time slots"
            ),
            Self::CategorySaturated => {
                write!(f, "all compatible slots/groups are full or incompatible")
            }
        }
    }
}

/// An individual that ended a run with no assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnplacedRecord {
    pub individual_id: String,
    pub individual_group_label: String,
    pub preferences: Vec<Category>,
    /// `None` when the failure is not tied to one category; serialized as
    /// [`NO_CATEGORY`].
    #[serde(serialize_with = "serialize_failed_category")]
    pub failed_category: Option<Category>,
    pub reason: UnplacedReason,
}

impl UnplacedRecord {
    pub(crate) fn new(
        individual: &Individual,
        failed_category: Option<Category>,
        reason: UnplacedReason,
    ) -> Self {
        Self {
            individual_id: individual.id.clone(),
            individual_group_label: individual.group_label.clone(),
            preferences: individual.preferences.clone(),
            failed_category,
            reason,
        }
    }

    /// The failed category name, or [`NO_CATEGORY`].
    pub fn failed_category_label(&self) -> &str {
        self.failed_category
            .as_ref()
            .map_or(NO_CATEGORY, Category::as_str)
    }
}

#[expect(clippy::ref_option, reason = "signature required by serialize_with")]
fn serialize_failed_category<S: Serializer>(
    category: &Option<Category>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(category.as_ref().map_or(NO_CATEGORY, Category::as_str))
}
