//! Ordered registry of scheduling time slots.

use std::ops::Index;

use serde::Serialize;

use crate::PlanError;

/// Labels used when no time slots are configured.
pub const DEFAULT_SLOT_LABELS: [&str; 5] = [
    "09:00-09:25",
    "09:30-09:55",
    "10:05-10:30",
    "10:35-11:00",
    "11:00-11:25",
];

/// A single scheduling position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    /// 0-based position in the registry.
    pub index: usize,
    /// Display label (e.g. "09:00-09:25").
    pub label: String,
}

/// The fixed, ordered set of time slots for a planning run.
///
/// Indices are contiguous `0..len()` and match each slot's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlots {
    slots: Vec<TimeSlot>,
}

impl TimeSlots {
    /// Builds a registry from labels, assigning indices in order.
    pub fn new<I, S>(labels: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| {
                let label = label.into().trim().to_string();
                if label.is_empty() {
                    return Err(PlanError::EmptySlotLabel { index });
                }
                Ok(TimeSlot { index, label })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if slots.is_empty() {
            return Err(PlanError::NoTimeSlots);
        }
        Ok(Self { slots })
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; a registry holds at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSlot> {
        self.slots.iter()
    }

    /// Slot labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.label.as_str())
    }
}

impl Default for TimeSlots {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOT_LABELS
                .iter()
                .enumerate()
                .map(|(index, label)| TimeSlot {
                    index,
                    label: (*label).to_string(),
                })
                .collect(),
        }
    }
}

impl Index<usize> for TimeSlots {
    type Output = TimeSlot;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slots[index]
    }
}

impl<'a> IntoIterator for &'a TimeSlots {
    type Item = &'a TimeSlot;
    type IntoIter = std::slice::Iter<'a, TimeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_contiguous() {
        let slots = TimeSlots::new(["a", "b", "c"]).unwrap();
        let indices: Vec<usize> = slots.iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2]);
        assert_eq!(slots.get(1).unwrap().label, "b");
        assert!(slots.get(3).is_none());
    }

    #[test]
    fn rejects_empty_registry() {
        let labels: [&str; 0] = [];
        assert_eq!(TimeSlots::new(labels).unwrap_err(), PlanError::NoTimeSlots);
    }

    #[test]
    fn rejects_blank_label() {
        assert_eq!(
            TimeSlots::new(["09:00", "  "]).unwrap_err(),
            PlanError::EmptySlotLabel { index: 1 }
        );
    }

    #[test]
    fn default_has_five_morning_slots() {
        let slots = TimeSlots::default();
        assert_eq!(slots.len(), 5);
        assert_eq!(slots.labels().next(), Some("09:00-09:25"));
        assert_eq!(slots.get(4).unwrap().label, "11:00-11:25");
    }
}
