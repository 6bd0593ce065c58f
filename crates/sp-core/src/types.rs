//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Configuration errors detected before a planning run starts.
///
/// Per-individual placement failures are never reported through this type;
/// they are returned as [`UnplacedRecord`](crate::UnplacedRecord)s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The time slot registry was empty.
    #[error("at least one time slot is required")]
    NoTimeSlots,

    /// A time slot label was blank.
    #[error("time slot label at index {index} cannot be empty")]
    EmptySlotLabel { index: usize },

    /// A sizing or capacity parameter was zero.
    #[error("{name} must be greater than zero")]
    ZeroParameter { name: &'static str },

    /// The occupancy band was inverted.
    #[error("min_per_group ({min}) cannot exceed max_per_group ({max})")]
    InvertedBounds { min: u32, max: u32 },

    /// A category was configured with zero groups.
    #[error("category {category} must have at least one group")]
    ZeroGroups { category: Category },
}

/// A validated category name (e.g. a specialty option).
///
/// Surrounding whitespace is trimmed on construction; blank names are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Creates a new category after validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "category" });
        }
        if trimmed.len() == name.len() {
            Ok(Self(name))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the category name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Category {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Category {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
