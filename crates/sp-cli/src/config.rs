//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sp_core::{DEFAULT_SLOT_LABELS, SizingConfig, TimeSlots};
use sp_csv::ColumnLayout;

use crate::cli::BoundsArgs;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ordered time slot labels.
    pub time_slots: Vec<String>,

    /// Target minimum individuals per group and slot.
    pub min_per_group: u32,

    /// Hard cap on individuals per group and slot.
    pub max_per_group: u32,

    /// Upper bound on groups opened for one category.
    pub max_groups_per_category: usize,

    /// Field delimiter for input and output files.
    pub delimiter: char,

    /// Input column holding identifiers.
    pub identifier_column: String,

    /// Input column holding the secondary label.
    pub group_label_column: String,

    /// Input preference columns, most wanted first.
    pub preference_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let layout = ColumnLayout::default();
        let sizing = SizingConfig::default();
        Self {
            time_slots: DEFAULT_SLOT_LABELS.iter().map(ToString::to_string).collect(),
            min_per_group: sizing.min_per_group,
            max_per_group: sizing.max_per_group,
            max_groups_per_category: sizing.max_groups_per_category,
            delimiter: char::from(sp_csv::DEFAULT_DELIMITER),
            identifier_column: layout.identifier,
            group_label_column: layout.group_label,
            preference_columns: layout.preferences,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SLOTPLAN_*)
        figment = figment.merge(Env::prefixed("SLOTPLAN_"));

        figment.extract()
    }

    /// Applies command-line overrides.
    pub fn apply(&mut self, bounds: &BoundsArgs) {
        if let Some(min) = bounds.min_per_group {
            self.min_per_group = min;
        }
        if let Some(max) = bounds.max_per_group {
            self.max_per_group = max;
        }
        if let Some(groups) = bounds.max_groups {
            self.max_groups_per_category = groups;
        }
        if let Some(delimiter) = bounds.delimiter {
            self.delimiter = delimiter;
        }
    }

    /// Builds the time slot registry.
    pub fn time_slots(&self) -> Result<TimeSlots> {
        TimeSlots::new(self.time_slots.iter().cloned()).context("invalid time_slots")
    }

    /// Builds a validated sizing configuration for `slot_count` slots.
    pub fn sizing(&self, slot_count: usize) -> Result<SizingConfig> {
        let sizing = SizingConfig {
            slot_count,
            min_per_group: self.min_per_group,
            max_per_group: self.max_per_group,
            max_groups_per_category: self.max_groups_per_category,
        };
        sizing.validate().context("invalid group bounds")?;
        Ok(sizing)
    }

    /// The delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| {
                format!(
                    "delimiter must be an ASCII character, got {:?}",
                    self.delimiter
                )
            })
    }

    pub fn column_layout(&self) -> ColumnLayout {
        ColumnLayout {
            identifier: self.identifier_column.clone(),
            group_label: self.group_label_column.clone(),
            preferences: self.preference_columns.clone(),
        }
    }
}

/// Returns the platform-specific config directory for slotplan.
///
/// On Linux: `~/.config/slotplan`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("slotplan"))
}
