//! Group count derivation.
//!
//! Turns aggregate demand per category into an integer number of groups so
//! that, assuming demand spreads evenly over every slot and group, each
//! slot/group cell holds between `min_per_group` and `max_per_group`
//! individuals.
//!
//! # Algorithm Summary
//!
//! For a category with demand `n` over `s` slots:
//!
//! 1. `min_groups = ceil(n / (s * max_per_group))`
//! 2. `max_groups = max(1, floor(n / (s * min_per_group)))` when
//!    `n >= min_per_group`, else 1; then capped at `max_groups_per_category`
//! 3. If `min_groups > max_groups` the band is infeasible: a warning is
//!    recorded and `min(min_groups, max_groups_per_category)` is used
//! 4. Otherwise `min_groups` is used
//! 5. The result is clamped to `[1, max_groups_per_category]`

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::{Category, Individual, PlanError};

/// Occupancy band and limits used to size groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingConfig {
    /// Number of time slots demand spreads over.
    pub slot_count: usize,

    /// Target minimum individuals per slot/group cell.
    /// Default: 5.
    pub min_per_group: u32,

    /// Target maximum individuals per slot/group cell.
    /// Default: 8.
    pub max_per_group: u32,

    /// Upper bound on groups opened for one category.
    /// Default: 6.
    pub max_groups_per_category: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            slot_count: 5,
            min_per_group: 5,
            max_per_group: 8,
            max_groups_per_category: 6,
        }
    }
}

impl SizingConfig {
    /// Rejects zero parameters and an inverted band.
    pub const fn validate(&self) -> Result<(), PlanError> {
        if self.slot_count == 0 {
            return Err(PlanError::ZeroParameter { name: "slot_count" });
        }
        if self.min_per_group == 0 {
            return Err(PlanError::ZeroParameter {
                name: "min_per_group",
            });
        }
        if self.max_per_group == 0 {
            return Err(PlanError::ZeroParameter {
                name: "max_per_group",
            });
        }
        if self.max_groups_per_category == 0 {
            return Err(PlanError::ZeroParameter {
                name: "max_groups_per_category",
            });
        }
        if self.min_per_group > self.max_per_group {
            return Err(PlanError::InvertedBounds {
                min: self.min_per_group,
                max: self.max_per_group,
            });
        }
        Ok(())
    }
}

/// Advisory diagnostics produced while sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingWarning {
    /// No group count within the category cap satisfies the band.
    InfeasibleBand {
        category: Category,
        demand: u32,
        min_per_group: u32,
        max_per_group: u32,
        resolved_groups: usize,
    },
}

impl fmt::Display for SizingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfeasibleBand {
                category,
                demand,
                min_per_group,
                max_per_group,
                resolved_groups,
            } => write!(
                f,
                "{category}: cannot keep between {min_per_group} and {max_per_group} \
                 per group and slot (demand {demand}); opening {resolved_groups} group(s)"
            ),
        }
    }
}

/// Resolved group counts plus any advisory warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSizing {
    pub group_counts: BTreeMap<Category, usize>,
    pub warnings: Vec<SizingWarning>,
}

/// Counts one unit of demand per listed preference.
pub fn count_demand(individuals: &[Individual]) -> BTreeMap<Category, u32> {
    let mut demand = BTreeMap::new();
    for individual in individuals {
        for category in &individual.preferences {
            *demand.entry(category.clone()).or_insert(0) += 1;
        }
    }
    demand
}

/// Computes the number of groups to open per category.
///
/// Categories with zero demand are omitted. See the
/// [module documentation](self) for the rules.
pub fn compute_group_counts(
    demand: &BTreeMap<Category, u32>,
    config: &SizingConfig,
) -> Result<GroupSizing, PlanError> {
    config.validate()?;

    // Each category is independent; collect keeps the map's order.
    let sized: Vec<(&Category, u32, usize, bool)> = demand
        .par_iter()
        .filter(|&(_, &n)| n > 0)
        .map(|(category, &n)| {
            let (groups, feasible) = size_category(n, config);
            (category, n, groups, feasible)
        })
        .collect();

    let mut sizing = GroupSizing::default();
    for (category, n, groups, feasible) in sized {
        if !feasible {
            tracing::warn!(
                category = %category,
                demand = n,
                min_per_group = config.min_per_group,
                max_per_group = config.max_per_group,
                resolved_groups = groups,
                "occupancy band infeasible, opening degraded group count"
            );
            sizing.warnings.push(SizingWarning::InfeasibleBand {
                category: category.clone(),
                demand: n,
                min_per_group: config.min_per_group,
                max_per_group: config.max_per_group,
                resolved_groups: groups,
            });
        }
        tracing::debug!(category = %category, demand = n, groups, "sized category");
        sizing.group_counts.insert(category.clone(), groups);
    }

    Ok(sizing)
}

/// Returns the group count for demand `n` and whether the band was feasible.
fn size_category(n: u32, config: &SizingConfig) -> (usize, bool) {
    let n = u64::from(n);
    let slots = config.slot_count as u64;
    let cap = config.max_groups_per_category as u64;

    let min_groups = n.div_ceil(slots * u64::from(config.max_per_group));

    let max_groups = if n >= u64::from(config.min_per_group) {
        (n / (slots * u64::from(config.min_per_group))).max(1)
    } else {
        1
    };
    let max_groups = max_groups.min(cap);

    let feasible = min_groups <= max_groups;
    let groups = if feasible {
        min_groups
    } else {
        min_groups.min(cap)
    };

    (groups.clamp(1, cap) as usize, feasible)
}
