//! Per-category occupancy counters.
//!
//! Grids live in an arena indexed by [`GridId`]; a category's grid is
//! allocated the first time the category is referenced and keeps its shape
//! (`slot_count x group_count`) for the rest of the run.

use std::collections::HashMap;

use crate::Category;

/// Handle to a grid inside an [`OccupancyTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(usize);

/// Live counts for one category, indexed by `[slot][group]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    slot_count: usize,
    group_count: usize,
    cells: Vec<u32>,
}

impl OccupancyGrid {
    fn new(slot_count: usize, group_count: usize) -> Self {
        Self {
            slot_count,
            group_count,
            cells: vec![0; slot_count * group_count],
        }
    }

    pub const fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub const fn group_count(&self) -> usize {
        self.group_count
    }

    /// Individuals currently placed in `slot`/`group`.
    pub fn count(&self, slot: usize, group: usize) -> u32 {
        self.cells[self.offset(slot, group)]
    }

    /// Sum over every cell.
    pub fn total(&self) -> u32 {
        self.cells.iter().sum()
    }

    const fn offset(&self, slot: usize, group: usize) -> usize {
        debug_assert!(slot < self.slot_count && group < self.group_count);
        slot * self.group_count + group
    }
}

/// Arena of occupancy grids owned by a single planning run.
#[derive(Debug, Clone)]
pub struct OccupancyTable {
    slot_count: usize,
    grids: Vec<OccupancyGrid>,
    categories: Vec<Category>,
    index: HashMap<Category, GridId>,
}

impl OccupancyTable {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            grids: Vec::new(),
            categories: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the grid for `category`, allocating it with `group_count`
    /// groups on first reference. Later calls ignore `group_count`.
    pub fn grid_for(&mut self, category: &Category, group_count: usize) -> GridId {
        if let Some(&id) = self.index.get(category) {
            return id;
        }
        let id = GridId(self.grids.len());
        self.grids
            .push(OccupancyGrid::new(self.slot_count, group_count));
        self.categories.push(category.clone());
        self.index.insert(category.clone(), id);
        tracing::trace!(category = %category, group_count, "allocated occupancy grid");
        id
    }

    pub fn grid(&self, id: GridId) -> &OccupancyGrid {
        &self.grids[id.0]
    }

    /// Looks up a category's grid without allocating.
    pub fn get(&self, category: &Category) -> Option<&OccupancyGrid> {
        self.index.get(category).map(|&id| self.grid(id))
    }

    pub fn increment(&mut self, id: GridId, slot: usize, group: usize) {
        let grid = &mut self.grids[id.0];
        let offset = grid.offset(slot, group);
        grid.cells[offset] += 1;
    }

    pub fn decrement(&mut self, id: GridId, slot: usize, group: usize) {
        let grid = &mut self.grids[id.0];
        let offset = grid.offset(slot, group);
        debug_assert!(grid.cells[offset] > 0, "occupancy underflow");
        grid.cells[offset] = grid.cells[offset].saturating_sub(1);
    }

    /// Grids in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&Category, &OccupancyGrid)> {
        self.categories.iter().zip(self.grids.iter())
    }
}
