//! Cell → ants lookup used for "who else is standing here" questions.

use crate::ant::{Ant, AntId};
use crate::world::Cell;
use std::collections::HashMap;

/// Tracks which ants stand on which cell.
///
/// Each cell keeps its ants in registration/arrival order, which is the order
/// health sharing walks. Cells with no ants are pruned.
#[derive(Debug, Default)]
pub struct OccupancyIndex {
    cells: HashMap<Cell, Vec<AntId>>,
    positions: HashMap<AntId, Cell>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ant at its current position. Registering twice is a no-op.
    pub fn register(&mut self, ant: &Ant) {
        if self.positions.contains_key(&ant.id) {
            return;
        }
        let cell = ant.position();
        self.positions.insert(ant.id, cell);
        self.cells.entry(cell).or_default().push(ant.id);
    }

    pub fn unregister(&mut self, ant: &Ant) {
        if let Some(cell) = self.positions.remove(&ant.id) {
            self.remove_from_cell(ant.id, cell);
        }
    }

    /// Move an ant to `cell`, updating the index before the ant's own position
    pub fn move_to(&mut self, ant: &mut Ant, cell: Cell) {
        let old = ant.position();
        if old == cell {
            return;
        }
        if self.positions.insert(ant.id, cell).is_some() {
            self.remove_from_cell(ant.id, old);
        }
        self.cells.entry(cell).or_default().push(ant.id);
        ant.set_position(cell);
    }

    /// Ants standing on `cell`; empty for unoccupied cells
    pub fn agents_at(&self, cell: Cell) -> &[AntId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell_of(&self, id: AntId) -> Option<Cell> {
        self.positions.get(&id).copied()
    }

    /// Number of registered ants
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of cells with at least one ant
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.positions.clear();
    }

    fn remove_from_cell(&mut self, id: AntId, cell: Cell) {
        if let Some(ids) = self.cells.get_mut(&cell) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}
