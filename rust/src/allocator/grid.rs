//! Day x child x slot availability grid.

use crate::interner::ChildId;
use crate::models::Occupant;

/// A cell that was already taken when a reservation tried to claim it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellTaken {
    pub child: ChildId,
    pub slot: usize,
    /// Label of the occupant already holding the cell.
    pub holder: String,
}

/// Write-once occupancy grid for one allocation run.
///
/// Cells are stored flat in day-major, then child, then slot order. A cell is
/// only ever written through [`Grid::reserve`], which refuses to touch a
/// non-empty cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    day_count: usize,
    child_count: usize,
    slot_count: usize,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    /// Build an empty grid with every cell free.
    ///
    /// Dimensions come from an already validated day set, child list and
    /// window, so none of them is zero in practice.
    pub fn empty(day_count: usize, child_count: usize, slot_count: usize) -> Self {
        Self {
            day_count,
            child_count,
            slot_count,
            cells: vec![None; day_count * child_count * slot_count],
        }
    }

    #[inline]
    fn index(&self, day: usize, child: ChildId, slot: usize) -> usize {
        (day * self.child_count + child) * self.slot_count + slot
    }

    pub fn day_count(&self) -> usize {
        self.day_count
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Occupant of a cell, `None` when free.
    pub fn get(&self, day: usize, child: ChildId, slot: usize) -> Option<&Occupant> {
        self.cells[self.index(day, child, slot)].as_ref()
    }

    /// All cells of one child on one day, indexed by slot.
    pub fn column(&self, day: usize, child: ChildId) -> &[Option<Occupant>] {
        let begin = self.index(day, child, 0);
        &self.cells[begin..begin + self.slot_count]
    }

    /// True if `blocks` consecutive slots from `start` are free and in range.
    pub fn is_run_free(&self, day: usize, child: ChildId, start: usize, blocks: usize) -> bool {
        start <= self.slot_count
            && blocks <= self.slot_count - start
            && self.column(day, child)[start..start + blocks]
                .iter()
                .all(|cell| cell.is_none())
    }

    /// Feasibility mask of start indices `0..=slot_count - blocks` for one child.
    ///
    /// Empty when the run cannot fit in a day at all.
    pub fn free_starts(&self, day: usize, child: ChildId, blocks: usize) -> Vec<bool> {
        if blocks == 0 || blocks > self.slot_count {
            return Vec::new();
        }
        (0..=self.slot_count - blocks)
            .map(|start| self.is_run_free(day, child, start, blocks))
            .collect()
    }

    /// Claim `blocks` slots from `start` for every child in `children`.
    ///
    /// All-or-nothing: every target cell is checked before any is written. The
    /// first cell of each child's run is marked as the session start.
    pub fn reserve(
        &mut self,
        day: usize,
        children: &[ChildId],
        start: usize,
        blocks: usize,
        occupant: &Occupant,
    ) -> Result<(), CellTaken> {
        for &child in children {
            for slot in start..start + blocks {
                if let Some(existing) = self.get(day, child, slot) {
                    return Err(CellTaken {
                        child,
                        slot,
                        holder: existing.label.clone(),
                    });
                }
            }
        }

        for &child in children {
            for (offset, slot) in (start..start + blocks).enumerate() {
                let idx = self.index(day, child, slot);
                self.cells[idx] = Some(Occupant {
                    is_session_start: offset == 0,
                    ..occupant.clone()
                });
            }
        }

        Ok(())
    }

    /// Number of occupied cells, over the whole grid.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}
