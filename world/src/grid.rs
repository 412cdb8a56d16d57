//! Dense cell ownership and occupancy storage.

use color_clash_core::{CellCoord, Faction, RowBand};

/// Row-major grid of cell ownership plus a parallel tower-occupancy flag.
///
/// Dimensions are fixed for the lifetime of a match.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    owners: Vec<Faction>,
    occupied: Vec<bool>,
}

impl Grid {
    /// Creates a grid split at the boundary row: rows above belong to Red,
    /// rows at or below belong to Blue.
    pub(crate) fn new(columns: u32, rows: u32, boundary_row: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut owners = Vec::with_capacity(capacity);
        for row in 0..rows {
            let owner = if row < boundary_row {
                Faction::Red
            } else {
                Faction::Blue
            };
            for _ in 0..columns {
                owners.push(owner);
            }
        }
        Self {
            columns,
            rows,
            owners,
            occupied: vec![false; capacity],
        }
    }

    /// Reports whether the cell lies within the configured dimensions.
    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Faction owning the provided cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the configured dimensions; callers
    /// are expected to pre-validate coordinates.
    pub(crate) fn owner_at(&self, cell: CellCoord) -> Faction {
        self.owners[self.expect_index(cell)]
    }

    /// Reassigns the cell's owning faction. Idempotent if unchanged.
    pub(crate) fn set_owner(&mut self, cell: CellCoord, faction: Faction) {
        let index = self.expect_index(cell);
        self.owners[index] = faction;
    }

    /// Reports whether the cell currently holds a tower.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupied[self.expect_index(cell)]
    }

    /// Updates the tower-occupancy flag, independent of ownership.
    pub(crate) fn set_occupied(&mut self, cell: CellCoord, occupied: bool) {
        let index = self.expect_index(cell);
        self.occupied[index] = occupied;
    }

    /// Counts the cells owned by the provided faction with a full scan.
    pub(crate) fn count_by_faction(&self, faction: Faction) -> u32 {
        self.owners.iter().filter(|owner| **owner == faction).count() as u32
    }

    /// Cells within the band that the faction owns and that hold no tower,
    /// in row-major scan order.
    pub(crate) fn available_build_cells(&self, faction: Faction, band: RowBand) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for row in band.start()..band.end().min(self.rows) {
            for column in 0..self.columns {
                let cell = CellCoord::new(row, column);
                let index = self.expect_index(cell);
                if self.owners[index] == faction && !self.occupied[index] {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    pub(crate) fn owners(&self) -> &[Faction] {
        &self.owners
    }

    pub(crate) fn occupied(&self) -> &[bool] {
        &self.occupied
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn expect_index(&self, cell: CellCoord) -> usize {
        assert!(
            self.contains(cell),
            "cell ({}, {}) outside {}x{} grid",
            cell.row(),
            cell.column(),
            self.rows,
            self.columns,
        );
        let width = self.columns as usize;
        cell.row() as usize * width + cell.column() as usize
    }
}
