//! Authoritative tower state management.

use std::collections::BTreeMap;
use std::time::Duration;

use color_clash_core::{CellCoord, Faction, TowerRules, TowerSnapshot};

/// A tower stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tower {
    pub(crate) cell: CellCoord,
    pub(crate) faction: Faction,
    /// Level in `1..=max_level`; never decreases.
    pub(crate) level: u32,
    /// Match-clock reading of the most recent shot. `None` means the tower
    /// has never fired and is immediately ready.
    pub(crate) last_fired: Option<Duration>,
}

impl Tower {
    pub(crate) fn new(cell: CellCoord, faction: Faction) -> Self {
        Self {
            cell,
            faction,
            level: 1,
            last_fired: None,
        }
    }

    /// Reports whether the tower's level-scaled fire interval has elapsed.
    pub(crate) fn ready_to_fire(&self, now: Duration, rules: &TowerRules) -> bool {
        self.last_fired
            .map_or(true, |fired| now.saturating_sub(fired) >= rules.fire_interval(self.level))
    }
}

/// Registry that stores towers keyed by the cell they occupy.
///
/// Keying by cell makes position uniqueness structural: no two towers can
/// ever share a cell.
#[derive(Clone, Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<CellCoord, Tower>,
}

impl TowerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, tower: Tower) {
        let _ = self.entries.insert(tower.cell, tower);
    }

    /// Removes the tower at the cell, if any. Not an error when absent.
    pub(crate) fn remove(&mut self, cell: CellCoord) -> Option<Tower> {
        self.entries.remove(&cell)
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&Tower> {
        self.entries.get(&cell)
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut Tower> {
        self.entries.get_mut(&cell)
    }

    /// Iterator over towers in deterministic cell order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    pub(crate) fn count_by_faction(&self, faction: Faction) -> u32 {
        self.entries
            .values()
            .filter(|tower| tower.faction == faction)
            .count() as u32
    }

    pub(crate) fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries
            .values()
            .map(|tower| TowerSnapshot {
                cell: tower.cell,
                faction: tower.faction,
                level: tower.level,
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
