//! Per-faction ledgers and territory assignments.

use color_clash_core::{Faction, PlayerSnapshot, RowBand};

/// Mutable ledger state for one faction.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlayerState {
    pub(crate) faction: Faction,
    pub(crate) gold: u32,
    pub(crate) territory: RowBand,
    /// Set by the first successful build; gates the tower-elimination
    /// win check for the match's lifetime.
    pub(crate) has_built_tower: bool,
}

impl PlayerState {
    pub(crate) fn new(faction: Faction, gold: u32, territory: RowBand) -> Self {
        Self {
            faction,
            gold,
            territory,
            has_built_tower: false,
        }
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            faction: self.faction,
            gold: self.gold,
            has_built_tower: self.has_built_tower,
            territory: self.territory,
        }
    }
}
