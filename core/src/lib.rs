#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Color Clash engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and presentation adapters to react to. Systems consume event
//! streams, query immutable snapshot views, and respond exclusively with new
//! command batches.

mod config;

pub use config::{DecisionTuning, MatchConfig, ProjectileTuning, TowerRules, VictoryRules};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One of the two competing sides.
///
/// Red is driven by the scripted decision process and fires toward
/// increasing row indices; Blue is driven by external commands and fires
/// toward decreasing row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// The scripted faction occupying the upper row band.
    Red,
    /// The externally commanded faction occupying the lower row band.
    Blue,
}

impl Faction {
    /// Both factions in deterministic order.
    pub const BOTH: [Faction; 2] = [Faction::Red, Faction::Blue];

    /// The opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Sign of vertical projectile travel: positive toward increasing rows.
    #[must_use]
    pub const fn fire_direction(self) -> f32 {
        match self {
            Self::Red => 1.0,
            Self::Blue => -1.0,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Contiguous half-open band of rows assigned to a faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowBand {
    start: u32,
    end: u32,
}

impl RowBand {
    /// Creates a band covering `start..end`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// First row contained in the band.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// First row past the end of the band.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Reports whether the band contains the provided row.
    #[must_use]
    pub const fn contains(&self, row: u32) -> bool {
        row >= self.start && row < self.end
    }

    /// Number of rows spanned by the band.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Requests construction of a level-1 tower on the provided cell.
    BuildTower {
        /// Cell the tower should occupy.
        cell: CellCoord,
        /// Faction attempting the build.
        faction: Faction,
    },
    /// Requests an upgrade of the tower occupying the provided cell.
    UpgradeTower {
        /// Cell holding the tower to upgrade.
        cell: CellCoord,
    },
    /// Stamps and announces every tower whose fire interval has elapsed.
    FireReadyTowers {
        /// Current match clock reading.
        now: Duration,
    },
    /// Applies a projectile impact against the provided cell.
    ApplyImpact {
        /// Cell struck by the projectile.
        cell: CellCoord,
        /// Faction that fired the projectile.
        faction: Faction,
    },
    /// Credits one accrual tick of gold to both factions.
    AccrueGold,
    /// Evaluates the enabled win conditions.
    EvaluateVictory,
    /// Resets the match to its initial state.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a tower was constructed.
    TowerBuilt {
        /// Cell occupied by the new tower.
        cell: CellCoord,
        /// Faction that owns the tower.
        faction: Faction,
        /// Level assigned at construction, always 1.
        level: u32,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Cell holding the upgraded tower.
        cell: CellCoord,
        /// Faction that owns the tower.
        faction: Faction,
        /// Level the tower reached.
        level: u32,
    },
    /// Announces that a projectile destroyed a tower.
    TowerDestroyed {
        /// Cell the tower occupied.
        cell: CellCoord,
        /// Faction that owned the destroyed tower.
        faction: Faction,
    },
    /// Announces that a cell changed ownership.
    CellCaptured {
        /// Cell that changed hands.
        cell: CellCoord,
        /// Faction that now owns the cell.
        faction: Faction,
    },
    /// Reports a faction's gold balance after a credit or debit.
    GoldChanged {
        /// Faction whose ledger changed.
        faction: Faction,
        /// Balance after the change.
        gold: u32,
    },
    /// Announces that a tower fired a projectile.
    TowerFired {
        /// Cell holding the firing tower.
        cell: CellCoord,
        /// Faction that owns the tower.
        faction: Faction,
        /// Level of the firing tower.
        level: u32,
    },
    /// Reports that a build request was rejected.
    BuildRejected {
        /// Cell provided in the build request.
        cell: CellCoord,
        /// Faction that attempted the build.
        faction: Faction,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Cell provided in the upgrade request.
        cell: CellCoord,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Announces that a win condition was met and the match ended.
    MatchEnded {
        /// Faction that won the match.
        winner: Faction,
    },
    /// Announces that the match was reset to its initial state.
    MatchRestarted,
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The cell's row lies outside the faction's assigned territory band.
    WrongTerritory,
    /// The cell already holds a tower.
    CellOccupied,
    /// The faction cannot afford the build cost.
    InsufficientGold,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower occupies the provided cell.
    NoTowerAtCell,
    /// The tower already sits at the maximum level.
    MaxLevelReached,
    /// The owning faction cannot afford the upgrade cost.
    InsufficientGold,
}

/// Lifecycle state of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    /// The match is running and commands are accepted.
    InProgress,
    /// A win condition fired; only a restart is accepted.
    Ended(Faction),
}

/// Read-only view into the dense ownership and occupancy grids.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    owners: &'a [Faction],
    occupied: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided cell slices.
    #[must_use]
    pub fn new(owners: &'a [Faction], occupied: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            owners,
            occupied,
            columns,
            rows,
        }
    }

    /// Returns the faction owning the provided cell, if it is in bounds.
    #[must_use]
    pub fn owner(&self, cell: CellCoord) -> Option<Faction> {
        self.index(cell)
            .and_then(|index| self.owners.get(index).copied())
    }

    /// Reports whether the provided cell holds a tower.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.occupied.get(index).copied().unwrap_or(false))
    }

    /// Counts the cells currently owned by the provided faction.
    #[must_use]
    pub fn count(&self, faction: Faction) -> u32 {
        self.owners.iter().filter(|owner| **owner == faction).count() as u32
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerSnapshot {
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Faction that owns the tower.
    pub faction: Faction,
    /// Current level of the tower.
    pub level: u32,
}

/// Read-only snapshot describing all towers on the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Counts the towers owned by the provided faction.
    #[must_use]
    pub fn count(&self, faction: Faction) -> u32 {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.faction == faction)
            .count() as u32
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a faction's ledger used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Faction the ledger belongs to.
    pub faction: Faction,
    /// Current gold balance.
    pub gold: u32,
    /// Whether the faction has built at least one tower this match.
    pub has_built_tower: bool,
    /// Row band assigned to the faction.
    pub territory: RowBand,
}

/// Discrete fire-and-forget cues consumed by an audio adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// A tower fired a projectile.
    Shoot,
    /// A projectile destroyed a tower.
    Explosion,
    /// A cell changed ownership.
    CellCaptured,
    /// The match ended with a winner.
    Victory,
}

impl AudioCue {
    /// Maps a world event onto its audio cue, if it has one.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::TowerFired { .. } => Some(Self::Shoot),
            Event::TowerDestroyed { .. } => Some(Self::Explosion),
            Event::CellCaptured { .. } => Some(Self::CellCaptured),
            Event::MatchEnded { .. } => Some(Self::Victory),
            _ => None,
        }
    }
}

/// Pluggable source of uniform randomness.
///
/// The decision process and the projectile spread both branch on raw
/// randomness; injecting the source lets tests supply deterministic
/// sequences to exercise either branch.
pub trait RandomSource {
    /// Returns the next uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::{
        AudioCue, BuildError, CellCoord, Event, Faction, MatchConfig, MatchState, RowBand,
        UpgradeError,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn faction_opponents_are_symmetric() {
        assert_eq!(Faction::Red.opponent(), Faction::Blue);
        assert_eq!(Faction::Blue.opponent(), Faction::Red);
    }

    #[test]
    fn fire_directions_oppose_each_other() {
        assert!((Faction::Red.fire_direction() + Faction::Blue.fire_direction()).abs() < f32::EPSILON);
        assert!(Faction::Red.fire_direction() > 0.0);
    }

    #[test]
    fn row_band_contains_half_open_range() {
        let band = RowBand::new(10, 20);
        assert!(!band.contains(9));
        assert!(band.contains(10));
        assert!(band.contains(19));
        assert!(!band.contains(20));
        assert_eq!(band.depth(), 10);
    }

    #[test]
    fn upgrade_cost_grows_geometrically() {
        let rules = MatchConfig::default().towers;
        for level in 1..rules.max_level {
            assert_eq!(
                rules.upgrade_cost(level + 1),
                rules.upgrade_cost(level) * rules.upgrade_cost_multiplier
            );
        }
        assert_eq!(rules.upgrade_cost(1), 10);
        assert_eq!(rules.upgrade_cost(2), 20);
        assert_eq!(rules.upgrade_cost(3), 40);
    }

    #[test]
    fn fire_interval_divides_by_level() {
        let rules = MatchConfig::default().towers;
        assert_eq!(rules.fire_interval(1), rules.fire_interval_base);
        assert_eq!(rules.fire_interval(2), rules.fire_interval_base / 2);
        assert_eq!(rules.fire_interval(5), rules.fire_interval_base / 5);
    }

    #[test]
    fn default_territories_split_at_boundary() {
        let config = MatchConfig::default();
        assert_eq!(config.territory(Faction::Red), RowBand::new(0, 10));
        assert_eq!(config.territory(Faction::Blue), RowBand::new(10, 20));
        assert_eq!(config.cell_count(), 200);
    }

    #[test]
    fn audio_cues_map_presentation_events() {
        let cell = CellCoord::new(3, 4);
        let shoot = Event::TowerFired {
            cell,
            faction: Faction::Red,
            level: 2,
        };
        let capture = Event::CellCaptured {
            cell,
            faction: Faction::Blue,
        };
        let gold = Event::GoldChanged {
            faction: Faction::Red,
            gold: 11,
        };
        assert_eq!(AudioCue::from_event(&shoot), Some(AudioCue::Shoot));
        assert_eq!(AudioCue::from_event(&capture), Some(AudioCue::CellCaptured));
        assert_eq!(AudioCue::from_event(&gold), None);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(7, 3));
    }

    #[test]
    fn error_enums_round_trip_through_bincode() {
        assert_round_trip(&BuildError::WrongTerritory);
        assert_round_trip(&UpgradeError::MaxLevelReached);
    }

    #[test]
    fn match_state_round_trips_through_bincode() {
        assert_round_trip(&MatchState::Ended(Faction::Blue));
    }

    #[test]
    fn match_config_round_trips_through_bincode() {
        assert_round_trip(&MatchConfig::default());
    }
}
