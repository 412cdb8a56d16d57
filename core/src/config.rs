//! Match configuration read once when a match is set up.
//!
//! Mid-match mutation of any of these values is undefined behavior; the
//! world, the systems, and the controller all capture what they need at
//! construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Faction, RowBand};

/// Tunable rules governing tower construction, upgrades, and firing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerRules {
    /// Gold cost of constructing a new tower.
    pub build_cost: u32,
    /// Gold cost of upgrading a level-1 tower.
    pub upgrade_base_cost: u32,
    /// Geometric growth factor applied to the upgrade cost per level.
    pub upgrade_cost_multiplier: u32,
    /// Highest level a tower may reach.
    pub max_level: u32,
    /// Interval between shots for a level-1 tower.
    pub fire_interval_base: Duration,
}

impl TowerRules {
    /// Gold required to upgrade a tower currently at `level`.
    ///
    /// Grows geometrically: `upgrade_base_cost * multiplier^(level - 1)`.
    #[must_use]
    pub fn upgrade_cost(&self, level: u32) -> u32 {
        self.upgrade_base_cost * self.upgrade_cost_multiplier.pow(level.saturating_sub(1))
    }

    /// Interval a tower at `level` must wait between shots.
    ///
    /// Fire rate scales linearly with level: the base interval divides by
    /// the level, so higher levels fire proportionally faster.
    #[must_use]
    pub fn fire_interval(&self, level: u32) -> Duration {
        self.fire_interval_base / level.max(1)
    }
}

/// Tunable parameters for projectile flight and impact.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    /// Projectile speed measured in grid cells per second.
    pub speed_cells_per_second: f32,
    /// Full width of the spread cone in degrees, centered on vertical.
    pub spread_degrees: f32,
    /// Cadence at which live projectiles are advanced and resolved.
    pub update_interval: Duration,
    /// Gold credited to the firing faction for each captured cell.
    pub capture_reward: u32,
}

/// Tunable parameters for the scripted faction's decision process.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTuning {
    /// Cadence at which the scripted faction reconsiders its options.
    pub interval: Duration,
    /// Base probability of building a tower when a build is possible.
    pub build_probability: f64,
    /// Base probability of upgrading a tower when an upgrade is possible.
    pub upgrade_probability: f64,
}

/// Selects which win conditions a match evaluates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryRules {
    /// Win by eliminating every tower of a faction that has built at least once.
    pub by_towers: bool,
    /// Win by owning every cell on the grid.
    pub by_territory: bool,
    /// Cadence at which the enabled win conditions are evaluated.
    pub poll_interval: Duration,
}

/// Complete configuration surface recognized by a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Number of rows laid out in the grid.
    pub rows: u32,
    /// Number of columns laid out in the grid.
    pub columns: u32,
    /// First row owned by Blue; rows above belong to Red.
    pub territory_boundary_row: u32,
    /// Side length of a square cell measured in world units.
    pub cell_length: f32,
    /// Gold each faction starts the match with.
    pub starting_gold: u32,
    /// Gold credited to each faction per accrual tick.
    pub gold_per_tick: u32,
    /// Cadence of the gold accrual tick.
    pub gold_interval: Duration,
    /// Cadence at which tower fire-readiness is polled.
    pub fire_poll_interval: Duration,
    /// Rules governing towers.
    pub towers: TowerRules,
    /// Rules governing projectiles.
    pub projectiles: ProjectileTuning,
    /// Rules governing the scripted faction's decisions.
    pub decision: DecisionTuning,
    /// Enabled win conditions.
    pub victory: VictoryRules,
}

impl MatchConfig {
    /// Contiguous row band assigned to the provided faction.
    ///
    /// Red owns the rows above the territory boundary, Blue the rows below.
    #[must_use]
    pub const fn territory(&self, faction: Faction) -> RowBand {
        match faction {
            Faction::Red => RowBand::new(0, self.territory_boundary_row),
            Faction::Blue => RowBand::new(self.territory_boundary_row, self.rows),
        }
    }

    /// Total number of cells on the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.rows * self.columns
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            columns: 10,
            territory_boundary_row: 10,
            cell_length: 40.0,
            starting_gold: 10,
            gold_per_tick: 1,
            gold_interval: Duration::from_secs(1),
            fire_poll_interval: Duration::from_millis(100),
            towers: TowerRules {
                build_cost: 10,
                upgrade_base_cost: 10,
                upgrade_cost_multiplier: 2,
                max_level: 5,
                fire_interval_base: Duration::from_millis(1000),
            },
            projectiles: ProjectileTuning {
                speed_cells_per_second: 2.0,
                spread_degrees: 90.0,
                update_interval: Duration::from_millis(16),
                capture_reward: 1,
            },
            decision: DecisionTuning {
                interval: Duration::from_secs(2),
                build_probability: 0.7,
                upgrade_probability: 0.5,
            },
            victory: VictoryRules {
                by_towers: true,
                by_territory: true,
                poll_interval: Duration::from_secs(1),
            },
        }
    }
}
