#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Heuristic decision system for the scripted faction.
//!
//! The policy is stateless: every invocation re-derives its candidates from
//! the current snapshots and produces exactly one choice — build, upgrade,
//! or hold. Placement ranks frontier cells first; it is a fixed heuristic,
//! not a search over outcomes.

use std::cmp::Ordering;

use color_clash_core::{
    BoardView, CellCoord, Command, DecisionTuning, PlayerSnapshot, RandomSource, TowerRules,
    TowerView,
};

/// Extra build probability applied while the opponent fields more towers.
const BUILD_PRESSURE_BONUS: f64 = 0.2;
/// Extra upgrade probability applied while holding fewer cells than the opponent.
const UPGRADE_PRESSURE_BONUS: f64 = 0.2;
/// Tower count under which building becomes near-certain.
const FEW_TOWERS_THRESHOLD: u32 = 3;
/// Build probability forced while under the tower threshold.
const FORCED_BUILD_PROBABILITY: f64 = 0.9;
/// Gold balance under which both probabilities are scaled down.
const LOW_GOLD_THRESHOLD: u32 = 20;
/// Scale factor conserving gold while below the threshold.
const LOW_GOLD_SCALE: f64 = 0.8;

/// Weight of a tower's frontier position in its upgrade score.
const POSITION_WEIGHT: f64 = 0.7;
/// Weight of a tower's remaining headroom in its upgrade score.
const LEVEL_WEIGHT: f64 = 0.3;

/// Single action chosen by one decision cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// Build a level-1 tower at the provided cell.
    Build(CellCoord),
    /// Upgrade the tower occupying the provided cell.
    Upgrade(CellCoord),
    /// Spend nothing this cycle.
    Hold,
}

/// Upgrade candidate ranked by the scoring heuristic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradePriority {
    /// Cell holding the candidate tower.
    pub cell: CellCoord,
    /// Heuristic priority, higher first.
    pub score: f64,
    /// Gold required for the upgrade.
    pub cost: u32,
}

/// Heuristic policy for the scripted faction.
#[derive(Clone, Copy, Debug)]
pub struct Strategy {
    tuning: DecisionTuning,
    rules: TowerRules,
}

impl Strategy {
    /// Creates a policy from the match's decision tuning and tower rules.
    #[must_use]
    pub const fn new(tuning: DecisionTuning, rules: TowerRules) -> Self {
        Self { tuning, rules }
    }

    /// Chooses exactly one action for the faction described by `me`.
    ///
    /// Build is always attempted before upgrade within a single cycle; each
    /// branch consumes at most one random draw.
    #[must_use]
    pub fn decide(
        &self,
        board: &BoardView<'_>,
        towers: &TowerView,
        me: &PlayerSnapshot,
        rng: &mut dyn RandomSource,
    ) -> Choice {
        let candidates = ranked_build_cells(board, me);
        let upgrades = upgrade_priorities(towers, me, &self.rules);

        let my_towers = towers.count(me.faction);
        let foe_towers = towers.count(me.faction.opponent());
        let my_cells = board.count(me.faction);
        let foe_cells = board.count(me.faction.opponent());

        let mut build_probability = self.tuning.build_probability;
        let mut upgrade_probability = self.tuning.upgrade_probability;
        if foe_towers > my_towers {
            build_probability += BUILD_PRESSURE_BONUS;
        }
        if my_cells < foe_cells {
            upgrade_probability += UPGRADE_PRESSURE_BONUS;
        }
        if my_towers < FEW_TOWERS_THRESHOLD {
            build_probability = FORCED_BUILD_PROBABILITY;
        }
        if me.gold < LOW_GOLD_THRESHOLD {
            build_probability *= LOW_GOLD_SCALE;
            upgrade_probability *= LOW_GOLD_SCALE;
        }

        if me.gold >= self.rules.build_cost
            && !candidates.is_empty()
            && rng.next_unit() < build_probability
        {
            return Choice::Build(candidates[0]);
        }

        if let Some(upgrade) = upgrades.iter().find(|upgrade| upgrade.cost <= me.gold) {
            if rng.next_unit() < upgrade_probability {
                return Choice::Upgrade(upgrade.cell);
            }
        }

        Choice::Hold
    }

    /// Runs one decision cycle and emits the matching command, if any.
    pub fn handle(
        &self,
        board: &BoardView<'_>,
        towers: &TowerView,
        me: &PlayerSnapshot,
        rng: &mut dyn RandomSource,
        out: &mut Vec<Command>,
    ) {
        match self.decide(board, towers, me, rng) {
            Choice::Build(cell) => out.push(Command::BuildTower {
                cell,
                faction: me.faction,
            }),
            Choice::Upgrade(cell) => out.push(Command::UpgradeTower { cell }),
            Choice::Hold => {}
        }
    }
}

/// Unoccupied faction-owned cells inside the territory band, ranked by row
/// descending so cells nearer the contested frontier come first. Columns
/// stay in ascending scan order within a row.
#[must_use]
pub fn ranked_build_cells(board: &BoardView<'_>, me: &PlayerSnapshot) -> Vec<CellCoord> {
    let (columns, _) = board.dimensions();
    let mut cells = Vec::new();
    for row in me.territory.start()..me.territory.end() {
        for column in 0..columns {
            let cell = CellCoord::new(row, column);
            if board.owner(cell) == Some(me.faction) && !board.is_occupied(cell) {
                cells.push(cell);
            }
        }
    }
    cells.sort_by(|a, b| b.row().cmp(&a.row()));
    cells
}

/// Faction-owned towers below max level scored by frontier position and
/// remaining level headroom, sorted descending.
#[must_use]
pub fn upgrade_priorities(
    towers: &TowerView,
    me: &PlayerSnapshot,
    rules: &TowerRules,
) -> Vec<UpgradePriority> {
    let depth = f64::from(me.territory.depth().max(1));
    let max_level = f64::from(rules.max_level);
    let mut priorities: Vec<UpgradePriority> = towers
        .iter()
        .filter(|tower| tower.faction == me.faction && tower.level < rules.max_level)
        .map(|tower| {
            let position_score = f64::from(tower.cell.row()) / depth;
            let level_score = (max_level - f64::from(tower.level)) / max_level;
            UpgradePriority {
                cell: tower.cell,
                score: POSITION_WEIGHT * position_score + LEVEL_WEIGHT * level_score,
                cost: rules.upgrade_cost(tower.level),
            }
        })
        .collect();
    priorities.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    priorities
}
