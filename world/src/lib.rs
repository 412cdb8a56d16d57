#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Color Clash.
//!
//! The world owns the grid, the tower registry, and the faction ledgers.
//! All mutation flows through [`apply`], which validates each command,
//! leaves every ledger and registry untouched on failure, and broadcasts
//! [`Event`] values describing what actually happened.

mod grid;
mod players;
mod towers;

use std::time::Duration;

use color_clash_core::{
    BuildError, CellCoord, Command, Event, Faction, MatchConfig, MatchState, UpgradeError,
};
use grid::Grid;
use players::PlayerState;
use towers::{Tower, TowerRegistry};

/// Represents the authoritative Color Clash world state.
#[derive(Clone, Debug)]
pub struct World {
    config: MatchConfig,
    grid: Grid,
    towers: TowerRegistry,
    players: [PlayerState; 2],
    match_state: MatchState,
}

impl World {
    /// Creates a new world laid out according to the provided configuration.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        let grid = Grid::new(config.columns, config.rows, config.territory_boundary_row);
        let players = [
            PlayerState::new(
                Faction::Red,
                config.starting_gold,
                config.territory(Faction::Red),
            ),
            PlayerState::new(
                Faction::Blue,
                config.starting_gold,
                config.territory(Faction::Blue),
            ),
        ];
        Self {
            config,
            grid,
            towers: TowerRegistry::new(),
            players,
            match_state: MatchState::InProgress,
        }
    }

    fn player(&self, faction: Faction) -> &PlayerState {
        &self.players[player_index(faction)]
    }

    fn player_mut(&mut self, faction: Faction) -> &mut PlayerState {
        &mut self.players[player_index(faction)]
    }

    fn build_tower(
        &mut self,
        cell: CellCoord,
        faction: Faction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BuildError> {
        let territory = self.player(faction).territory;
        if !territory.contains(cell.row()) || cell.column() >= self.config.columns {
            return Err(BuildError::WrongTerritory);
        }
        if self.grid.is_occupied(cell) {
            return Err(BuildError::CellOccupied);
        }
        let cost = self.config.towers.build_cost;
        if self.player(faction).gold < cost {
            return Err(BuildError::InsufficientGold);
        }

        self.towers.insert(Tower::new(cell, faction));
        self.grid.set_occupied(cell, true);
        let player = self.player_mut(faction);
        player.gold -= cost;
        player.has_built_tower = true;
        let gold = player.gold;
        out_events.push(Event::TowerBuilt {
            cell,
            faction,
            level: 1,
        });
        out_events.push(Event::GoldChanged { faction, gold });
        Ok(())
    }

    fn upgrade_tower(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), UpgradeError> {
        let (faction, level) = match self.towers.get(cell) {
            Some(tower) => (tower.faction, tower.level),
            None => return Err(UpgradeError::NoTowerAtCell),
        };
        if level >= self.config.towers.max_level {
            return Err(UpgradeError::MaxLevelReached);
        }
        let cost = self.config.towers.upgrade_cost(level);
        if self.player(faction).gold < cost {
            return Err(UpgradeError::InsufficientGold);
        }

        if let Some(tower) = self.towers.get_mut(cell) {
            tower.level += 1;
        }
        let player = self.player_mut(faction);
        player.gold -= cost;
        let gold = player.gold;
        out_events.push(Event::TowerUpgraded {
            cell,
            faction,
            level: level + 1,
        });
        out_events.push(Event::GoldChanged { faction, gold });
        Ok(())
    }

    fn fire_ready_towers(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let rules = self.config.towers;
        for tower in self.towers.iter_mut() {
            if tower.ready_to_fire(now, &rules) {
                tower.last_fired = Some(now);
                out_events.push(Event::TowerFired {
                    cell: tower.cell,
                    faction: tower.faction,
                    level: tower.level,
                });
            }
        }
    }

    fn apply_impact(&mut self, cell: CellCoord, faction: Faction, out_events: &mut Vec<Event>) {
        if !self.grid.contains(cell) {
            return;
        }
        if self.grid.owner_at(cell) == faction {
            return;
        }

        if let Some(tower) = self.towers.remove(cell) {
            self.grid.set_occupied(cell, false);
            out_events.push(Event::TowerDestroyed {
                cell,
                faction: tower.faction,
            });
        }
        self.grid.set_owner(cell, faction);
        out_events.push(Event::CellCaptured { cell, faction });
        let reward = self.config.projectiles.capture_reward;
        let player = self.player_mut(faction);
        player.gold += reward;
        let gold = player.gold;
        out_events.push(Event::GoldChanged { faction, gold });
    }

    fn accrue_gold(&mut self, out_events: &mut Vec<Event>) {
        let income = self.config.gold_per_tick;
        for player in self.players.iter_mut() {
            player.gold += income;
            out_events.push(Event::GoldChanged {
                faction: player.faction,
                gold: player.gold,
            });
        }
    }

    fn evaluate_victory(&mut self, out_events: &mut Vec<Event>) {
        let mut winner = None;

        if self.config.victory.by_towers {
            let red = self.player(Faction::Red);
            let blue = self.player(Faction::Blue);
            // A faction that never attempted to build cannot lose by
            // elimination, so the check only arms once both have built.
            if red.has_built_tower && blue.has_built_tower {
                if self.towers.count_by_faction(Faction::Red) == 0 {
                    winner = Some(Faction::Blue);
                } else if self.towers.count_by_faction(Faction::Blue) == 0 {
                    winner = Some(Faction::Red);
                }
            }
        }

        if winner.is_none() && self.config.victory.by_territory {
            let total = self.config.cell_count();
            for faction in Faction::BOTH {
                if self.grid.count_by_faction(faction) == total {
                    winner = Some(faction);
                    break;
                }
            }
        }

        if let Some(winner) = winner {
            self.match_state = MatchState::Ended(winner);
            out_events.push(Event::MatchEnded { winner });
        }
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        self.grid = Grid::new(
            self.config.columns,
            self.config.rows,
            self.config.territory_boundary_row,
        );
        self.towers.clear();
        for player in self.players.iter_mut() {
            player.gold = self.config.starting_gold;
            player.has_built_tower = false;
        }
        self.match_state = MatchState::InProgress;
        out_events.push(Event::MatchRestarted);
    }
}

const fn player_index(faction: Faction) -> usize {
    match faction {
        Faction::Red => 0,
        Faction::Blue => 1,
    }
}

/// Applies the provided command to the world, mutating state synchronously.
///
/// Once the match has ended every command other than [`Command::Restart`]
/// is ignored, so callbacks scheduled before the end transition cannot act
/// on stale in-progress assumptions.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.match_state != MatchState::InProgress && !matches!(command, Command::Restart) {
        return;
    }

    match command {
        Command::BuildTower { cell, faction } => {
            if let Err(reason) = world.build_tower(cell, faction, out_events) {
                out_events.push(Event::BuildRejected {
                    cell,
                    faction,
                    reason,
                });
            }
        }
        Command::UpgradeTower { cell } => {
            if let Err(reason) = world.upgrade_tower(cell, out_events) {
                out_events.push(Event::UpgradeRejected { cell, reason });
            }
        }
        Command::FireReadyTowers { now } => world.fire_ready_towers(now, out_events),
        Command::ApplyImpact { cell, faction } => world.apply_impact(cell, faction, out_events),
        Command::AccrueGold => world.accrue_gold(out_events),
        Command::EvaluateVictory => world.evaluate_victory(out_events),
        Command::Restart => world.restart(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use color_clash_core::{BoardView, CellCoord, Faction, MatchState, PlayerSnapshot, TowerView};

    /// Exposes a read-only view of the ownership and occupancy grids.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        let (columns, rows) = world.grid.dimensions();
        BoardView::new(world.grid.owners(), world.grid.occupied(), columns, rows)
    }

    /// Captures a read-only view of all towers in deterministic cell order.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots())
    }

    /// Captures the ledger snapshot for the provided faction.
    #[must_use]
    pub fn player(world: &World, faction: Faction) -> PlayerSnapshot {
        world.player(faction).snapshot()
    }

    /// Current lifecycle state of the match.
    #[must_use]
    pub fn match_state(world: &World) -> MatchState {
        world.match_state
    }

    /// Cells the faction could legally build on right now, in row-major
    /// scan order. Callers needing a priority order apply their own sort.
    #[must_use]
    pub fn available_build_cells(world: &World, faction: Faction) -> Vec<CellCoord> {
        let territory = world.player(faction).territory;
        world.grid.available_build_cells(faction, territory)
    }
}
