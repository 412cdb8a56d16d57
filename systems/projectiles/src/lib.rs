#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile lifecycle system: spawn, advance, and resolve against the grid.
//!
//! The system exclusively owns the live projectile set. It consumes
//! [`Event::TowerFired`] announcements to spawn, integrates positions with
//! wall-clock delta time so flight is frame-rate independent, and resolves
//! each projectile against a read-only board view, responding with
//! [`Command::ApplyImpact`] batches that the world executes atomically.

use std::time::Duration;

use color_clash_core::{
    BoardView, CellCoord, Command, Event, Faction, ProjectileTuning, RandomSource,
};

/// Outcome of resolving one projectile against the grid for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImpactOutcome {
    /// The projectile left the grid; it deactivates with no side effects.
    Exited,
    /// The projectile entered a non-friendly cell and deactivates.
    Impact {
        /// Cell struck by the projectile.
        cell: CellCoord,
    },
    /// The projectile sits over friendly territory and keeps flying.
    Passthrough,
}

/// Immutable representation of one live projectile for presentation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Continuous horizontal position in world units.
    pub x: f32,
    /// Continuous vertical position in world units.
    pub y: f32,
    /// Faction that fired the projectile.
    pub faction: Faction,
}

#[derive(Clone, Debug)]
struct Projectile {
    faction: Faction,
    x: f32,
    y: f32,
    /// Horizontal drift in cells per second, fixed at spawn.
    horizontal_speed: f32,
    /// Vertical speed in cells per second, signed by the faction direction.
    vertical_speed: f32,
    row: i64,
    column: i64,
    active: bool,
    last_update: Duration,
}

impl Projectile {
    fn advance(&mut self, now: Duration, cell_length: f32) {
        let dt = now.saturating_sub(self.last_update).as_secs_f32();
        self.last_update = now;
        self.y += self.vertical_speed * dt * cell_length;
        self.x += self.horizontal_speed * dt * cell_length;
        self.row = (self.y / cell_length).floor() as i64;
        self.column = (self.x / cell_length).floor() as i64;
    }

    fn resolve(&self, board: &BoardView<'_>) -> ImpactOutcome {
        let (columns, rows) = board.dimensions();
        if self.row < 0
            || self.column < 0
            || self.row >= i64::from(rows)
            || self.column >= i64::from(columns)
        {
            return ImpactOutcome::Exited;
        }
        let cell = CellCoord::new(self.row as u32, self.column as u32);
        match board.owner(cell) {
            Some(owner) if owner != self.faction => ImpactOutcome::Impact { cell },
            _ => ImpactOutcome::Passthrough,
        }
    }
}

/// System that owns and drives the live projectile set.
#[derive(Clone, Debug)]
pub struct Projectiles {
    tuning: ProjectileTuning,
    cell_length: f32,
    live: Vec<Projectile>,
}

impl Projectiles {
    /// Creates an empty projectile system for the given tuning and cell size.
    #[must_use]
    pub fn new(tuning: ProjectileTuning, cell_length: f32) -> Self {
        Self {
            tuning,
            cell_length,
            live: Vec::new(),
        }
    }

    /// Spawns from fire announcements, then advances and resolves every live
    /// projectile, emitting an impact command per struck cell.
    ///
    /// Projectiles that exited the grid or struck a cell are swept from the
    /// live set before returning, so an inactive projectile is never
    /// advanced again.
    pub fn handle(
        &mut self,
        events: &[Event],
        now: Duration,
        board: BoardView<'_>,
        rng: &mut dyn RandomSource,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TowerFired { cell, faction, .. } = event {
                self.live.push(self.spawn(*cell, *faction, now, rng));
            }
        }

        for projectile in self.live.iter_mut() {
            projectile.advance(now, self.cell_length);
            match projectile.resolve(&board) {
                ImpactOutcome::Exited => projectile.active = false,
                ImpactOutcome::Impact { cell } => {
                    out.push(Command::ApplyImpact {
                        cell,
                        faction: projectile.faction,
                    });
                    projectile.active = false;
                }
                ImpactOutcome::Passthrough => {}
            }
        }

        self.live.retain(|projectile| projectile.active);
    }

    fn spawn(
        &self,
        cell: CellCoord,
        faction: Faction,
        now: Duration,
        rng: &mut dyn RandomSource,
    ) -> Projectile {
        let speed = self.tuning.speed_cells_per_second;
        Projectile {
            faction,
            x: (cell.column() as f32 + 0.5) * self.cell_length,
            y: (cell.row() as f32 + 0.5) * self.cell_length,
            horizontal_speed: horizontal_drift(rng, &self.tuning),
            vertical_speed: speed * faction.fire_direction(),
            row: i64::from(cell.row()),
            column: i64::from(cell.column()),
            active: true,
            last_update: now,
        }
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Reports whether no projectiles are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Captures position snapshots for presentation, in spawn order.
    #[must_use]
    pub fn view(&self) -> Vec<ProjectileSnapshot> {
        self.live
            .iter()
            .map(|projectile| ProjectileSnapshot {
                x: projectile.x,
                y: projectile.y,
                faction: projectile.faction,
            })
            .collect()
    }

    /// Drops every live projectile; used when a match restarts.
    pub fn clear(&mut self) {
        self.live.clear();
    }
}

/// Samples a horizontal drift speed from the spread cone: a uniform angle
/// within `±spread/2` degrees of vertical, converted via `speed * sin`.
fn horizontal_drift(rng: &mut dyn RandomSource, tuning: &ProjectileTuning) -> f32 {
    let spread = tuning.spread_degrees;
    let angle_degrees = (rng.next_unit() as f32) * spread - spread / 2.0;
    angle_degrees.to_radians().sin() * tuning.speed_cells_per_second
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_clash_core::MatchConfig;

    struct Scripted(Vec<f64>);

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            if self.0.is_empty() {
                0.5
            } else {
                self.0.remove(0)
            }
        }
    }

    fn tuning() -> ProjectileTuning {
        MatchConfig::default().projectiles
    }

    #[test]
    fn drift_is_bounded_by_the_spread_cone() {
        let tuning = tuning();
        let limit = (tuning.spread_degrees / 2.0).to_radians().sin() * tuning.speed_cells_per_second;
        for sample in [0.0, 0.25, 0.5, 0.75, 0.999] {
            let mut rng = Scripted(vec![sample]);
            let drift = horizontal_drift(&mut rng, &tuning);
            assert!(drift.abs() <= limit + f32::EPSILON, "drift {drift} exceeds {limit}");
        }
    }

    #[test]
    fn centered_sample_flies_straight() {
        let mut rng = Scripted(vec![0.5]);
        let drift = horizontal_drift(&mut rng, &tuning());
        assert!(drift.abs() < 1e-6);
    }

    #[test]
    fn spawn_starts_at_the_cell_center() {
        let system = Projectiles::new(tuning(), 40.0);
        let mut rng = Scripted(vec![0.5]);
        let projectile = system.spawn(
            CellCoord::new(5, 3),
            Faction::Red,
            Duration::ZERO,
            &mut rng,
        );
        assert!((projectile.x - 140.0).abs() < f32::EPSILON);
        assert!((projectile.y - 220.0).abs() < f32::EPSILON);
        assert_eq!(projectile.row, 5);
        assert_eq!(projectile.column, 3);
        assert!(projectile.vertical_speed > 0.0);
    }

    #[test]
    fn advance_integrates_real_elapsed_time() {
        let system = Projectiles::new(tuning(), 40.0);
        let mut rng = Scripted(vec![0.5]);
        let mut projectile = system.spawn(
            CellCoord::new(5, 3),
            Faction::Red,
            Duration::ZERO,
            &mut rng,
        );
        // 2 cells per second for half a second moves one full cell down.
        projectile.advance(Duration::from_millis(500), 40.0);
        assert_eq!(projectile.row, 6);
        assert_eq!(projectile.column, 3);
        // A second advance integrates only the newly elapsed slice.
        projectile.advance(Duration::from_millis(750), 40.0);
        assert_eq!(projectile.row, 7);
    }

    #[test]
    fn blue_projectiles_travel_toward_decreasing_rows() {
        let system = Projectiles::new(tuning(), 40.0);
        let mut rng = Scripted(vec![0.5]);
        let mut projectile = system.spawn(
            CellCoord::new(10, 0),
            Faction::Blue,
            Duration::ZERO,
            &mut rng,
        );
        projectile.advance(Duration::from_millis(500), 40.0);
        assert_eq!(projectile.row, 9);
    }
}
