#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match orchestration: fixed-cadence scheduling and the command surface.
//!
//! The controller owns the world, the projectile system, the scripted
//! strategy, and one [`Cadence`] accumulator per concern. Each call to
//! [`MatchController::advance`] runs the concerns in a fixed order — gold
//! accrual, fire polling, projectile physics, the scripted decision, win
//! evaluation — so projectile-driven captures are always visible to the
//! same cycle's win check. Everything is single-threaded and synchronous;
//! no stage can observe a partially updated grid.

use std::time::Duration;

use color_clash_core::{
    BuildError, CellCoord, Command, Event, Faction, MatchConfig, MatchState, RandomSource,
    UpgradeError,
};
use color_clash_system_decision::Strategy;
use color_clash_system_projectiles::{ProjectileSnapshot, Projectiles};
use color_clash_world::{self as world, query, World};

/// Adapts any [`rand::Rng`] to the engine's [`RandomSource`] contract.
#[derive(Clone, Debug)]
pub struct UniformRng<R: rand::Rng>(R);

impl<R: rand::Rng> UniformRng<R> {
    /// Wraps the provided generator.
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: rand::Rng> RandomSource for UniformRng<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Accumulator that converts irregular advance slices into fixed-interval
/// ticks. Replaces ambient wall-clock timers with an explicit schedule the
/// caller can single-step deterministically.
#[derive(Clone, Copy, Debug)]
struct Cadence {
    interval: Duration,
    accumulated: Duration,
}

impl Cadence {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Absorbs `dt` and reports how many whole intervals elapsed.
    fn tick(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        self.accumulated = self.accumulated.saturating_add(dt);
        let mut fired = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            fired += 1;
        }
        fired
    }

    fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

/// Owns and schedules the simulation for one match.
#[derive(Debug)]
pub struct MatchController<R: RandomSource> {
    world: World,
    projectiles: Projectiles,
    strategy: Strategy,
    rng: R,
    elapsed: Duration,
    gold: Cadence,
    fire: Cadence,
    physics: Cadence,
    decision: Cadence,
    victory: Cadence,
    /// Fire announcements waiting for the next physics tick to spawn from.
    pending_fire: Vec<Event>,
    events: Vec<Event>,
}

impl<R: RandomSource> MatchController<R> {
    /// Sets up a match from the provided configuration and random source.
    #[must_use]
    pub fn new(config: MatchConfig, rng: R) -> Self {
        let world = World::new(config.clone());
        let projectiles = Projectiles::new(config.projectiles, config.cell_length);
        let strategy = Strategy::new(config.decision, config.towers);
        Self {
            world,
            projectiles,
            strategy,
            rng,
            elapsed: Duration::ZERO,
            gold: Cadence::new(config.gold_interval),
            fire: Cadence::new(config.fire_poll_interval),
            physics: Cadence::new(config.projectiles.update_interval),
            decision: Cadence::new(config.decision.interval),
            victory: Cadence::new(config.victory.poll_interval),
            pending_fire: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Advances the match clock by `dt`, running every concern whose
    /// cadence elapsed. Inert once the match has ended.
    pub fn advance(&mut self, dt: Duration) {
        if query::match_state(&self.world) != MatchState::InProgress {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        for _ in 0..self.gold.tick(dt) {
            let _ = self.apply(Command::AccrueGold);
        }

        for _ in 0..self.fire.tick(dt) {
            let fired = self.apply(Command::FireReadyTowers { now: self.elapsed });
            self.pending_fire.extend(fired);
        }

        for _ in 0..self.physics.tick(dt) {
            let mut commands = Vec::new();
            let spawns = std::mem::take(&mut self.pending_fire);
            self.projectiles.handle(
                &spawns,
                self.elapsed,
                query::board_view(&self.world),
                &mut self.rng,
                &mut commands,
            );
            for command in commands {
                let _ = self.apply(command);
            }
        }

        for _ in 0..self.decision.tick(dt) {
            let mut commands = Vec::new();
            let me = query::player(&self.world, Faction::Red);
            self.strategy.handle(
                &query::board_view(&self.world),
                &query::tower_view(&self.world),
                &me,
                &mut self.rng,
                &mut commands,
            );
            for command in commands {
                let _ = self.apply(command);
            }
        }

        for _ in 0..self.victory.tick(dt) {
            let _ = self.apply(Command::EvaluateVictory);
            if query::match_state(&self.world) != MatchState::InProgress {
                break;
            }
        }
    }

    /// Attempts to build a tower for the faction at the provided cell.
    ///
    /// Validation failures are returned and also broadcast as
    /// [`Event::BuildRejected`]. Requests against an ended match are
    /// dropped; adapters gate their input on [`Self::match_state`].
    pub fn request_build(&mut self, cell: CellCoord, faction: Faction) -> Result<(), BuildError> {
        let events = self.apply(Command::BuildTower { cell, faction });
        events
            .iter()
            .find_map(|event| match event {
                Event::BuildRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Ok(()))
    }

    /// Attempts to upgrade the tower at the provided cell.
    pub fn request_upgrade(&mut self, cell: CellCoord) -> Result<(), UpgradeError> {
        let events = self.apply(Command::UpgradeTower { cell });
        events
            .iter()
            .find_map(|event| match event {
                Event::UpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Ok(()))
    }

    /// Resets the match to its initial state and resumes scheduling.
    ///
    /// World state, projectiles, the clock, and every cadence reset
    /// together before the next `advance` can observe any of them.
    pub fn request_restart(&mut self) {
        let _ = self.apply(Command::Restart);
        self.projectiles.clear();
        self.pending_fire.clear();
        self.elapsed = Duration::ZERO;
        self.gold.reset();
        self.fire.reset();
        self.physics.reset();
        self.decision.reset();
        self.victory.reset();
    }

    /// Yields and clears the accumulated event stream.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Current lifecycle state of the match.
    #[must_use]
    pub fn match_state(&self) -> MatchState {
        query::match_state(&self.world)
    }

    /// Read-only access to the authoritative world for presentation queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Position snapshots of every live projectile.
    #[must_use]
    pub fn projectile_view(&self) -> Vec<ProjectileSnapshot> {
        self.projectiles.view()
    }

    /// Total simulated time since match start or the last restart.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.events.extend(events.iter().copied());
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn cadence_counts_whole_intervals() {
        let mut cadence = Cadence::new(Duration::from_millis(100));
        assert_eq!(cadence.tick(Duration::from_millis(50)), 0);
        assert_eq!(cadence.tick(Duration::from_millis(60)), 1);
        assert_eq!(cadence.tick(Duration::from_millis(450)), 4);
        cadence.reset();
        assert_eq!(cadence.tick(Duration::from_millis(99)), 0);
    }

    #[test]
    fn zero_interval_cadence_never_fires() {
        let mut cadence = Cadence::new(Duration::ZERO);
        assert_eq!(cadence.tick(Duration::from_secs(10)), 0);
    }

    #[test]
    fn uniform_rng_stays_in_the_unit_interval() {
        let mut rng = UniformRng::new(ChaCha8Rng::seed_from_u64(7));
        for _ in 0..1000 {
            let sample = rng.next_unit();
            assert!((0.0..1.0).contains(&sample));
        }
    }
}
