#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Color Clash matches.
//!
//! Simulates a match at a fixed step until a win condition fires or the
//! simulated time budget runs out, logging world events as they happen and
//! printing a board summary at the end. The commanded faction sits idle by
//! default; `--blue-scripted` drives it with the same heuristic the
//! scripted faction uses, which makes for a complete unattended match.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use color_clash_controller::{MatchController, UniformRng};
use color_clash_core::{
    AudioCue, CellCoord, Event, Faction, MatchConfig, MatchState, RandomSource,
};
use color_clash_rendering::{Palette, Scene};
use color_clash_system_decision::{Choice, Strategy};
use color_clash_world::query;

#[derive(Debug, Parser)]
#[command(name = "color-clash", about = "Headless Color Clash match runner")]
struct Cli {
    /// Number of grid rows.
    #[arg(long, default_value_t = 20)]
    rows: u32,

    /// Number of grid columns.
    #[arg(long, default_value_t = 10)]
    columns: u32,

    /// First row owned by the commanded (Blue) faction.
    #[arg(long, default_value_t = 10)]
    boundary_row: u32,

    /// Seed for the deterministic random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated time budget in seconds.
    #[arg(long, default_value_t = 120)]
    max_seconds: u64,

    /// Simulated advance step in milliseconds.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Drive the commanded faction with the scripted heuristic as well.
    #[arg(long)]
    blue_scripted: bool,

    /// Suppress the event log and print only the final summary.
    #[arg(long)]
    quiet: bool,
}

fn build_config(cli: &Cli) -> Result<MatchConfig> {
    if cli.columns == 0 {
        bail!("the grid needs at least one column");
    }
    if cli.rows < 2 {
        bail!("the grid needs at least two rows, one per faction");
    }
    if cli.boundary_row == 0 || cli.boundary_row >= cli.rows {
        bail!(
            "boundary row {} leaves a faction without territory on a {}-row grid",
            cli.boundary_row,
            cli.rows
        );
    }
    if cli.step_ms == 0 {
        bail!("the advance step must be positive");
    }

    let mut config = MatchConfig::default();
    config.rows = cli.rows;
    config.columns = cli.columns;
    config.territory_boundary_row = cli.boundary_row;
    Ok(config)
}

/// Drives the commanded faction through the public command surface, the
/// way an interactive adapter would.
struct BluePilot {
    strategy: Strategy,
    rng: UniformRng<ChaCha8Rng>,
    interval: Duration,
    accumulated: Duration,
}

impl BluePilot {
    fn new(config: &MatchConfig, seed: u64) -> Self {
        Self {
            strategy: Strategy::new(config.decision, config.towers),
            rng: UniformRng::new(ChaCha8Rng::seed_from_u64(seed)),
            interval: config.decision.interval,
            accumulated: Duration::ZERO,
        }
    }

    fn drive<R: RandomSource>(&mut self, controller: &mut MatchController<R>, dt: Duration) {
        self.accumulated += dt;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            let choice = {
                let world = controller.world();
                let me = query::player(world, Faction::Blue);
                self.strategy.decide(
                    &query::board_view(world),
                    &query::tower_view(world),
                    &me,
                    &mut self.rng,
                )
            };
            match choice {
                Choice::Build(cell) => {
                    let _ = controller.request_build(cell, Faction::Blue);
                }
                Choice::Upgrade(cell) => {
                    let _ = controller.request_upgrade(cell);
                }
                Choice::Hold => {}
            }
        }
    }
}

/// Log line for an event, or `None` for events too chatty to print.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TowerBuilt {
            cell,
            faction,
            level,
        } => format!("{faction:?} built a level-{level} tower at {}", label(*cell)),
        Event::TowerUpgraded {
            cell,
            faction,
            level,
        } => format!(
            "{faction:?} upgraded the tower at {} to level {level}",
            label(*cell)
        ),
        Event::TowerDestroyed { cell, faction } => {
            format!("{faction:?} lost the tower at {}", label(*cell))
        }
        Event::CellCaptured { cell, faction } => {
            format!("{faction:?} captured {}", label(*cell))
        }
        Event::TowerFired {
            cell,
            faction,
            level,
        } => format!("{faction:?} level-{level} tower fired from {}", label(*cell)),
        Event::BuildRejected {
            cell,
            faction,
            reason,
        } => format!("{faction:?} build at {} rejected: {reason:?}", label(*cell)),
        Event::UpgradeRejected { cell, reason } => {
            format!("upgrade at {} rejected: {reason:?}", label(*cell))
        }
        Event::MatchEnded { winner } => format!("{winner:?} wins the match"),
        Event::MatchRestarted => "match restarted".to_owned(),
        Event::GoldChanged { .. } => return None,
    };
    Some(line)
}

fn label(cell: CellCoord) -> String {
    format!("({}, {})", cell.row(), cell.column())
}

fn cue_label(cue: AudioCue) -> &'static str {
    match cue {
        AudioCue::Shoot => "shoot",
        AudioCue::Explosion => "explosion",
        AudioCue::CellCaptured => "capture",
        AudioCue::Victory => "victory",
    }
}

/// One character per cell: territory as `.` (Red) or `,` (Blue), towers as
/// the owning faction's letter.
fn render_board(scene: &Scene) -> String {
    let columns = scene.grid.columns as usize;
    let rows = scene.grid.rows as usize;
    let mut glyphs = vec![vec![' '; columns]; rows];
    for cell in &scene.cells {
        glyphs[cell.cell.row() as usize][cell.cell.column() as usize] = match cell.owner {
            Faction::Red => '.',
            Faction::Blue => ',',
        };
    }
    for tower in &scene.towers {
        glyphs[tower.cell.row() as usize][tower.cell.column() as usize] = match tower.faction {
            Faction::Red => 'R',
            Faction::Blue => 'B',
        };
    }
    let mut board = String::new();
    for row in glyphs {
        board.extend(row);
        board.push('\n');
    }
    board
}

fn compose_scene<R: RandomSource>(
    controller: &MatchController<R>,
    config: &MatchConfig,
) -> Scene {
    let world = controller.world();
    let projectiles: Vec<(f32, f32, Faction)> = controller
        .projectile_view()
        .iter()
        .map(|projectile| (projectile.x, projectile.y, projectile.faction))
        .collect();
    Scene::compose(
        &query::board_view(world),
        &query::tower_view(world),
        &query::player(world, Faction::Red),
        &query::player(world, Faction::Blue),
        controller.match_state(),
        config.cell_length,
        config.territory_boundary_row,
        &projectiles,
        &Palette::default(),
    )
}

fn print_summary<R: RandomSource>(controller: &MatchController<R>, config: &MatchConfig) {
    let scene = compose_scene(controller, config);
    match controller.match_state() {
        MatchState::Ended(winner) => {
            println!(
                "match over after {:.1}s: {winner:?} wins",
                controller.elapsed().as_secs_f64()
            );
        }
        MatchState::InProgress => {
            println!(
                "time budget exhausted after {:.1}s with no winner",
                controller.elapsed().as_secs_f64()
            );
        }
    }
    for line in [scene.hud.red, scene.hud.blue] {
        println!(
            "  {:?}: {} gold, {} cells, {} towers",
            line.faction, line.gold, line.cells, line.towers
        );
    }
    print!("{}", render_board(&scene));
}

/// Entry point for the Color Clash command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let step = Duration::from_millis(cli.step_ms);
    let budget = Duration::from_secs(cli.max_seconds);

    let rng = UniformRng::new(ChaCha8Rng::seed_from_u64(cli.seed));
    let mut controller = MatchController::new(config.clone(), rng);
    let mut pilot = cli
        .blue_scripted
        .then(|| BluePilot::new(&config, cli.seed.wrapping_add(1)));

    while controller.match_state() == MatchState::InProgress && controller.elapsed() < budget {
        controller.advance(step);
        if let Some(pilot) = pilot.as_mut() {
            pilot.drive(&mut controller, step);
        }
        for event in controller.drain_events() {
            if cli.quiet {
                continue;
            }
            if let Some(line) = describe(&event) {
                let stamp = controller.elapsed().as_secs_f64();
                match AudioCue::from_event(&event) {
                    Some(cue) => println!("[{stamp:>8.3}s] {line} [{}]", cue_label(cue)),
                    None => println!("[{stamp:>8.3}s] {line}"),
                }
            }
        }
    }

    print_summary(&controller, &config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_clash_core::BuildError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("color-clash").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn defaults_mirror_the_stock_match() {
        let cli = parse(&[]);
        let config = build_config(&cli).expect("defaults are valid");
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn grid_flags_reshape_the_board() {
        let cli = parse(&["--rows", "8", "--columns", "4", "--boundary-row", "3"]);
        let config = build_config(&cli).expect("custom grid is valid");
        assert_eq!(config.rows, 8);
        assert_eq!(config.columns, 4);
        assert_eq!(config.territory_boundary_row, 3);
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        assert!(build_config(&parse(&["--columns", "0"])).is_err());
        assert!(build_config(&parse(&["--rows", "1", "--boundary-row", "1"])).is_err());
        assert!(build_config(&parse(&["--boundary-row", "0"])).is_err());
        assert!(build_config(&parse(&["--boundary-row", "20"])).is_err());
        assert!(build_config(&parse(&["--step-ms", "0"])).is_err());
    }

    #[test]
    fn event_log_lines_name_the_actor() {
        let built = describe(&Event::TowerBuilt {
            cell: CellCoord::new(9, 4),
            faction: Faction::Red,
            level: 1,
        })
        .expect("builds are logged");
        assert_eq!(built, "Red built a level-1 tower at (9, 4)");

        let rejected = describe(&Event::BuildRejected {
            cell: CellCoord::new(10, 0),
            faction: Faction::Red,
            reason: BuildError::WrongTerritory,
        })
        .expect("rejections are logged");
        assert!(rejected.contains("WrongTerritory"));
    }

    #[test]
    fn gold_changes_are_not_logged() {
        assert!(describe(&Event::GoldChanged {
            faction: Faction::Blue,
            gold: 11,
        })
        .is_none());
    }

    #[test]
    fn board_rendering_marks_territory_and_towers() {
        let mut config = MatchConfig::default();
        config.rows = 2;
        config.columns = 2;
        config.territory_boundary_row = 1;
        let rng = UniformRng::new(ChaCha8Rng::seed_from_u64(0));
        let mut controller = MatchController::new(config.clone(), rng);
        controller
            .request_build(CellCoord::new(0, 0), Faction::Red)
            .expect("build accepted");

        let scene = compose_scene(&controller, &config);
        assert_eq!(render_board(&scene), "R.\n,,\n");
    }
}
