#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Color Clash adapters.
//!
//! The scene is a declarative snapshot assembled from world views; backends
//! only draw what they are handed and never reach back into the simulation.

use anyhow::Result as AnyResult;
use color_clash_core::{
    BoardView, CellCoord, Faction, MatchState, PlayerSnapshot, TowerView,
};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Faction palette shared by every adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill used for cells held by the scripted faction.
    pub red_territory: Color,
    /// Fill used for cells held by the commanded faction.
    pub blue_territory: Color,
    /// Marker color for scripted-faction towers.
    pub red_tower: Color,
    /// Marker color for commanded-faction towers.
    pub blue_tower: Color,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red_territory: Color::from_rgb_u8(204, 68, 68),
            blue_territory: Color::from_rgb_u8(68, 68, 204),
            red_tower: Color::from_rgb_u8(140, 24, 24),
            blue_tower: Color::from_rgb_u8(24, 24, 140),
            line_color: Color::from_rgb_u8(32, 32, 32),
        }
    }
}

impl Palette {
    /// Territory fill for the provided faction.
    #[must_use]
    pub const fn territory(&self, faction: Faction) -> Color {
        match faction {
            Faction::Red => self.red_territory,
            Faction::Blue => self.blue_territory,
        }
    }

    /// Tower marker color for the provided faction.
    #[must_use]
    pub const fn tower(&self, faction: Faction) -> Color {
        match faction {
            Faction::Red => self.red_tower,
            Faction::Blue => self.blue_tower,
        }
    }
}

/// Describes the board grid that adapters lay out on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Row index where the territory boundary line is drawn.
    pub boundary_row: u32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }
}

/// Single board cell filled with its owner's territory color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Cell addressed by this fill.
    pub cell: CellCoord,
    /// Owner of the cell at snapshot time.
    pub owner: Faction,
    /// Fill color derived from the palette.
    pub color: Color,
}

/// Tower marker drawn on top of its cell fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Owning faction.
    pub faction: Faction,
    /// Current tower level, rendered as the marker label.
    pub level: u32,
    /// Marker color, lightened per level so upgrades read at a glance.
    pub color: Color,
}

/// Projectile drawn as a small filled circle at its world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileDot {
    /// Horizontal world-unit position.
    pub x: f32,
    /// Vertical world-unit position.
    pub y: f32,
    /// Faction that fired the projectile.
    pub faction: Faction,
    /// Dot color derived from the palette.
    pub color: Color,
}

/// Per-faction figures surfaced in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudLine {
    /// Faction the line describes.
    pub faction: Faction,
    /// Current gold balance.
    pub gold: u32,
    /// Cells currently held.
    pub cells: u32,
    /// Towers currently standing.
    pub towers: u32,
}

/// Heads-up display combining both faction lines and the match state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Figures for the scripted faction.
    pub red: HudLine,
    /// Figures for the commanded faction.
    pub blue: HudLine,
    /// Lifecycle state shown in the banner.
    pub match_state: MatchState,
}

/// Scene description combining the board, towers, projectiles and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board grid laid out by the adapter.
    pub grid: GridPresentation,
    /// Territory fill for every cell, in row-major order.
    pub cells: Vec<CellPresentation>,
    /// Tower markers sorted by cell.
    pub towers: Vec<TowerPresentation>,
    /// Live projectiles at their interpolated positions.
    pub projectiles: Vec<ProjectileDot>,
    /// Heads-up display content.
    pub hud: HudPresentation,
}

impl Scene {
    /// Assembles a scene from world snapshots.
    ///
    /// `projectiles` supplies world-unit positions of live projectiles;
    /// adapters map their own snapshot type into `(x, y, faction)` triples.
    #[must_use]
    pub fn compose(
        board: &BoardView<'_>,
        towers: &TowerView,
        red: &PlayerSnapshot,
        blue: &PlayerSnapshot,
        match_state: MatchState,
        cell_length: f32,
        boundary_row: u32,
        projectiles: &[(f32, f32, Faction)],
        palette: &Palette,
    ) -> Self {
        let (columns, rows) = board.dimensions();
        let grid = GridPresentation {
            columns,
            rows,
            cell_length,
            boundary_row,
            line_color: palette.line_color,
        };

        let mut cells = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(row, column);
                if let Some(owner) = board.owner(cell) {
                    cells.push(CellPresentation {
                        cell,
                        owner,
                        color: palette.territory(owner),
                    });
                }
            }
        }

        let towers: Vec<TowerPresentation> = towers
            .iter()
            .map(|tower| TowerPresentation {
                cell: tower.cell,
                faction: tower.faction,
                level: tower.level,
                color: palette
                    .tower(tower.faction)
                    .lighten(level_lighten(tower.level)),
            })
            .collect();

        let projectiles = projectiles
            .iter()
            .map(|&(x, y, faction)| ProjectileDot {
                x,
                y,
                faction,
                color: palette.tower(faction),
            })
            .collect();

        let hud = HudPresentation {
            red: hud_line(red, board, towers_count(&towers, Faction::Red)),
            blue: hud_line(blue, board, towers_count(&towers, Faction::Blue)),
            match_state,
        };

        Self {
            grid,
            cells,
            towers,
            projectiles,
            hud,
        }
    }
}

fn towers_count(towers: &[TowerPresentation], faction: Faction) -> u32 {
    towers
        .iter()
        .filter(|tower| tower.faction == faction)
        .count() as u32
}

fn hud_line(player: &PlayerSnapshot, board: &BoardView<'_>, towers: u32) -> HudLine {
    HudLine {
        faction: player.faction,
        gold: player.gold,
        cells: board.count(player.faction),
        towers,
    }
}

fn level_lighten(level: u32) -> f32 {
    0.12 * level.saturating_sub(1) as f32
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Color Clash scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame
    /// delta and may replace the scene before it is rendered, allowing
    /// adapters to animate world snapshots deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}
