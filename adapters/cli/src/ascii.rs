use std::{io::Write, time::Duration};

use anyhow::{Context, Result};
use tower_platformer_core::{Aabb, Pose, Role};
use tower_platformer_rendering::{
    Flow, FrameInput, Presentation, RenderingBackend, Scene, TileKind,
};

use crate::input::InputSource;

/// Width of one character cell in world units.
const CELL_WIDTH: f32 = 13.5;
/// Height of one character cell in world units.
const CELL_HEIGHT: f32 = 27.0;

/// Headless backend that prints scenes as text.
#[derive(Debug)]
pub(crate) struct AsciiBackend<W> {
    out: W,
    input: InputSource,
    frame_time: Duration,
    frames: u32,
    draw_every: Option<u32>,
}

impl<W: Write> AsciiBackend<W> {
    /// Creates a backend that runs `frames` frames of `frame_time` each and
    /// draws every `draw_every`-th frame, or none when `None`.
    pub(crate) fn new(
        out: W,
        input: InputSource,
        frame_time: Duration,
        frames: u32,
        draw_every: Option<u32>,
    ) -> Self {
        Self {
            out,
            input,
            frame_time,
            frames,
            draw_every: draw_every.filter(|every| *every > 0),
        }
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Flow,
    {
        let mut scene = presentation.scene;
        writeln!(self.out, "== {} ==", presentation.window_title)
            .context("failed to write title")?;

        for frame in 0..self.frames {
            let input = self.input.next_frame();
            let flow = update_scene(self.frame_time, input, &mut scene);

            let last = flow == Flow::Exit || frame + 1 == self.frames;
            let due = self.draw_every.map_or(false, |every| frame % every == 0);
            if due || (last && self.draw_every.is_some()) {
                self.out
                    .write_all(draw(&scene).as_bytes())
                    .context("failed to write frame")?;
            }
            if flow == Flow::Exit {
                break;
            }
        }

        self.out.flush().context("failed to flush output")
    }
}

/// Renders a scene into a block of text, one line per character row.
pub(crate) fn draw(scene: &Scene) -> String {
    let columns = cells(scene.size.x, CELL_WIDTH);
    let rows = cells(scene.size.y, CELL_HEIGHT);
    let mut grid = vec![vec![' '; columns]; rows];

    for tile in &scene.tiles {
        let glyph = match tile.kind {
            TileKind::Ground => '#',
            TileKind::Ladder => 'H',
        };
        fill(&mut grid, tile.bounds, glyph);
    }
    for coin in &scene.coins {
        fill(&mut grid, coin.bounds, 'o');
    }
    for entity in scene.entities.iter().rev() {
        let glyph = match (entity.role, entity.pose) {
            (_, Pose::Dying) => 'x',
            (Role::Player, _) => '@',
            (Role::Monster(archetype), _) => archetype.glyph(),
        };
        fill(&mut grid, entity.bounds, glyph);
    }

    let hud = &scene.hud;
    let mut text = format!(
        "tick {} | {:?} | score {} | coins {} ({} left)\n",
        hud.tick, hud.game_state, hud.score, hud.coins, hud.coins_remaining
    );
    for row in grid {
        text.extend(row);
        text.push('\n');
    }
    text
}

fn cells(extent: f32, cell: f32) -> usize {
    if extent.is_finite() && extent > 0.0 {
        (extent / cell).ceil() as usize
    } else {
        0
    }
}

fn fill(grid: &mut [Vec<char>], bounds: Aabb, glyph: char) {
    let min = bounds.min();
    let max = bounds.max();
    let rows = grid.len();
    let columns = grid.first().map_or(0, Vec::len);
    let span = |from: f32, to: f32, cell: f32, limit: usize| {
        let first = (from / cell).floor().max(0.0) as usize;
        let last = ((to / cell).ceil().max(0.0) as usize).min(limit);
        first..last
    };

    for row in span(min.y, max.y, CELL_HEIGHT, rows) {
        for column in span(min.x, max.x, CELL_WIDTH, columns) {
            grid[row][column] = glyph;
        }
    }
}
