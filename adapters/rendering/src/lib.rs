#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tower platformer adapters.

mod projector;
pub mod sprites;

pub use projector::Projector;

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;
use tower_platformer_core::{
    Aabb, CellCoord, GameState, InputState, MonsterId, Pose, Role,
};

use crate::sprites::Animation;

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
}

/// Input gathered by a backend before the scene is updated.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Abstract player input for the frame.
    pub input: InputState,
    /// Whether pause was toggled during the frame.
    pub pause_toggle: bool,
}

/// Decision returned by the scene update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep presenting frames.
    Continue,
    /// Stop the backend after the current frame.
    Exit,
}

/// Kind of static tower tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Standable ground.
    Ground,
    /// Climbable ladder.
    Ladder,
}

/// Tower tile visible in the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Tile content.
    pub kind: TileKind,
    /// Tile coordinates inside the tower.
    pub cell: CellCoord,
    /// Rectangle in viewport space.
    pub bounds: Aabb,
}

/// Coin visible in the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneCoin {
    /// Tile holding the coin.
    pub cell: CellCoord,
    /// Rectangle in viewport space.
    pub bounds: Aabb,
}

/// Sprite frame selected for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteFrame {
    /// Animation strip the frame belongs to.
    pub animation: Animation,
    /// Index of the frame within the strip.
    pub index: u32,
}

impl SpriteFrame {
    /// Sheet rectangle of the frame as `(x, y, width, height)`.
    #[must_use]
    pub fn source(&self) -> (u32, u32, u32, u32) {
        self.animation.source(self.index)
    }
}

/// Entity visible in the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntity {
    /// Sprite family of the entity.
    pub role: Role,
    /// Monster identifier, absent for the player.
    pub monster: Option<MonsterId>,
    /// Rectangle in viewport space.
    pub bounds: Aabb,
    /// Sprite frame to draw.
    pub sprite: SpriteFrame,
    /// Animation-relevant state.
    pub pose: Pose,
}

/// Counters shown alongside the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Hud {
    /// Tick that produced the scene.
    pub tick: u64,
    /// Lifecycle state of the game loop.
    pub game_state: GameState,
    /// Accumulated score.
    pub score: u32,
    /// Coins collected so far.
    pub coins: u32,
    /// Coins still present in the tower.
    pub coins_remaining: usize,
}

/// Drawable content of one frame, expressed in viewport space.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Size of the viewport in world units.
    pub size: Vec2,
    /// Visible tower tiles, row by row.
    pub tiles: Vec<SceneTile>,
    /// Visible coins.
    pub coins: Vec<SceneCoin>,
    /// Visible entities, player first.
    pub entities: Vec<SceneEntity>,
    /// Counters for the frame.
    pub hud: Hud,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed first.
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

/// Rendering backend capable of presenting tower scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it or the update closure requests an exit.
    ///
    /// The provided `update_scene` closure receives the wall-clock frame delta and
    /// the input captured by the backend, and rewrites the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Flow;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// Animation frames cannot be derived from a stopped simulation clock.
    #[error("simulation rate must be positive")]
    ZeroSimulationRate,
}
