//! Sprite sheet animation tables.

use tower_platformer_core::{Archetype, Facing, PlayerState, Pose};

/// Sprite sheet an animation reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteSheet {
    /// Player avatar strip.
    Player,
    /// Shared monster strip.
    Monster,
}

/// Horizontal strip of equally sized frames inside a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    /// Sheet holding the strip.
    pub sheet: SpriteSheet,
    /// Left edge of the first frame in sheet pixels.
    pub x: u32,
    /// Top edge of the strip in sheet pixels.
    pub y: u32,
    /// Width of one frame in sheet pixels.
    pub width: u32,
    /// Height of one frame in sheet pixels.
    pub height: u32,
    /// Number of frames in the strip.
    pub frames: u32,
    /// Playback rate in frames per second.
    pub fps: u32,
}

impl Animation {
    const fn player(x: u32, frames: u32, fps: u32) -> Self {
        Self {
            sheet: SpriteSheet::Player,
            x,
            y: 0,
            width: 72,
            height: 96,
            frames,
            fps,
        }
    }

    const fn monster(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            sheet: SpriteSheet::Monster,
            x,
            y,
            width,
            height,
            frames: 2,
            fps: 5,
        }
    }

    /// Frame shown at `tick` of a simulation running at `simulation_fps`.
    #[must_use]
    pub fn frame_at(&self, tick: u64, simulation_fps: u32) -> u32 {
        if self.frames <= 1 || simulation_fps == 0 {
            return 0;
        }
        let elapsed = tick.saturating_mul(u64::from(self.fps)) / u64::from(simulation_fps);
        u32::try_from(elapsed % u64::from(self.frames)).unwrap_or(0)
    }

    /// Sheet rectangle of `frame` as `(x, y, width, height)`.
    #[must_use]
    pub fn source(&self, frame: u32) -> (u32, u32, u32, u32) {
        let frame = frame.min(self.frames.saturating_sub(1));
        (self.x + frame * self.width, self.y, self.width, self.height)
    }
}

/// Player walking right.
pub const PLAYER_RIGHT: Animation = Animation::player(0, 11, 30);
/// Player standing still.
pub const PLAYER_STAND: Animation = Animation::player(792, 1, 30);
/// Player walking left.
pub const PLAYER_LEFT: Animation = Animation::player(1224, 11, 30);
/// Player seen from behind, facing a ladder.
pub const PLAYER_BACK: Animation = Animation::player(2016, 1, 30);
/// Player climbing.
pub const PLAYER_CLIMB: Animation = Animation::player(2016, 11, 30);
/// Player knocked back while facing left.
pub const PLAYER_HURT_LEFT: Animation = Animation::player(1080, 1, 10);
/// Player knocked back while facing right.
pub const PLAYER_HURT_RIGHT: Animation = Animation::player(1152, 1, 10);

const BLOCK: Animation = Animation::monster(0, 0, 50, 50);
const FLY_LEFT: Animation = Animation::monster(100, 7, 76, 36);
const FLY_RIGHT: Animation = Animation::monster(252, 7, 76, 36);
const SLIME_LEFT: Animation = Animation::monster(404, 11, 50, 28);
const SLIME_RIGHT: Animation = Animation::monster(504, 11, 50, 28);
const SNAIL_LEFT: Animation = Animation::monster(604, 9, 58, 32);
const SNAIL_RIGHT: Animation = Animation::monster(720, 9, 58, 32);

/// Animation for the player in `state` while facing `facing`.
#[must_use]
pub fn player_animation(state: PlayerState, facing: Facing) -> Animation {
    match (state, facing) {
        (PlayerState::Hurt, Facing::Left) => PLAYER_HURT_LEFT,
        (PlayerState::Hurt, _) => PLAYER_HURT_RIGHT,
        (PlayerState::Climbing, _) => PLAYER_CLIMB,
        (_, Facing::Up | Facing::Down) => PLAYER_BACK,
        (PlayerState::Standing, _) | (_, Facing::None) => PLAYER_STAND,
        (_, Facing::Left) => PLAYER_LEFT,
        (_, Facing::Right) => PLAYER_RIGHT,
    }
}

/// Animation for a monster of `archetype` travelling along `heading`.
#[must_use]
pub fn monster_animation(archetype: Archetype, heading: Facing) -> Animation {
    let left = heading == Facing::Left;
    match archetype {
        Archetype::Block => BLOCK,
        Archetype::Fly if left => FLY_LEFT,
        Archetype::Fly => FLY_RIGHT,
        Archetype::Slime if left => SLIME_LEFT,
        Archetype::Slime => SLIME_RIGHT,
        Archetype::Snail if left => SNAIL_LEFT,
        Archetype::Snail => SNAIL_RIGHT,
    }
}

/// Animation for an entity pose, or `None` for poses that belong to the player
/// but were reported for a monster.
#[must_use]
pub fn pose_animation(pose: Pose, archetype: Option<Archetype>, facing: Facing) -> Option<Animation> {
    match (pose, archetype) {
        (Pose::Player(state), None) => Some(player_animation(state, facing)),
        (Pose::Moving | Pose::Dying, Some(archetype)) => Some(monster_animation(archetype, facing)),
        _ => None,
    }
}
