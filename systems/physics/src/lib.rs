#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic collision resolver that advances bodies through the tower.
//!
//! The resolver is pure: it reads a body, a motion request and the tower
//! geometry and returns the body the entity should have after one tick. It
//! never touches the world; callers turn the result into commands.

use tower_platformer_core::{Body, Facing};
use tower_platformer_world::{Tower, Tuning};
use tracing::warn;

/// Requested change of horizontal velocity for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HorizontalMotion {
    /// Integrate a signed acceleration, falling back to friction when it is zero.
    Accelerate {
        /// Signed acceleration in world units per second squared.
        acceleration: f32,
        /// Deceleration applied toward zero when no acceleration is requested.
        friction: f32,
        /// Largest allowed horizontal speed.
        max_speed: f32,
    },
    /// Move at exactly this horizontal velocity.
    Constant(f32),
}

/// Requested change of vertical velocity for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VerticalMotion {
    /// Integrate gravity.
    Gravity,
    /// Attached to a ladder, moving at the provided velocity.
    Climb(f32),
    /// Move at exactly this vertical velocity, ignoring gravity.
    Constant(f32),
}

/// How a body interacts with ground surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    /// Passes through every surface.
    Ghost,
    /// Lands on surfaces from above and jumps through them from below.
    Land,
    /// Stops at surfaces from either side, as vertical movers do.
    Bounce,
}

/// Motion request for a single body and tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Horizontal velocity rule.
    pub horizontal: HorizontalMotion,
    /// Vertical velocity rule.
    pub vertical: VerticalMotion,
    /// Upward speed applied before gravity, if the body jumps this tick.
    pub jump_impulse: Option<f32>,
    /// Interaction with ground surfaces.
    pub collision: Collision,
}

/// Outcome of resolving one body for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Body after the tick.
    pub body: Body,
    /// Whether the body came to rest on a surface this tick.
    pub landed: bool,
    /// Tower side the body ran into, if any.
    pub wall: Option<Facing>,
    /// Whether upward travel was stopped by the top of the tower or a ground underside.
    pub ceiling: bool,
}

impl Resolution {
    fn unchanged(body: &Body) -> Self {
        Self {
            body: *body,
            landed: false,
            wall: None,
            ceiling: false,
        }
    }
}

/// Resolver configured with the tick length and global speed limits.
#[derive(Clone, Copy, Debug)]
pub struct Physics {
    dt: f32,
    gravity: f32,
    max_fall: f32,
    ladder_reach: f32,
}

impl Physics {
    /// Creates a resolver from the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            dt: tuning.dt(),
            gravity: tuning.gravity_units(),
            max_fall: tuning.max_fall_units(),
            ladder_reach: tuning.ladder_reach(),
        }
    }

    /// Length of a tick in seconds.
    #[must_use]
    pub const fn dt(&self) -> f32 {
        self.dt
    }

    /// Horizontal distance from a ladder column centre that still counts as touching it.
    #[must_use]
    pub const fn ladder_reach(&self) -> f32 {
        self.ladder_reach
    }

    /// Advances the body by one tick and resolves it against the tower.
    #[must_use]
    pub fn resolve(&self, body: &Body, motion: &Motion, tower: &Tower) -> Resolution {
        if !body.is_finite() {
            warn!("refusing to resolve a non-finite body");
            return Resolution::unchanged(body);
        }

        let mut next = *body;
        next.velocity.x = self.horizontal_velocity(body.velocity.x, motion.horizontal);
        next.velocity.y = self.vertical_velocity(body.velocity.y, motion);
        next.position += next.velocity * self.dt;

        let wall = clamp_to_sides(&mut next, tower);
        let mut ceiling = clamp_to_top(&mut next, body);
        let mut landed = false;

        next.on_ground = false;
        match motion.collision {
            Collision::Ghost => {}
            Collision::Land => {
                let climbing = matches!(motion.vertical, VerticalMotion::Climb(_));
                if next.velocity.y >= 0.0 {
                    let surface = tower.surface_between(
                        next.position.x,
                        next.position.x + next.size.x,
                        body.bottom() - tower.surface_band(),
                        next.bottom(),
                        !climbing,
                    );
                    if let Some(top) = surface {
                        next.position.y = top - next.size.y;
                        next.velocity.y = 0.0;
                        next.on_ground = true;
                        landed = !body.on_ground;
                    }
                }
            }
            Collision::Bounce => {
                let left = next.position.x;
                let right = next.position.x + next.size.x;
                if next.velocity.y > 0.0 {
                    if let Some(top) =
                        tower.surface_between(left, right, body.bottom(), next.bottom(), false)
                    {
                        next.position.y = top - next.size.y;
                        next.velocity.y = 0.0;
                        landed = true;
                    }
                } else if next.velocity.y < 0.0 {
                    if let Some(underside) =
                        tower.ceiling_between(left, right, body.position.y, next.position.y)
                    {
                        next.position.y = underside;
                        next.velocity.y = 0.0;
                        ceiling = true;
                    }
                }
            }
        }

        self.update_ladder_contact(&mut next, tower);

        if next.position.y >= tower.height() {
            next.alive = false;
        }

        if !next.is_finite() {
            warn!(
                x = next.position.x,
                y = next.position.y,
                "resolution produced a non-finite body, keeping the previous one"
            );
            return Resolution::unchanged(body);
        }

        Resolution {
            body: next,
            landed,
            wall,
            ceiling,
        }
    }

    /// Column of the ladder the body currently touches, if any.
    #[must_use]
    pub fn ladder_column(&self, body: &Body, tower: &Tower) -> Option<u32> {
        let (first, last) = tower.rows_between(body.position.y, body.bottom())?;
        tower.ladder_near(body.center().x, self.ladder_reach, first, last)
    }

    /// Column of the ladder rung directly under the body's feet, if any.
    #[must_use]
    pub fn ladder_below(&self, body: &Body, tower: &Tower) -> Option<u32> {
        let row = feet_row(body, tower)?;
        tower.ladder_near(body.center().x, self.ladder_reach, row, row)
    }

    fn horizontal_velocity(&self, current: f32, motion: HorizontalMotion) -> f32 {
        match motion {
            HorizontalMotion::Constant(velocity) => velocity,
            HorizontalMotion::Accelerate {
                acceleration,
                friction,
                max_speed,
            } => {
                let velocity = if acceleration != 0.0 {
                    current + acceleration * self.dt
                } else {
                    approach_zero(current, friction * self.dt)
                };
                velocity.clamp(-max_speed, max_speed)
            }
        }
    }

    fn vertical_velocity(&self, current: f32, motion: &Motion) -> f32 {
        let base = motion.jump_impulse.map_or(current, |impulse| -impulse);
        let velocity = match motion.vertical {
            VerticalMotion::Gravity => base + self.gravity * self.dt,
            VerticalMotion::Climb(velocity) | VerticalMotion::Constant(velocity) => velocity,
        };
        velocity.min(self.max_fall)
    }

    fn update_ladder_contact(&self, body: &mut Body, tower: &Tower) {
        body.on_ladder = self.ladder_column(body, tower).is_some();
        body.ladder_underfoot = body.on_ground && self.ladder_below(body, tower).is_some();
    }
}

fn approach_zero(velocity: f32, step: f32) -> f32 {
    if velocity > 0.0 {
        (velocity - step).max(0.0)
    } else if velocity < 0.0 {
        (velocity + step).min(0.0)
    } else {
        0.0
    }
}

fn clamp_to_sides(body: &mut Body, tower: &Tower) -> Option<Facing> {
    let max_x = (tower.width() - body.size.x).max(0.0);
    if body.position.x < 0.0 {
        body.position.x = 0.0;
        body.velocity.x = body.velocity.x.max(0.0);
        Some(Facing::Left)
    } else if body.position.x > max_x {
        body.position.x = max_x;
        body.velocity.x = body.velocity.x.min(0.0);
        Some(Facing::Right)
    } else {
        None
    }
}

fn clamp_to_top(body: &mut Body, previous: &Body) -> bool {
    let ceiling = previous.position.y.min(0.0);
    if body.position.y < ceiling {
        body.position.y = ceiling;
        body.velocity.y = body.velocity.y.max(0.0);
        true
    } else {
        false
    }
}

fn feet_row(body: &Body, tower: &Tower) -> Option<u32> {
    let row = (body.bottom() / tower.row_height()).round();
    if row < 0.0 || row >= tower.rows() as f32 {
        return None;
    }
    Some(row as u32)
}
