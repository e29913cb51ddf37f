#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player state machine that turns abstract input into motion requests.

use tower_platformer_core::{
    Body, Command, Direction, Facing, InputState, PlayerSnapshot, PlayerState,
};
use tower_platformer_system_physics::{
    Collision, HorizontalMotion, Motion, Physics, Resolution, VerticalMotion,
};
use tower_platformer_world::{Tower, Tuning};
use tracing::trace;

const AIRBORNE_CONTROL: f32 = 0.5;

/// Motion the controller requests for one tick, plus the intent behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plan {
    /// Motion request handed to the resolver.
    pub motion: Motion,
    /// Whether the player is attached to a ladder this tick.
    pub climbing: bool,
    /// Whether a jump was accepted this tick.
    pub jumped: bool,
    /// Facing chosen from the input.
    pub facing: Facing,
}

/// Player state after one controller tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerStep {
    /// Resolved body.
    pub body: Body,
    /// Behaviour state implied by the body and the plan.
    pub state: PlayerState,
    /// Remaining mid-air jump grace ticks.
    pub jump_buffer: u32,
}

/// Pure system that drives the player avatar from sampled input.
#[derive(Debug)]
pub struct PlayerController {
    physics: Physics,
    acceleration: f32,
    friction: f32,
    max_speed: f32,
    climb_speed: f32,
    impulse: f32,
    jump_grace: u32,
}

impl PlayerController {
    /// Creates the controller from the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            physics: Physics::new(tuning),
            acceleration: tuning.accel_units(),
            friction: tuning.friction_units(),
            max_speed: tuning.max_dx_units(),
            climb_speed: tuning.climb_units(),
            impulse: tuning.impulse_units(),
            jump_grace: tuning.jump_grace_ticks,
        }
    }

    /// Emits the `UpdatePlayer` command for the current tick.
    pub fn handle(
        &self,
        player: &PlayerSnapshot,
        input: &InputState,
        tick: u64,
        tower: &Tower,
        out: &mut Vec<Command>,
    ) {
        if !player.body.alive {
            return;
        }

        let step = self.step(player, input, tick, tower);
        out.push(Command::UpdatePlayer {
            body: step.body,
            state: step.state,
            jump_buffer: step.jump_buffer,
        });
    }

    /// Plans, resolves and settles the player for one tick.
    #[must_use]
    pub fn step(
        &self,
        player: &PlayerSnapshot,
        input: &InputState,
        tick: u64,
        tower: &Tower,
    ) -> PlayerStep {
        let plan = self.plan(player, input, tick);

        let mut body = player.body;
        if plan.climbing {
            let column = self
                .physics
                .ladder_column(&body, tower)
                .or_else(|| self.physics.ladder_below(&body, tower));
            if let Some(column) = column {
                body.position.x = tower.column_center(column) - body.size.x * 0.5;
                body.velocity.x = 0.0;
            }
        }

        let resolution = self.physics.resolve(&body, &plan.motion, tower);
        self.settle(player, &plan, &resolution, input, tick)
    }

    /// Chooses the motion request for the tick from input and the previous state.
    #[must_use]
    pub fn plan(&self, player: &PlayerSnapshot, input: &InputState, tick: u64) -> Plan {
        let body = &player.body;
        let control = if body.on_ground { 1.0 } else { AIRBORNE_CONTROL };
        let friction = self.friction * control;

        if player.is_hurt(tick) {
            return Plan {
                motion: Motion {
                    horizontal: HorizontalMotion::Accelerate {
                        acceleration: 0.0,
                        friction,
                        max_speed: self.max_speed,
                    },
                    vertical: VerticalMotion::Gravity,
                    jump_impulse: None,
                    collision: Collision::Land,
                },
                climbing: false,
                jumped: false,
                facing: body.facing,
            };
        }

        let up = input.is_held(Direction::Up);
        let down = input.is_held(Direction::Down);
        let was_climbing = player.state == PlayerState::Climbing;

        let grabs_ladder = (up && body.on_ladder)
            || (down && (body.ladder_underfoot || (body.on_ladder && !body.on_ground)));
        let mut climbing = grabs_ladder || (was_climbing && body.on_ladder);

        let can_jump = body.on_ground || player.jump_buffer > 0 || was_climbing || climbing;
        let jumped = input.jump_pressed() && can_jump;
        if jumped {
            climbing = false;
        }

        let horizontal = input.horizontal_axis();
        let facing = if climbing {
            Facing::Up
        } else if horizontal < 0.0 {
            Facing::Left
        } else if horizontal > 0.0 {
            Facing::Right
        } else if matches!(body.facing, Facing::Up | Facing::Down) {
            Facing::None
        } else {
            body.facing
        };

        let motion = if climbing {
            Motion {
                horizontal: HorizontalMotion::Constant(0.0),
                vertical: VerticalMotion::Climb(input.vertical_axis() * self.climb_speed),
                jump_impulse: None,
                collision: Collision::Land,
            }
        } else {
            Motion {
                horizontal: HorizontalMotion::Accelerate {
                    acceleration: horizontal * self.acceleration * control,
                    friction,
                    max_speed: self.max_speed,
                },
                vertical: VerticalMotion::Gravity,
                jump_impulse: jumped.then_some(self.impulse),
                collision: Collision::Land,
            }
        };

        Plan {
            motion,
            climbing,
            jumped,
            facing,
        }
    }

    /// Derives the behaviour state and jump buffer from a resolved tick.
    #[must_use]
    pub fn settle(
        &self,
        player: &PlayerSnapshot,
        plan: &Plan,
        resolution: &Resolution,
        input: &InputState,
        tick: u64,
    ) -> PlayerStep {
        let mut body = resolution.body;
        body.facing = plan.facing;

        if plan.climbing && !body.on_ladder && body.velocity.y < 0.0 {
            trace!(tick, "player topped out of a ladder");
            body.velocity.y = 0.0;
        }

        let state = if player.is_hurt(tick) {
            PlayerState::Hurt
        } else if plan.climbing && !body.on_ground && body.on_ladder {
            PlayerState::Climbing
        } else if body.on_ground {
            if input.horizontal_axis() != 0.0 || body.velocity.x != 0.0 {
                PlayerState::Walking
            } else {
                PlayerState::Standing
            }
        } else if body.velocity.y < 0.0 {
            PlayerState::Jumping
        } else {
            PlayerState::Falling
        };

        if state == PlayerState::Climbing {
            body.facing = Facing::Up;
        } else if body.facing == Facing::Up {
            body.facing = Facing::None;
        }

        let jump_buffer = if body.on_ground || plan.jumped || state == PlayerState::Climbing {
            0
        } else if player.body.on_ground {
            self.jump_grace
        } else {
            player.jump_buffer.saturating_sub(1)
        };

        PlayerStep {
            body,
            state,
            jump_buffer,
        }
    }
}
