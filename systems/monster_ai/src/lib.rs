#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-archetype monster behaviour.
//!
//! Every archetype runs through the same routine: pick a motion from the
//! heading, resolve it against the tower, then decide whether to keep going
//! or turn around. Monsters never plan paths.

use tower_platformer_core::{Archetype, Body, Command, Facing, MonsterSnapshot, MonsterView};
use tower_platformer_system_physics::{
    Collision, HorizontalMotion, Motion, Physics, Resolution, VerticalMotion,
};
use tower_platformer_world::{Tower, Tuning};
use tracing::trace;

/// Body and heading chosen for a monster after one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterStep {
    /// Resolved body.
    pub body: Body,
    /// Heading for the next tick.
    pub heading: Facing,
}

/// Pure system that moves every live monster once per tick.
#[derive(Debug)]
pub struct MonsterAi {
    physics: Physics,
}

impl MonsterAi {
    /// Creates the system from the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            physics: Physics::new(tuning),
        }
    }

    /// Emits an `UpdateMonster` command for every monster that is not dying.
    ///
    /// Each monster is resolved against the same snapshot, so the order of the
    /// view never changes the outcome.
    pub fn handle(&self, monsters: &MonsterView, tower: &Tower, out: &mut Vec<Command>) {
        for monster in monsters.iter().filter(|monster| !monster.is_dying()) {
            let step = self.step(monster, tower);
            if step.heading != monster.heading {
                trace!(
                    monster = monster.id.get(),
                    archetype = ?monster.archetype,
                    heading = ?step.heading,
                    "monster reversed"
                );
            }
            out.push(Command::UpdateMonster {
                monster: monster.id,
                body: step.body,
                heading: step.heading,
            });
        }
    }

    /// Advances a single monster by one tick.
    #[must_use]
    pub fn step(&self, monster: &MonsterSnapshot, tower: &Tower) -> MonsterStep {
        let motion = steer(monster);
        let resolution = self.physics.resolve(&monster.body, &motion, tower);
        settle(monster, &resolution)
    }
}

/// Motion request implied by the monster's archetype and heading.
#[must_use]
pub fn steer(monster: &MonsterSnapshot) -> Motion {
    let velocity = monster.heading.unit() * monster.speed;
    match monster.archetype {
        Archetype::Block => Motion {
            horizontal: HorizontalMotion::Constant(0.0),
            vertical: VerticalMotion::Constant(velocity.y),
            jump_impulse: None,
            collision: Collision::Bounce,
        },
        Archetype::Fly => Motion {
            horizontal: HorizontalMotion::Constant(velocity.x),
            vertical: VerticalMotion::Constant(0.0),
            jump_impulse: None,
            collision: Collision::Ghost,
        },
        Archetype::Slime | Archetype::Snail => Motion {
            horizontal: HorizontalMotion::Constant(velocity.x),
            vertical: VerticalMotion::Gravity,
            jump_impulse: None,
            collision: Collision::Land,
        },
    }
}

/// Decides whether the monster keeps its heading after a resolved tick.
#[must_use]
pub fn settle(monster: &MonsterSnapshot, resolution: &Resolution) -> MonsterStep {
    let mut body = resolution.body;
    let patrol = monster.patrol;

    let heading = match monster.archetype {
        Archetype::Block => {
            let y = body.position.y;
            if monster.heading == Facing::Down {
                if y >= patrol.max() {
                    body.position.y = patrol.max();
                    Facing::Up
                } else if resolution.landed {
                    Facing::Up
                } else {
                    Facing::Down
                }
            } else if y <= patrol.min() {
                body.position.y = patrol.min();
                Facing::Down
            } else if resolution.ceiling {
                Facing::Down
            } else {
                Facing::Up
            }
        }
        Archetype::Fly => {
            let x = body.position.x;
            match (resolution.wall, monster.heading) {
                (Some(wall), _) => wall.reversed(),
                (None, Facing::Right) if x >= patrol.max() => {
                    body.position.x = patrol.max();
                    Facing::Left
                }
                (None, Facing::Right) => Facing::Right,
                (None, _) if x <= patrol.min() => {
                    body.position.x = patrol.min();
                    Facing::Right
                }
                (None, _) => Facing::Left,
            }
        }
        Archetype::Slime | Archetype::Snail => match resolution.wall {
            Some(wall) => wall.reversed(),
            None if monster.heading == Facing::Right => Facing::Right,
            None => Facing::Left,
        },
    };

    let velocity = heading.unit() * monster.speed;
    match monster.archetype {
        Archetype::Block | Archetype::Fly => body.velocity = velocity,
        Archetype::Slime | Archetype::Snail => body.velocity.x = velocity.x,
    }
    body.facing = heading;

    MonsterStep { body, heading }
}
