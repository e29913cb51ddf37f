#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tower platformer.

mod level;
mod tower;
mod tuning;

pub use level::{LevelDescription, LevelError, LevelMap, MonsterSpawn, RowDescription};
pub use tower::Tower;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;
use tower_platformer_core::{
    Archetype, Body, CellCoord, Command, Event, Facing, MonsterId, MovementAxis, Patrol,
    PlayerState, WELCOME_BANNER,
};
use tracing::{debug, warn};

const DEFAULT_BLOCK_RANGE: u32 = 1;

/// Represents the authoritative simulation state for one level instance.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    name: String,
    tuning: Tuning,
    tower: Tower,
    player: Player,
    monsters: Vec<Monster>,
    tick_index: u64,
}

impl World {
    /// Builds a world from a level description, spawning every entity.
    pub fn new(level: &LevelDescription, tuning: Tuning) -> Result<Self, LevelError> {
        level.validate()?;

        let tower = Tower::from_level(level, &tuning);
        let needed = (tuning.player_size().y / tower.row_height()).ceil() as u32;
        if level.player.row() + 1 < needed {
            return Err(LevelError::NoHeadroom {
                column: level.player.column(),
                row: level.player.row(),
                needed,
            });
        }
        let player = Player::spawn(level.player, &tower, &tuning);
        let monsters: Vec<Monster> = (0_u32..)
            .zip(level.monsters.iter())
            .map(|(index, spawn)| Monster::spawn(MonsterId::new(index), spawn, &tower, &tuning))
            .collect();

        debug!(
            level = %level.name,
            columns = tower.columns(),
            rows = tower.rows(),
            monsters = monsters.len(),
            coins = tower.coin_count(),
            "world constructed"
        );

        Ok(Self {
            banner: WELCOME_BANNER,
            name: level.name.clone(),
            tuning,
            tower,
            player,
            monsters,
            tick_index: 0,
        })
    }

    fn monster_mut(&mut self, monster_id: MonsterId) -> Option<&mut Monster> {
        self.monsters
            .iter_mut()
            .find(|monster| monster.id == monster_id)
    }

    fn remove_monster(&mut self, monster_id: MonsterId, out_events: &mut Vec<Event>) {
        let before = self.monsters.len();
        self.monsters.retain(|monster| monster.id != monster_id);
        if self.monsters.len() != before {
            out_events.push(Event::MonsterRemoved {
                monster: monster_id,
            });
        }
    }

    fn expire_timers(&mut self, out_events: &mut Vec<Event>) {
        let tick = self.tick_index;
        let expired: Vec<MonsterId> = self
            .monsters
            .iter()
            .filter(|monster| monster.dying_until.map_or(false, |until| tick >= until))
            .map(|monster| monster.id)
            .collect();
        for monster_id in expired {
            self.remove_monster(monster_id, out_events);
        }

        if self
            .player
            .hurt_until
            .map_or(false, |until| tick >= until)
        {
            self.player.hurt_until = None;
        }
    }

    fn change_player_state(&mut self, state: PlayerState, out_events: &mut Vec<Event>) {
        let from = self.player.state;
        if from != state {
            self.player.state = state;
            out_events.push(Event::PlayerStateChanged { from, to: state });
        }
    }

    fn is_player_hurt(&self) -> bool {
        self.player
            .hurt_until
            .map_or(false, |until| self.tick_index < until)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
            world.expire_timers(out_events);
        }
        Command::UpdatePlayer {
            body,
            state,
            jump_buffer,
        } => {
            if !world.player.body.alive {
                return;
            }

            let previous = world.player.body;
            let body = sanitize(body, &previous, world.tower.width(), None, out_events);
            world.player.body = body;
            world.player.jump_buffer = jump_buffer;
            world.change_player_state(state, out_events);

            if !body.alive {
                debug!(tick = world.tick_index, "player fell out of the tower");
                out_events.push(Event::PlayerFell);
            }
        }
        Command::UpdateMonster {
            monster,
            body,
            heading,
        } => {
            let width = world.tower.width();
            let Some(entry) = world.monster_mut(monster) else {
                return;
            };
            if entry.dying_until.is_some() {
                return;
            }

            entry.body = sanitize(body, &entry.body, width, Some(monster), out_events);
            entry.heading = heading;

            if !entry.body.alive {
                world.remove_monster(monster, out_events);
            }
        }
        Command::CollectCoin { cell } => {
            if !world.player.body.alive || !world.tower.take_coin(cell) {
                return;
            }

            let player = &mut world.player;
            player.coins = player.coins.saturating_add(1);
            player.score = player.score.saturating_add(world.tuning.coin_score);
            out_events.push(Event::CoinCollected {
                cell,
                coins: player.coins,
                score: player.score,
            });
        }
        Command::HurtPlayer { monster, knockback } => {
            if !world.player.body.alive || world.is_player_hurt() {
                return;
            }
            let harmful = world
                .monsters
                .iter()
                .any(|entry| entry.id == monster && entry.dying_until.is_none());
            if !harmful {
                return;
            }

            let until = world
                .tick_index
                .saturating_add(u64::from(world.tuning.hurt_ticks));
            world.player.hurt_until = Some(until);
            world.player.hits = world.player.hits.saturating_add(1);
            world.player.jump_buffer = 0;
            if knockback.is_finite() {
                world.player.body.velocity = knockback;
            }
            world.player.body.on_ground = false;
            world.change_player_state(PlayerState::Hurt, out_events);

            let hits = world.player.hits;
            out_events.push(Event::PlayerHurt { monster, hits });

            if world
                .tuning
                .lethal_hits
                .map_or(false, |lethal| hits >= lethal)
            {
                world.player.body.alive = false;
                debug!(hits, "player defeated");
                out_events.push(Event::PlayerDefeated);
            }
        }
        Command::StompMonster { monster, bounce } => {
            if !world.player.body.alive {
                return;
            }

            let until = world
                .tick_index
                .saturating_add(u64::from(world.tuning.dying_ticks));
            let Some(entry) = world.monster_mut(monster) else {
                return;
            };
            if entry.dying_until.is_some() {
                return;
            }
            entry.dying_until = Some(until);
            entry.body.velocity = Vec2::ZERO;

            let bounce = if bounce.is_finite() { bounce.abs() } else { 0.0 };
            world.player.body.velocity.y = -bounce;
            world.player.body.on_ground = false;
            world.player.jump_buffer = 0;
            world.change_player_state(PlayerState::Jumping, out_events);
            out_events.push(Event::MonsterStomped { monster });
        }
    }
}

fn sanitize(
    mut body: Body,
    previous: &Body,
    tower_width: f32,
    monster: Option<MonsterId>,
    out_events: &mut Vec<Event>,
) -> Body {
    let mut clamped = false;

    if !body.is_finite() || !body.size.is_finite() {
        warn!(?monster, "discarding non-finite body update");
        body.position = previous.position;
        body.velocity = Vec2::ZERO;
        body.size = previous.size;
        clamped = true;
    }

    let max_x = (tower_width - body.size.x).max(0.0);
    if body.position.x < 0.0 || body.position.x > max_x {
        warn!(?monster, x = body.position.x, max_x, "clamping body into the tower");
        body.position.x = body.position.x.clamp(0.0, max_x);
        clamped = true;
    }

    if clamped {
        out_events.push(Event::InvariantClamped { monster });
    }
    body
}

#[derive(Debug)]
struct Player {
    body: Body,
    state: PlayerState,
    hurt_until: Option<u64>,
    jump_buffer: u32,
    coins: u32,
    score: u32,
    hits: u32,
}

impl Player {
    fn spawn(cell: CellCoord, tower: &Tower, tuning: &Tuning) -> Self {
        let size = tuning.player_size();
        let mut body = Body::new(standing_position(cell, size, tower), size, Facing::None);
        body.on_ground = resting_on_surface(&body, tower);
        body.on_ladder = touching_ladder(&body, tower, tuning);

        Self {
            body,
            state: PlayerState::Standing,
            hurt_until: None,
            jump_buffer: 0,
            coins: 0,
            score: 0,
            hits: 0,
        }
    }
}

#[derive(Debug)]
struct Monster {
    id: MonsterId,
    archetype: Archetype,
    body: Body,
    heading: Facing,
    speed: f32,
    patrol: Patrol,
    dying_until: Option<u64>,
}

impl Monster {
    fn spawn(id: MonsterId, spawn: &MonsterSpawn, tower: &Tower, tuning: &Tuning) -> Self {
        let archetype = spawn.archetype;
        let size = archetype.size_in_meters() * tuning.meter;
        let position = if archetype.is_grounded() {
            standing_position(spawn.cell, size, tower)
        } else {
            centred_position(spawn.cell, size, tower)
        };
        let heading = archetype.initial_heading();
        let mut body = Body::new(position, size, heading);
        if archetype.is_grounded() {
            body.on_ground = resting_on_surface(&body, tower);
        }

        let max_x = (tower.width() - size.x).max(0.0);
        let max_y = (tower.height() - size.y).max(0.0);
        let patrol = match (archetype.axis(), archetype) {
            (MovementAxis::Vertical, _) => {
                let reach = spawn.range.unwrap_or(DEFAULT_BLOCK_RANGE) as f32 * tower.row_height();
                Patrol::new(
                    (position.y - reach).clamp(0.0, max_y),
                    (position.y + reach).clamp(0.0, max_y),
                )
            }
            (MovementAxis::Horizontal, Archetype::Fly) => match spawn.range {
                Some(columns) => {
                    let reach = columns as f32 * tower.column_width();
                    Patrol::new(
                        (position.x - reach).clamp(0.0, max_x),
                        (position.x + reach).clamp(0.0, max_x),
                    )
                }
                None => Patrol::new(0.0, max_x),
            },
            (MovementAxis::Horizontal, _) => Patrol::new(0.0, max_x),
        };

        Self {
            id,
            archetype,
            body,
            heading,
            speed: archetype.speed_in_meters() * tuning.meter,
            patrol,
            dying_until: None,
        }
    }
}

fn standing_position(cell: CellCoord, size: Vec2, tower: &Tower) -> Vec2 {
    Vec2::new(
        tower.column_center(cell.column()) - size.x * 0.5,
        tower.row_top(cell.row() + 1) - size.y,
    )
}

fn centred_position(cell: CellCoord, size: Vec2, tower: &Tower) -> Vec2 {
    Vec2::new(
        tower.column_center(cell.column()) - size.x * 0.5,
        tower.row_top(cell.row()) + (tower.row_height() - size.y) * 0.5,
    )
}

fn resting_on_surface(body: &Body, tower: &Tower) -> bool {
    let bottom = body.bottom();
    tower
        .surface_between(
            body.position.x,
            body.position.x + body.size.x,
            bottom,
            bottom,
            true,
        )
        .is_some()
}

fn touching_ladder(body: &Body, tower: &Tower, tuning: &Tuning) -> bool {
    tower
        .rows_between(body.position.y, body.bottom())
        .and_then(|(first, last)| {
            tower.ladder_near(body.center().x, tuning.ladder_reach(), first, last)
        })
        .is_some()
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use crate::{Tower, Tuning};
    use tower_platformer_core::{MonsterId, MonsterSnapshot, MonsterView, PlayerSnapshot};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Name of the loaded level.
    #[must_use]
    pub fn level_name(world: &World) -> &str {
        &world.name
    }

    /// Provides read-only access to the tower geometry and remaining coins.
    #[must_use]
    pub fn tower(world: &World) -> &Tower {
        &world.tower
    }

    /// Provides read-only access to the constants the world was built with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Index of the most recently started tick.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            body: player.body,
            state: player.state,
            hurt_until: player.hurt_until,
            jump_buffer: player.jump_buffer,
            coins: player.coins,
            score: player.score,
            hits: player.hits,
        }
    }

    /// Captures a read-only view of every monster in the tower.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(world.monsters.iter().map(snapshot).collect())
    }

    /// Captures a single monster, if it is still part of the simulation.
    #[must_use]
    pub fn monster(world: &World, monster_id: MonsterId) -> Option<MonsterSnapshot> {
        world
            .monsters
            .iter()
            .find(|monster| monster.id == monster_id)
            .map(snapshot)
    }

    /// Number of coins still present in the tower.
    #[must_use]
    pub fn coins_remaining(world: &World) -> usize {
        world.tower.coin_count()
    }

    fn snapshot(monster: &super::Monster) -> MonsterSnapshot {
        MonsterSnapshot {
            id: monster.id,
            archetype: monster.archetype,
            body: monster.body,
            heading: monster.heading,
            speed: monster.speed,
            patrol: monster.patrol,
            dying_until: monster.dying_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_platformer_core::MonsterSnapshot;

    fn level(lines: &[&str]) -> LevelDescription {
        LevelDescription::from_map(&LevelMap {
            name: "fixture".to_owned(),
            map: lines.iter().map(|line| (*line).to_owned()).collect(),
        })
        .expect("valid map")
    }

    fn world(lines: &[&str], tuning: Tuning) -> World {
        World::new(&level(lines), tuning).expect("valid world")
    }

    fn first_monster(world: &World) -> MonsterSnapshot {
        query::monster_view(world)
            .into_vec()
            .into_iter()
            .next()
            .expect("monster present")
    }

    #[test]
    fn player_spawns_standing_on_the_row_below() {
        let world = world(
            &["          ", "          ", " P        ", "XXXXXXXXXX"],
            Tuning::default(),
        );
        let player = query::player(&world);

        assert_eq!(player.body.position, Vec2::new(101.25, 27.0));
        assert_eq!(player.body.bottom(), 81.0);
        assert!(player.body.on_ground);
        assert!(!player.body.on_ladder);
        assert_eq!(player.state, PlayerState::Standing);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::level_name(&world), "fixture");
    }

    #[test]
    fn monsters_spawn_with_archetype_parameters() {
        let world = world(&["  F  ", " B   ", "P   S", "XXXXX"], Tuning::default());
        let monsters = query::monster_view(&world).into_vec();

        assert_eq!(monsters.len(), 3);
        let fly = monsters[0];
        assert_eq!(fly.archetype, Archetype::Fly);
        assert_eq!(fly.heading, Facing::Left);
        assert_eq!(fly.speed, 8.0 * 27.0);
        assert_eq!(fly.body.size, Vec2::new(40.5, 27.0));
        assert_eq!(fly.body.position.y, 0.0);
        assert_eq!(fly.patrol.min(), 0.0);
        assert_eq!(fly.patrol.max(), 5.0 * 81.0 - 40.5);

        let block = monsters[1];
        assert_eq!(block.heading, Facing::Up);
        assert_eq!(block.body.position.y, 27.0 - 6.75);
        assert_eq!(block.patrol.min(), 0.0);
        assert_eq!(block.patrol.max(), 27.0 - 6.75 + 27.0);

        let slime = monsters[2];
        assert_eq!(slime.heading, Facing::Right);
        assert_eq!(slime.body.bottom(), 81.0);
        assert!(slime.body.on_ground);
    }

    #[test]
    fn tick_advances_the_clock() {
        let mut world = world(&["  ", "P ", "XX"], Tuning::default());
        let mut events = Vec::new();

        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Tick, &mut events);

        assert_eq!(query::tick_index(&world), 2);
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { tick: 1 },
                Event::TimeAdvanced { tick: 2 }
            ]
        );
    }

    #[test]
    fn coins_are_collected_exactly_once() {
        let mut world = world(&["  ", "Po", "XX"], Tuning::default());
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 1);

        apply(&mut world, Command::CollectCoin { cell }, &mut events);
        apply(&mut world, Command::CollectCoin { cell }, &mut events);

        assert_eq!(
            events,
            vec![Event::CoinCollected {
                cell,
                coins: 1,
                score: 50
            }]
        );
        assert_eq!(query::coins_remaining(&world), 0);
        assert!(!query::tower(&world).has_coin(cell));
        assert_eq!(query::player(&world).score, 50);
    }

    #[test]
    fn hurt_is_ignored_inside_the_invulnerability_window() {
        let tuning = Tuning {
            hurt_ticks: 3,
            ..Tuning::default()
        };
        let mut world = world(&["    ", "P  S", "XXXX"], tuning);
        let monster = MonsterId::new(0);
        let knockback = Vec2::new(-135.0, -202.5);
        let mut events = Vec::new();

        apply(&mut world, Command::HurtPlayer { monster, knockback }, &mut events);
        apply(&mut world, Command::HurtPlayer { monster, knockback }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::PlayerStateChanged {
                    from: PlayerState::Standing,
                    to: PlayerState::Hurt
                },
                Event::PlayerHurt { monster, hits: 1 },
            ]
        );
        let player = query::player(&world);
        assert_eq!(player.body.velocity, knockback);
        assert!(player.is_hurt(query::tick_index(&world)));

        for _ in 0..3 {
            apply(&mut world, Command::Tick, &mut events);
        }
        events.clear();
        apply(&mut world, Command::HurtPlayer { monster, knockback }, &mut events);
        assert!(events.contains(&Event::PlayerHurt { monster, hits: 2 }));
    }

    #[test]
    fn lethal_hits_defeat_the_player() {
        let tuning = Tuning {
            lethal_hits: Some(1),
            ..Tuning::default()
        };
        let mut world = world(&["    ", "P  S", "XXXX"], tuning);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::HurtPlayer {
                monster: MonsterId::new(0),
                knockback: Vec2::ZERO,
            },
            &mut events,
        );

        assert_eq!(events.last(), Some(&Event::PlayerDefeated));
        assert!(!query::player(&world).body.alive);
    }

    #[test]
    fn stomped_monsters_linger_then_disappear() {
        let tuning = Tuning {
            dying_ticks: 2,
            ..Tuning::default()
        };
        let mut world = world(&["    ", "P  S", "XXXX"], tuning);
        let monster = MonsterId::new(0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StompMonster {
                monster,
                bounce: 200.0,
            },
            &mut events,
        );
        assert!(events.contains(&Event::MonsterStomped { monster }));
        assert!(first_monster(&world).is_dying());
        assert_eq!(query::player(&world).body.velocity.y, -200.0);
        assert_eq!(query::player(&world).state, PlayerState::Jumping);

        apply(
            &mut world,
            Command::HurtPlayer {
                monster,
                knockback: Vec2::ZERO,
            },
            &mut events,
        );
        assert_eq!(query::player(&world).hits, 0);

        apply(&mut world, Command::Tick, &mut events);
        assert!(query::monster(&world, monster).is_some());
        apply(&mut world, Command::Tick, &mut events);
        assert!(query::monster(&world, monster).is_none());
        assert_eq!(events.last(), Some(&Event::MonsterRemoved { monster }));
    }

    #[test]
    fn non_finite_updates_are_discarded() {
        let mut world = world(&["  ", "P ", "XX"], Tuning::default());
        let before = query::player(&world);
        let mut body = before.body;
        body.position.x = f32::NAN;
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::UpdatePlayer {
                body,
                state: PlayerState::Standing,
                jump_buffer: 0,
            },
            &mut events,
        );

        assert_eq!(query::player(&world).body.position, before.body.position);
        assert_eq!(events, vec![Event::InvariantClamped { monster: None }]);
    }

    #[test]
    fn bodies_are_clamped_into_the_tower() {
        let mut world = world(&["    ", "P  S", "XXXX"], Tuning::default());
        let monster = first_monster(&world);
        let mut body = monster.body;
        body.position.x = 10_000.0;
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::UpdateMonster {
                monster: monster.id,
                body,
                heading: Facing::Left,
            },
            &mut events,
        );

        let moved = first_monster(&world);
        assert_eq!(moved.body.position.x, 4.0 * 81.0 - 40.5);
        assert_eq!(moved.heading, Facing::Left);
        assert_eq!(
            events,
            vec![Event::InvariantClamped {
                monster: Some(monster.id)
            }]
        );
    }

    #[test]
    fn falling_out_is_reported_once() {
        let mut world = world(&["  ", "P ", "  "], Tuning::default());
        let mut body = query::player(&world).body;
        body.alive = false;
        let mut events = Vec::new();

        for _ in 0..2 {
            apply(
                &mut world,
                Command::UpdatePlayer {
                    body,
                    state: PlayerState::Falling,
                    jump_buffer: 0,
                },
                &mut events,
            );
        }

        assert_eq!(
            events,
            vec![
                Event::PlayerStateChanged {
                    from: PlayerState::Standing,
                    to: PlayerState::Falling
                },
                Event::PlayerFell,
            ]
        );
    }

    #[test]
    fn dead_monsters_are_removed() {
        let mut world = world(&["    ", "P  S", "XXXX"], Tuning::default());
        let monster = first_monster(&world);
        let mut body = monster.body;
        body.alive = false;
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::UpdateMonster {
                monster: monster.id,
                body,
                heading: monster.heading,
            },
            &mut events,
        );

        assert!(query::monster_view(&world).is_empty());
        assert_eq!(
            events,
            vec![Event::MonsterRemoved {
                monster: monster.id
            }]
        );
    }

    #[test]
    fn invalid_levels_are_rejected() {
        let mut level = level(&["P ", "XX"]);
        level.player = CellCoord::new(5, 0);
        assert!(matches!(
            World::new(&level, Tuning::default()),
            Err(LevelError::PlayerOutOfBounds { .. })
        ));
    }

    #[test]
    fn player_start_needs_headroom_below_the_tower_top() {
        let level = level(&["P ", "XX"]);
        assert!(matches!(
            World::new(&level, Tuning::default()),
            Err(LevelError::NoHeadroom {
                column: 0,
                row: 0,
                needed: 2
            })
        ));

        let world = world(&["  ", "P ", "XX"], Tuning::default());
        assert_eq!(query::player(&world).body.position.y, 0.0);
    }
}
