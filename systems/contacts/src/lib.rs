#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Overlap detection between the player, the coins and the monsters.
//!
//! Contacts are evaluated once per tick after every entity moved. A contact
//! episode starts on the first tick a monster overlaps the player and lasts
//! until they separate; only the first tick of an episode can hurt the player
//! or stomp the monster.

use std::collections::BTreeSet;

use glam::Vec2;
use tower_platformer_core::{CellCoord, Command, MonsterId, MonsterView, PlayerSnapshot};
use tower_platformer_world::{Tower, Tuning};
use tracing::trace;

/// Pure system that turns overlaps into coin, hurt and stomp commands.
#[derive(Debug)]
pub struct Contacts {
    touching: BTreeSet<MonsterId>,
    stomp: bool,
    knockback: Vec2,
    bounce: f32,
}

impl Contacts {
    /// Creates the system from the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            touching: BTreeSet::new(),
            stomp: tuning.stomp,
            knockback: Vec2::new(tuning.max_dx_units() * 0.5, -tuning.impulse_units() * 0.5),
            bounce: tuning.impulse_units() * 0.5,
        }
    }

    /// Forgets every ongoing contact episode.
    pub fn reset(&mut self) {
        self.touching.clear();
    }

    /// Monsters currently overlapping the player.
    pub fn touching(&self) -> impl Iterator<Item = MonsterId> + '_ {
        self.touching.iter().copied()
    }

    /// Emits commands for the overlaps produced by the tick.
    ///
    /// `before` is the player at the start of the tick and `after` the player
    /// once every entity moved.
    pub fn handle(
        &mut self,
        before: &PlayerSnapshot,
        after: &PlayerSnapshot,
        monsters: &MonsterView,
        tower: &Tower,
        tick: u64,
        out: &mut Vec<Command>,
    ) {
        if !after.body.alive {
            self.touching.clear();
            return;
        }

        self.collect_coins(after, tower, out);

        let player = after.body.bounds();
        let mut touching = BTreeSet::new();
        let mut stomped = Vec::new();
        let mut hurt_by = None;

        for monster in monsters.iter().filter(|monster| !monster.is_dying()) {
            if !player.overlaps(&monster.body.bounds()) {
                continue;
            }
            let _ = touching.insert(monster.id);
            if self.touching.contains(&monster.id) {
                continue;
            }

            let from_above = before.body.bottom() <= monster.body.center().y;
            if self.stomp && after.body.velocity.y > 0.0 && from_above {
                stomped.push(monster.id);
            } else if hurt_by.is_none() {
                let away = if after.body.center().x < monster.body.center().x {
                    -1.0
                } else {
                    1.0
                };
                hurt_by = Some((monster.id, Vec2::new(away * self.knockback.x, self.knockback.y)));
            }
        }

        self.touching = touching;

        if !stomped.is_empty() {
            for monster in stomped {
                trace!(tick, monster = monster.get(), "player stomped monster");
                out.push(Command::StompMonster {
                    monster,
                    bounce: self.bounce,
                });
            }
            return;
        }

        if let Some((monster, knockback)) = hurt_by {
            if !after.is_hurt(tick) {
                trace!(tick, monster = monster.get(), "player touched monster");
                out.push(Command::HurtPlayer { monster, knockback });
            }
        }
    }

    fn collect_coins(&self, player: &PlayerSnapshot, tower: &Tower, out: &mut Vec<Command>) {
        let body = &player.body;
        let bounds = body.bounds();
        let Some((first_column, last_column)) =
            tower.columns_between(body.position.x, body.position.x + body.size.x)
        else {
            return;
        };
        let Some((first_row, last_row)) = tower.rows_between(body.position.y, body.bottom()) else {
            return;
        };

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                let cell = CellCoord::new(column, row);
                if tower.has_coin(cell) && bounds.overlaps(&tower.coin_bounds(cell)) {
                    out.push(Command::CollectCoin { cell });
                }
            }
        }
    }
}
