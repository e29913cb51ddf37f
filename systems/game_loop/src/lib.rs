#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate driver that sequences the simulation systems.
//!
//! A RUNNING tick advances the clock, lets every monster and then the player
//! move against the previous tick's state, evaluates overlaps once everything
//! moved, checks for the end of the run, follows the player with the camera
//! and finally captures a [`FrameSnapshot`].

mod clock;

pub use clock::FixedClock;

use std::time::Duration;

use tower_platformer_core::{
    Command, EntityFrame, Event, FrameSnapshot, GameOverReason, GameState, InputState, Pose, Role,
    Viewport,
};
use tower_platformer_system_camera::Camera;
use tower_platformer_system_contacts::Contacts;
use tower_platformer_system_monster_ai::MonsterAi;
use tower_platformer_system_player_controller::PlayerController;
use tower_platformer_world::{
    self as world, query, LevelDescription, LevelError, Tuning, TuningError, World,
};
use tracing::{debug, info, warn};

/// Owns the world and the systems, and exposes the lifecycle to a host.
#[derive(Debug)]
pub struct Game {
    tuning: Tuning,
    state: GameState,
    assets_ready: bool,
    world: Option<World>,
    clock: FixedClock,
    pending_jump: bool,
    monster_ai: MonsterAi,
    controller: PlayerController,
    contacts: Contacts,
    camera: Camera,
    frame: Option<FrameSnapshot>,
    events: Vec<Event>,
}

impl Game {
    /// Creates an idle driver in the LOADING state.
    pub fn new(tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;

        Ok(Self {
            state: GameState::Loading,
            assets_ready: false,
            world: None,
            clock: FixedClock::new(tuning.fps, tuning.max_ticks_per_advance),
            pending_jump: false,
            monster_ai: MonsterAi::new(&tuning),
            controller: PlayerController::new(&tuning),
            contacts: Contacts::new(&tuning),
            camera: Camera::from_tuning(&tuning),
            frame: None,
            events: Vec::new(),
            tuning,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Constants the driver was created with.
    #[must_use]
    pub const fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Simulation context of the loaded level, if any.
    #[must_use]
    pub const fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Snapshot captured by the most recent tick or load.
    #[must_use]
    pub const fn frame(&self) -> Option<&FrameSnapshot> {
        self.frame.as_ref()
    }

    /// Removes and returns every event broadcast since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Builds the world for `level`.
    ///
    /// Loading from any state other than LOADING tears the current instance
    /// down first. A malformed level leaves the driver in LOADING without a
    /// world.
    pub fn load(&mut self, level: &LevelDescription) -> Result<(), LevelError> {
        if self.state != GameState::Loading || self.world.is_some() {
            self.teardown();
        }

        let world = match World::new(level, self.tuning.clone()) {
            Ok(world) => world,
            Err(error) => {
                warn!(level = %level.name, %error, "level failed to load");
                return Err(error);
            }
        };

        let target = query::player(&world).body.center();
        let viewport = self.camera.snap(target, query::tower(&world).size());
        self.frame = Some(capture(&world, self.state, viewport));
        info!(level = %level.name, "level loaded");
        self.world = Some(world);

        self.try_start();
        Ok(())
    }

    /// Records that the external loader finished fetching assets.
    pub fn notify_assets_ready(&mut self) {
        self.assets_ready = true;
        self.try_start();
    }

    /// Suspends ticking. Only a RUNNING game can be paused.
    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            self.pending_jump = false;
            self.transition(GameState::Paused);
        } else {
            debug!(state = ?self.state, "pause ignored");
        }
    }

    /// Resumes ticking after [`Game::pause`].
    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.transition(GameState::Running);
        } else {
            debug!(state = ?self.state, "resume ignored");
        }
    }

    /// Tears the current instance down and loads `level` from scratch.
    pub fn reset(&mut self, level: &LevelDescription) -> Result<(), LevelError> {
        self.teardown();
        self.load(level)
    }

    /// Runs the fixed ticks covered by `elapsed` and returns how many ran.
    ///
    /// Time only accumulates while RUNNING. A jump edge applies to the first
    /// tick that runs, which may belong to a later call when `elapsed` is
    /// shorter than a tick.
    pub fn advance(&mut self, elapsed: Duration, input: &InputState) -> u32 {
        if self.state != GameState::Running {
            return 0;
        }
        self.pending_jump |= input.jump_pressed();

        let due = self.clock.accumulate(elapsed);
        let mut ran = 0;
        while ran < due && self.state == GameState::Running {
            let tick_input = if self.pending_jump {
                input.with_jump()
            } else {
                input.without_jump()
            };
            self.pending_jump = false;
            self.step(&tick_input);
            ran += 1;
        }
        ran
    }

    /// Runs exactly one fixed tick if the game is RUNNING.
    pub fn step(&mut self, input: &InputState) {
        if self.state != GameState::Running {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };

        let first_event = self.events.len();
        world::apply(world, Command::Tick, &mut self.events);
        let tick = query::tick_index(world);
        let before = query::player(world);

        let mut commands = Vec::new();
        self.monster_ai
            .handle(&query::monster_view(world), query::tower(world), &mut commands);
        self.controller
            .handle(&before, input, tick, query::tower(world), &mut commands);
        for command in commands.drain(..) {
            world::apply(world, command, &mut self.events);
        }

        let after = query::player(world);
        self.contacts.handle(
            &before,
            &after,
            &query::monster_view(world),
            query::tower(world),
            tick,
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(world, command, &mut self.events);
        }

        let player = query::player(world);
        let defeated = self.events[first_event..]
            .iter()
            .any(|event| matches!(event, Event::PlayerDefeated));
        let outcome = if defeated {
            Some(GameOverReason::Defeated)
        } else if !player.body.alive {
            Some(GameOverReason::Fell)
        } else {
            None
        };

        let viewport = self
            .camera
            .focus(player.body.center(), query::tower(world).size());

        if let Some(reason) = outcome {
            info!(tick, ?reason, score = player.score, "game over");
            self.events.push(Event::GameOver { reason });
            self.transition(GameState::GameOver);
        }

        if let Some(world) = self.world.as_ref() {
            self.frame = Some(capture(world, self.state, viewport));
        }
    }

    fn try_start(&mut self) {
        if self.state == GameState::Loading && self.assets_ready && self.world.is_some() {
            self.clock.reset();
            self.transition(GameState::Running);
        }
    }

    fn teardown(&mut self) {
        if let Some(world) = self.world.take() {
            debug!(level = query::level_name(&world), "tearing down level");
        }
        self.clock.reset();
        self.pending_jump = false;
        self.contacts.reset();
        self.camera = Camera::from_tuning(&self.tuning);
        self.frame = None;
        self.transition(GameState::Loading);
    }

    fn transition(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        if let Some(frame) = self.frame.as_mut() {
            frame.game_state = to;
        }
        info!(?from, ?to, "game state changed");
        self.events.push(Event::GameStateChanged { from, to });
    }
}

fn capture(world: &World, game_state: GameState, viewport: Viewport) -> FrameSnapshot {
    let player = query::player(world);
    let monsters = query::monster_view(world);

    let mut entities = Vec::with_capacity(monsters.len() + 1);
    entities.push(EntityFrame {
        role: Role::Player,
        monster: None,
        bounds: player.body.bounds(),
        pose: Pose::Player(player.state),
        facing: player.body.facing,
    });
    entities.extend(monsters.iter().map(|monster| EntityFrame {
        role: Role::Monster(monster.archetype),
        monster: Some(monster.id),
        bounds: monster.body.bounds(),
        pose: if monster.is_dying() {
            Pose::Dying
        } else {
            Pose::Moving
        },
        facing: monster.heading,
    }));

    FrameSnapshot {
        tick: query::tick_index(world),
        game_state,
        entities,
        viewport,
        score: player.score,
        coins: player.coins,
        coins_remaining: query::coins_remaining(world),
    }
}
