use glam::Vec2;
use tower_platformer_core::{
    Command, Direction, Facing, InputState, MonsterId, PlayerSnapshot, PlayerState,
};
use tower_platformer_system_player_controller::PlayerController;
use tower_platformer_world::{self as world, query, LevelDescription, LevelMap, Tuning, World};

fn world_from_map(lines: &[&str]) -> World {
    let level = LevelDescription::from_map(&LevelMap {
        name: "controller".to_owned(),
        map: lines.iter().map(|line| (*line).to_owned()).collect(),
    })
    .expect("valid map");
    World::new(&level, Tuning::default()).expect("valid world")
}

fn step(world: &mut World, controller: &PlayerController, input: InputState) -> PlayerSnapshot {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    controller.handle(
        &query::player(world),
        &input,
        query::tick_index(world),
        query::tower(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    query::player(world)
}

const FLAT: [&str; 4] = ["          ", "          ", " P        ", "XXXXXXXXXX"];

const TALL: [&str; 8] = [
    "          ",
    "          ",
    "          ",
    "          ",
    "          ",
    "          ",
    " P        ",
    "XXXXXXXXXX",
];

const LADDER: [&str; 7] = [
    "          ",
    "          ",
    "          ",
    "XXHXXXXXXX",
    "  H       ",
    "  P       ",
    "XXXXXXXXXX",
];

const LEDGE: [&str; 8] = [
    "          ",
    "          ",
    " P        ",
    "XX        ",
    "          ",
    "          ",
    "          ",
    "XXXXXXXXXX",
];

#[test]
fn idle_player_on_ground_is_unchanged() {
    let mut world = world_from_map(&FLAT);
    let controller = PlayerController::new(&Tuning::default());
    let before = query::player(&world);

    let after = step(&mut world, &controller, InputState::idle());

    assert_eq!(after.body.position, before.body.position);
    assert_eq!(after.body.velocity, Vec2::ZERO);
    assert!(after.body.on_ground);
    assert_eq!(after.state, PlayerState::Standing);
}

#[test]
fn horizontal_input_walks() {
    let mut world = world_from_map(&FLAT);
    let controller = PlayerController::new(&Tuning::default());
    let start = query::player(&world).body.position.x;

    let after = step(&mut world, &controller, InputState::idle().holding(Direction::Right));

    assert_eq!(after.state, PlayerState::Walking);
    assert_eq!(after.body.facing, Facing::Right);
    assert!(after.body.position.x > start);
    assert!(after.body.on_ground);
}

#[test]
fn jump_passes_through_rising_and_falling_before_landing() {
    let mut world = world_from_map(&TALL);
    let controller = PlayerController::new(&Tuning::default());
    let ground = query::player(&world).body.bottom();

    let mut states = vec![query::player(&world).state];
    let first = step(&mut world, &controller, InputState::idle().with_jump());
    states.push(first.state);
    assert!(first.body.velocity.y < 0.0);

    for _ in 0..120 {
        let snapshot = step(&mut world, &controller, InputState::idle());
        if states.last() != Some(&snapshot.state) {
            states.push(snapshot.state);
        }
        if snapshot.body.on_ground {
            assert_eq!(snapshot.body.bottom(), ground);
            break;
        }
    }

    assert_eq!(
        states,
        vec![
            PlayerState::Standing,
            PlayerState::Jumping,
            PlayerState::Falling,
            PlayerState::Standing
        ]
    );
}

#[test]
fn jump_is_ignored_mid_air_without_grace() {
    let mut world = world_from_map(&TALL);
    let controller = PlayerController::new(&Tuning::default());
    let _ = step(&mut world, &controller, InputState::idle().with_jump());
    let rising = step(&mut world, &controller, InputState::idle());

    let again = step(&mut world, &controller, InputState::idle().with_jump());

    assert!(again.body.velocity.y > rising.body.velocity.y);
    assert_eq!(again.jump_buffer, 0);
}

#[test]
fn walking_off_a_ledge_grants_grace_ticks() {
    let tuning = Tuning::default();
    let mut world = world_from_map(&LEDGE);
    let controller = PlayerController::new(&tuning);
    let right = InputState::idle().holding(Direction::Right);

    let mut airborne = None;
    for _ in 0..120 {
        let snapshot = step(&mut world, &controller, right);
        if !snapshot.body.on_ground {
            airborne = Some(snapshot);
            break;
        }
    }
    let airborne = airborne.expect("player left the ledge");
    assert_eq!(airborne.jump_buffer, tuning.jump_grace_ticks);
    assert_eq!(airborne.state, PlayerState::Falling);

    let jumped = step(&mut world, &controller, right.with_jump());
    assert_eq!(jumped.state, PlayerState::Jumping);
    assert_eq!(jumped.jump_buffer, 0);
}

#[test]
fn grace_expires_after_the_configured_ticks() {
    let tuning = Tuning::default();
    let mut world = world_from_map(&LEDGE);
    let controller = PlayerController::new(&tuning);
    let right = InputState::idle().holding(Direction::Right);

    while query::player(&world).body.on_ground {
        let _ = step(&mut world, &controller, right);
    }
    for _ in 0..tuning.jump_grace_ticks {
        let _ = step(&mut world, &controller, InputState::idle());
    }
    assert_eq!(query::player(&world).jump_buffer, 0);

    let late = step(&mut world, &controller, InputState::idle().with_jump());
    assert_eq!(late.state, PlayerState::Falling);
    assert!(late.body.velocity.y > 0.0);
}

#[test]
fn climbing_up_never_gains_downward_velocity_and_tops_out() {
    let mut world = world_from_map(&LADDER);
    let controller = PlayerController::new(&Tuning::default());
    assert!(query::player(&world).body.on_ladder);
    let up = InputState::idle().holding(Direction::Up);

    let mut climbed = false;
    for _ in 0..120 {
        let snapshot = step(&mut world, &controller, up);
        if snapshot.body.on_ladder {
            assert!(snapshot.body.velocity.y <= 0.0);
        }
        if snapshot.state == PlayerState::Climbing {
            climbed = true;
            assert_eq!(snapshot.body.facing, Facing::Up);
        }
        if climbed && snapshot.body.on_ground {
            break;
        }
    }

    let top = query::player(&world);
    assert!(climbed);
    assert!(top.body.on_ground);
    assert_eq!(top.body.bottom(), 81.0);
    assert!(top.body.ladder_underfoot);
    assert_eq!(top.state, PlayerState::Standing);
}

#[test]
fn holding_down_on_a_ladder_top_climbs_back_to_the_floor() {
    let mut world = world_from_map(&LADDER);
    let controller = PlayerController::new(&Tuning::default());
    let up = InputState::idle().holding(Direction::Up);
    while !(query::player(&world).body.on_ground && query::player(&world).body.bottom() == 81.0) {
        let _ = step(&mut world, &controller, up);
    }

    let down = InputState::idle().holding(Direction::Down);
    let first = step(&mut world, &controller, down);
    assert_eq!(first.state, PlayerState::Climbing);
    assert!(first.body.bottom() > 81.0);

    for _ in 0..120 {
        let snapshot = step(&mut world, &controller, down);
        if snapshot.body.on_ground {
            assert_eq!(snapshot.body.bottom(), 162.0);
            assert_eq!(snapshot.state, PlayerState::Standing);
            return;
        }
    }
    panic!("player never reached the floor");
}

#[test]
fn idle_on_a_ladder_holds_position() {
    let mut world = world_from_map(&LADDER);
    let controller = PlayerController::new(&Tuning::default());
    let up = InputState::idle().holding(Direction::Up);
    for _ in 0..5 {
        let _ = step(&mut world, &controller, up);
    }
    let hanging = query::player(&world);
    assert_eq!(hanging.state, PlayerState::Climbing);

    let still = step(&mut world, &controller, InputState::idle());

    assert_eq!(still.state, PlayerState::Climbing);
    assert_eq!(still.body.position, hanging.body.position);
    assert_eq!(still.body.velocity.y, 0.0);
}

#[test]
fn hurt_player_ignores_input() {
    let mut world = world_from_map(&["          ", "          ", " P      S ", "XXXXXXXXXX"]);
    let controller = PlayerController::new(&Tuning::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::HurtPlayer {
            monster: MonsterId::new(0),
            knockback: Vec2::new(-135.0, -202.5),
        },
        &mut events,
    );

    let after = step(&mut world, &controller, InputState::idle().holding(Direction::Right).with_jump());

    assert_eq!(after.state, PlayerState::Hurt);
    assert!(after.body.velocity.x < 0.0);
    assert!(after.body.velocity.x > -135.0);
    assert!(after.body.velocity.y > -202.5);
}

#[test]
fn airborne_acceleration_is_reduced() {
    let tuning = Tuning::default();
    let mut world = world_from_map(&["          ", " P        ", "          ", "          ", "XXXXXXXXXX"]);
    let controller = PlayerController::new(&tuning);
    assert!(!query::player(&world).body.on_ground);

    let after = step(&mut world, &controller, InputState::idle().holding(Direction::Left));

    let expected = -tuning.accel_units() * 0.5 * tuning.dt();
    assert!((after.body.velocity.x - expected).abs() < 1e-3);
    assert_eq!(after.body.facing, Facing::Left);
    assert_eq!(after.state, PlayerState::Falling);
}
