use glam::Vec2;
use tower_platformer_core::{Body, Facing};
use tower_platformer_system_physics::{
    Collision, HorizontalMotion, Motion, Physics, VerticalMotion,
};
use tower_platformer_world::{LevelDescription, LevelMap, Tower, Tuning};

fn tower(lines: &[&str]) -> Tower {
    let level = LevelDescription::from_map(&LevelMap {
        name: "physics".to_owned(),
        map: lines.iter().map(|line| (*line).to_owned()).collect(),
    })
    .expect("valid map");
    Tower::from_level(&level, &Tuning::default())
}

fn player_body(x: f32, bottom: f32) -> Body {
    let size = Tuning::default().player_size();
    Body::new(Vec2::new(x, bottom - size.y), size, Facing::None)
}

fn walking(acceleration: f32) -> Motion {
    let tuning = Tuning::default();
    Motion {
        horizontal: HorizontalMotion::Accelerate {
            acceleration,
            friction: tuning.friction_units(),
            max_speed: tuning.max_dx_units(),
        },
        vertical: VerticalMotion::Gravity,
        jump_impulse: None,
        collision: Collision::Land,
    }
}

fn climbing(velocity: f32) -> Motion {
    Motion {
        horizontal: HorizontalMotion::Constant(0.0),
        vertical: VerticalMotion::Climb(velocity),
        jump_impulse: None,
        collision: Collision::Land,
    }
}

const FLAT: [&str; 4] = ["          ", "          ", " P        ", "XXXXXXXXXX"];

const LADDER: [&str; 6] = [
    "          ",
    "          ",
    " P        ",
    "XXHXXXXXXX",
    "  H       ",
    "XXXXXXXXXX",
];

#[test]
fn resting_body_is_unchanged_after_a_tick() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(101.25, 81.0);
    body.on_ground = true;

    let resolution = physics.resolve(&body, &walking(0.0), &tower);

    assert_eq!(resolution.body.position, body.position);
    assert_eq!(resolution.body.velocity, Vec2::ZERO);
    assert!(resolution.body.on_ground);
    assert!(!resolution.landed);
    assert!(resolution.body.alive);
}

#[test]
fn jump_rises_then_falls_monotonically_until_landing() {
    let tower = tower(&[
        "          ",
        "          ",
        "          ",
        "          ",
        "          ",
        "          ",
        " P        ",
        "XXXXXXXXXX",
    ]);
    let tuning = Tuning::default();
    let physics = Physics::new(&tuning);
    let mut body = player_body(101.25, 189.0);
    body.on_ground = true;

    let mut jump = walking(0.0);
    jump.jump_impulse = Some(tuning.impulse_units());
    body = physics.resolve(&body, &jump, &tower).body;
    assert!(!body.on_ground);
    assert!((body.velocity.y - (-tuning.impulse_units() + tuning.gravity_units() * tuning.dt())).abs() < 1e-3);

    let mut previous = body.velocity.y;
    let mut landed = false;
    for _ in 0..240 {
        let resolution = physics.resolve(&body, &walking(0.0), &tower);
        body = resolution.body;
        if body.on_ground {
            landed = resolution.landed;
            break;
        }
        assert!(body.velocity.y > previous, "vertical velocity must keep increasing");
        previous = body.velocity.y;
    }

    assert!(landed);
    assert_eq!(body.bottom(), 189.0);
    assert_eq!(body.velocity.y, 0.0);
}

#[test]
fn fast_falls_never_tunnel_through_a_surface() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(101.25, 54.0);
    body.position.y = -20.0;
    body.velocity.y = 10_000.0;

    for _ in 0..60 {
        body = physics.resolve(&body, &walking(0.0), &tower).body;
        if body.on_ground {
            break;
        }
    }

    assert!(body.on_ground);
    assert_eq!(body.bottom(), 81.0);
}

#[test]
fn friction_stops_without_overshooting() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(101.25, 81.0);
    body.on_ground = true;
    body.velocity.x = 10.0;

    let resolution = physics.resolve(&body, &walking(0.0), &tower);
    assert_eq!(resolution.body.velocity.x, 0.0);

    body.velocity.x = -10.0;
    let resolution = physics.resolve(&body, &walking(0.0), &tower);
    assert_eq!(resolution.body.velocity.x, 0.0);
}

#[test]
fn acceleration_is_capped_at_max_speed() {
    let tower = tower(&FLAT);
    let tuning = Tuning::default();
    let physics = Physics::new(&tuning);
    let mut body = player_body(101.25, 81.0);
    body.on_ground = true;

    for _ in 0..60 {
        body = physics
            .resolve(&body, &walking(tuning.accel_units()), &tower)
            .body;
    }

    assert_eq!(body.velocity.x, tuning.max_dx_units());
}

#[test]
fn tower_sides_report_wall_contacts() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(2.0, 81.0);
    body.on_ground = true;

    let mut push = walking(0.0);
    push.horizontal = HorizontalMotion::Constant(-600.0);
    let resolution = physics.resolve(&body, &push, &tower);
    assert_eq!(resolution.wall, Some(Facing::Left));
    assert_eq!(resolution.body.position.x, 0.0);
    assert_eq!(resolution.body.velocity.x, 0.0);

    body.position.x = tower.width() - body.size.x - 2.0;
    push.horizontal = HorizontalMotion::Constant(600.0);
    let resolution = physics.resolve(&body, &push, &tower);
    assert_eq!(resolution.wall, Some(Facing::Right));
    assert_eq!(resolution.body.position.x, tower.width() - body.size.x);
}

#[test]
fn rising_past_the_top_row_is_clipped() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(101.25, 56.0);
    body.velocity.y = -400.0;

    let resolution = physics.resolve(&body, &walking(0.0), &tower);

    assert!(resolution.ceiling);
    assert_eq!(resolution.body.position.y, 0.0);
    assert_eq!(resolution.body.velocity.y, 0.0);
}

#[test]
fn falling_below_the_tower_kills_the_body() {
    let tower = tower(&["P   ", "    "]);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(20.25, 54.0);

    for _ in 0..120 {
        body = physics.resolve(&body, &walking(0.0), &tower).body;
        if !body.alive {
            break;
        }
    }

    assert!(!body.alive);
    assert!(body.position.y >= tower.height());
}

#[test]
fn ladder_top_is_a_surface_unless_climbing() {
    let tower = tower(&LADDER);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(182.25, 81.0);
    body.on_ground = true;

    let standing = physics.resolve(&body, &walking(0.0), &tower);
    assert!(standing.body.on_ground);
    assert!(standing.body.ladder_underfoot);
    assert!(!standing.body.on_ladder);

    let climb = Tuning::default().climb_units();
    let descending = physics.resolve(&standing.body, &climbing(climb), &tower);
    assert!(!descending.body.on_ground);
    assert!(descending.body.on_ladder);
    assert!(descending.body.position.y > standing.body.position.y);
}

#[test]
fn climbing_down_onto_ground_lands() {
    let tower = tower(&LADDER);
    let physics = Physics::new(&Tuning::default());
    let climb = Tuning::default().climb_units();
    let mut body = player_body(182.25, 90.0);

    for _ in 0..120 {
        body = physics.resolve(&body, &climbing(climb), &tower).body;
        if body.on_ground {
            break;
        }
    }

    assert!(body.on_ground);
    assert_eq!(body.bottom(), 135.0);
}

#[test]
fn holding_still_on_a_ladder_ignores_gravity() {
    let tower = tower(&LADDER);
    let physics = Physics::new(&Tuning::default());
    let body = player_body(182.25, 100.0);

    let resolution = physics.resolve(&body, &climbing(0.0), &tower);

    assert_eq!(resolution.body.velocity.y, 0.0);
    assert_eq!(resolution.body.position, body.position);
    assert!(resolution.body.on_ladder);
    assert_eq!(physics.ladder_column(&resolution.body, &tower), Some(2));
}

#[test]
fn bouncing_bodies_stop_at_ground_from_above() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let size = Vec2::splat(40.5);
    let mut body = Body::new(Vec2::new(101.25, 81.0 - size.y - 1.0), size, Facing::Down);
    body.velocity.y = 108.0;

    let motion = Motion {
        horizontal: HorizontalMotion::Constant(0.0),
        vertical: VerticalMotion::Constant(108.0),
        jump_impulse: None,
        collision: Collision::Bounce,
    };
    let resolution = physics.resolve(&body, &motion, &tower);

    assert!(resolution.landed);
    assert_eq!(resolution.body.bottom(), 81.0);
    assert_eq!(resolution.body.velocity.y, 0.0);
    assert!(!resolution.body.on_ground);
}

#[test]
fn ghosts_ignore_surfaces() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let size = Vec2::new(40.5, 27.0);
    let body = Body::new(Vec2::new(101.25, 80.0 - size.y), size, Facing::Left);

    let motion = Motion {
        horizontal: HorizontalMotion::Constant(-216.0),
        vertical: VerticalMotion::Constant(108.0),
        jump_impulse: None,
        collision: Collision::Ghost,
    };
    let resolution = physics.resolve(&body, &motion, &tower);

    assert!(!resolution.landed);
    assert!(resolution.body.bottom() > 81.0);
    assert!((resolution.body.position.x - (101.25 - 3.6)).abs() < 1e-3);
}

#[test]
fn non_finite_bodies_are_left_untouched() {
    let tower = tower(&FLAT);
    let physics = Physics::new(&Tuning::default());
    let mut body = player_body(101.25, 81.0);
    body.velocity.x = f32::INFINITY;

    let resolution = physics.resolve(&body, &walking(0.0), &tower);

    assert_eq!(resolution.body.position, body.position);
    assert!(!resolution.landed);
}
