#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower platformer engine.
//!
//! This crate defines the message surface that connects the game loop, the
//! authoritative world, and the pure systems. Systems read immutable
//! snapshots of the world and answer with [`Command`] values describing the
//! mutations they want; the world executes those commands via its `apply`
//! entry point and broadcasts [`Event`] values that the surrounding UI and
//! audio layers react to.
//!
//! Positions are expressed in world units with the origin at the top-left
//! corner of the tower. The x axis grows to the right and the y axis grows
//! downward, matching row indices that increase toward the bottom.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Tower.";

/// Logical directions that the input collector reports as held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    Right,
    /// Toward decreasing y (up the tower).
    Up,
    /// Toward increasing y (down the tower).
    Down,
}

/// Direction an entity is visually facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// No particular direction, typically the idle front-facing pose.
    #[default]
    None,
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    Right,
    /// Facing up the tower.
    Up,
    /// Facing down the tower.
    Down,
}

impl Facing {
    /// Converts a held direction into the matching facing.
    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }

    /// Returns the facing pointing the other way along the same axis.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Unit vector pointing along the facing, zero for [`Facing::None`].
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::None => Vec2::ZERO,
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
        }
    }
}

/// Abstract input sampled by an external collector once per tick.
///
/// The core never mutates an input state; it only reads the held directions
/// and the edge-triggered jump flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    jump: bool,
}

impl InputState {
    /// Input with nothing held and no jump requested.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            left: false,
            right: false,
            up: false,
            down: false,
            jump: false,
        }
    }

    /// Returns a copy of the input with the provided direction held.
    #[must_use]
    pub const fn holding(mut self, direction: Direction) -> Self {
        match direction {
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
            Direction::Up => self.up = true,
            Direction::Down => self.down = true,
        }
        self
    }

    /// Returns a copy of the input with the jump edge set.
    #[must_use]
    pub const fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Returns a copy of the input with the jump edge cleared.
    #[must_use]
    pub const fn without_jump(mut self) -> Self {
        self.jump = false;
        self
    }

    /// Reports whether the provided direction is currently held.
    #[must_use]
    pub const fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// Reports whether jump was pressed during this tick.
    #[must_use]
    pub const fn jump_pressed(&self) -> bool {
        self.jump
    }

    /// Horizontal intent in `-1.0..=1.0`; opposing keys cancel out.
    #[must_use]
    pub fn horizontal_axis(&self) -> f32 {
        axis(self.left, self.right)
    }

    /// Vertical intent in `-1.0..=1.0` where negative values point up the tower.
    #[must_use]
    pub fn vertical_axis(&self) -> f32 {
        axis(self.up, self.down)
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Axis along which a monster archetype is allowed to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementAxis {
    /// Movement restricted to the x axis.
    Horizontal,
    /// Movement restricted to the y axis.
    Vertical,
}

/// Behavioural class of a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Archetype {
    /// Vertical oscillator bounded by a patrol band.
    Block,
    /// Horizontal flyer that ignores gravity and ground.
    Fly,
    /// Ground-bound horizontal walker.
    Slime,
    /// Slower ground-bound horizontal walker.
    Snail,
}

impl Archetype {
    /// Every archetype in declaration order.
    pub const ALL: [Self; 4] = [Self::Block, Self::Fly, Self::Slime, Self::Snail];

    /// Axis the archetype moves along.
    #[must_use]
    pub const fn axis(self) -> MovementAxis {
        match self {
            Self::Block => MovementAxis::Vertical,
            Self::Fly | Self::Slime | Self::Snail => MovementAxis::Horizontal,
        }
    }

    /// Whether the archetype is subject to gravity and ground collision.
    #[must_use]
    pub const fn is_grounded(self) -> bool {
        matches!(self, Self::Slime | Self::Snail)
    }

    /// Heading the archetype takes when it spawns.
    #[must_use]
    pub const fn initial_heading(self) -> Facing {
        match self {
            Self::Block => Facing::Up,
            Self::Fly | Self::Snail => Facing::Left,
            Self::Slime => Facing::Right,
        }
    }

    /// Travel speed expressed in meters per second.
    #[must_use]
    pub const fn speed_in_meters(self) -> f32 {
        match self {
            Self::Block | Self::Slime => 4.0,
            Self::Fly => 8.0,
            Self::Snail => 2.0,
        }
    }

    /// Bounding box size expressed in meters.
    #[must_use]
    pub const fn size_in_meters(self) -> Vec2 {
        match self {
            Self::Block => Vec2::new(1.5, 1.5),
            Self::Fly | Self::Slime | Self::Snail => Vec2::new(1.5, 1.0),
        }
    }

    /// Character used for the archetype in tower maps.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Block => 'B',
            Self::Fly => 'F',
            Self::Slime => 'S',
            Self::Snail => 'N',
        }
    }

    /// Parses a tower map character into an archetype.
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|archetype| archetype.glyph() == glyph)
    }
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour state of the player avatar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Resting on a surface.
    #[default]
    Standing,
    /// Moving along a surface.
    Walking,
    /// Airborne and rising.
    Jumping,
    /// Airborne and descending.
    Falling,
    /// Attached to a ladder.
    Climbing,
    /// Knocked back and invulnerable after touching a monster.
    Hurt,
}

/// Lifecycle state of the game loop driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Waiting for a valid level and for assets to become available.
    #[default]
    Loading,
    /// Ticking at the fixed rate.
    Running,
    /// Ticking suspended by an external signal.
    Paused,
    /// Terminal state for the current level instance.
    GameOver,
}

/// Reason the player's run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// The player dropped below the bottom row of the tower.
    Fell,
    /// The player took the configured number of lethal hits.
    Defeated,
}

/// Location of a single tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile, counted from the top of the tower.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Inclusive range of columns within a single row.
///
/// Serialised as a two element array `[first, last]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct ColumnSpan {
    first: u32,
    last: u32,
}

impl ColumnSpan {
    /// Creates a span covering `first..=last`.
    #[must_use]
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Span covering a single column.
    #[must_use]
    pub const fn single(column: u32) -> Self {
        Self::new(column, column)
    }

    /// First column covered by the span.
    #[must_use]
    pub const fn first(&self) -> u32 {
        self.first
    }

    /// Last column covered by the span.
    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }

    /// Reports whether the column lies within the span.
    #[must_use]
    pub const fn contains(&self, column: u32) -> bool {
        column >= self.first && column <= self.last
    }

    /// Reports whether the span is ordered and fits inside `columns`.
    #[must_use]
    pub const fn fits_within(&self, columns: u32) -> bool {
        self.first <= self.last && self.last < columns
    }
}

impl From<(u32, u32)> for ColumnSpan {
    fn from((first, last): (u32, u32)) -> Self {
        Self::new(first, last)
    }
}

impl From<ColumnSpan> for (u32, u32) {
    fn from(span: ColumnSpan) -> Self {
        (span.first, span.last)
    }
}

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Vec2,
    size: Vec2,
}

impl Aabb {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Bottom-right corner of the rectangle.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Dimensions of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Reports whether the rectangles share interior area. Touching edges do
    /// not count as an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.y < b_max.y && other.min.y < a_max.y
    }
}

/// Physical state shared by the player and every monster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Width and height in world units.
    pub size: Vec2,
    /// Direction the entity faces.
    pub facing: Facing,
    /// Whether the entity rests on a surface.
    pub on_ground: bool,
    /// Whether the entity overlaps a climbable ladder.
    pub on_ladder: bool,
    /// Whether the entity stands on the top rung of a ladder.
    pub ladder_underfoot: bool,
    /// Whether the entity is still part of the simulation.
    pub alive: bool,
}

impl Body {
    /// Creates a resting, living body at the provided position.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2, facing: Facing) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            facing,
            on_ground: false,
            on_ladder: false,
            ladder_underfoot: false,
            alive: true,
        }
    }

    /// Bounding box occupied by the body.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    /// Centre of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Reports whether position and velocity are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Inclusive range of allowed top-left coordinates along a monster's axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    min: f32,
    max: f32,
}

impl Patrol {
    /// Creates a patrol range, swapping the bounds when they arrive inverted.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Smallest coordinate the monster may reach.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Largest coordinate the monster may reach.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Physical state of the avatar.
    pub body: Body,
    /// Behaviour state of the avatar.
    pub state: PlayerState,
    /// Tick at which the invulnerability window closes, if hurt.
    pub hurt_until: Option<u64>,
    /// Remaining grace ticks during which a jump is accepted mid-air.
    pub jump_buffer: u32,
    /// Number of coins collected so far.
    pub coins: u32,
    /// Accumulated score.
    pub score: u32,
    /// Number of monster hits taken.
    pub hits: u32,
}

impl PlayerSnapshot {
    /// Reports whether the player is inside the invulnerability window at `tick`.
    #[must_use]
    pub fn is_hurt(&self, tick: u64) -> bool {
        self.hurt_until.map_or(false, |until| tick < until)
    }
}

/// Immutable representation of a single monster used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Identifier allocated at spawn.
    pub id: MonsterId,
    /// Behavioural class of the monster.
    pub archetype: Archetype,
    /// Physical state of the monster.
    pub body: Body,
    /// Direction the monster is currently travelling.
    pub heading: Facing,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Allowed range of top-left coordinates along the archetype's axis.
    pub patrol: Patrol,
    /// Tick at which a stomped monster is removed.
    pub dying_until: Option<u64>,
}

impl MonsterSnapshot {
    /// Reports whether the monster was stomped and is waiting for removal.
    #[must_use]
    pub const fn is_dying(&self) -> bool {
        self.dying_until.is_some()
    }
}

/// Read-only snapshot describing every monster in the tower.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of monsters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no monsters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Visible window of the tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Top-left corner in world units.
    pub origin: Vec2,
    /// Width and height in world units.
    pub size: Vec2,
}

impl Viewport {
    /// Creates a viewport from its origin and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle covered by the viewport.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        Aabb::new(self.origin, self.size)
    }

    /// Converts a world position into viewport-relative coordinates.
    #[must_use]
    pub fn to_view(&self, world: Vec2) -> Vec2 {
        world - self.origin
    }
}

/// Role tag that lets presentation layers pick a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The player avatar.
    Player,
    /// A monster of the given archetype.
    Monster(Archetype),
}

/// Animation-relevant state reported for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    /// Player behaviour state.
    Player(PlayerState),
    /// Monster travelling normally.
    Moving,
    /// Monster stomped and about to be removed.
    Dying,
}

/// Renderable description of a single entity for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityFrame {
    /// Sprite family for the entity.
    pub role: Role,
    /// Monster identifier, absent for the player.
    pub monster: Option<MonsterId>,
    /// Bounding box in world units.
    pub bounds: Aabb,
    /// Animation-relevant state.
    pub pose: Pose,
    /// Direction the entity faces.
    pub facing: Facing,
}

/// Render snapshot emitted once per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Tick that produced the snapshot.
    pub tick: u64,
    /// Lifecycle state after the tick.
    pub game_state: GameState,
    /// Player first, then monsters in identifier order.
    pub entities: Vec<EntityFrame>,
    /// Visible window of the tower.
    pub viewport: Viewport,
    /// Accumulated score.
    pub score: u32,
    /// Coins collected so far.
    pub coins: u32,
    /// Coins still present in the tower.
    pub coins_remaining: usize,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by one fixed tick.
    Tick,
    /// Replaces the player's physical state with a resolved one.
    UpdatePlayer {
        /// Body produced by the physics resolver.
        body: Body,
        /// Behaviour state chosen by the controller.
        state: PlayerState,
        /// Remaining mid-air jump grace ticks.
        jump_buffer: u32,
    },
    /// Replaces a monster's physical state with a resolved one.
    UpdateMonster {
        /// Identifier of the monster being moved.
        monster: MonsterId,
        /// Body produced by the physics resolver.
        body: Body,
        /// Heading chosen by the monster AI.
        heading: Facing,
    },
    /// Requests collection of the coin at the provided tile.
    CollectCoin {
        /// Tile holding the coin.
        cell: CellCoord,
    },
    /// Requests that the player be hurt by the provided monster.
    HurtPlayer {
        /// Monster that touched the player.
        monster: MonsterId,
        /// Velocity applied to the player as knock-back.
        knockback: Vec2,
    },
    /// Requests that the provided monster be stomped by the player.
    StompMonster {
        /// Monster landed upon.
        monster: MonsterId,
        /// Upward speed applied to the player.
        bounce: f32,
    },
}

/// Events broadcast by the world and the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that started.
        tick: u64,
    },
    /// Announces a change of the player's behaviour state.
    PlayerStateChanged {
        /// State before the change.
        from: PlayerState,
        /// State after the change.
        to: PlayerState,
    },
    /// Confirms that a coin was collected.
    CoinCollected {
        /// Tile that held the coin.
        cell: CellCoord,
        /// Coins collected so far.
        coins: u32,
        /// Score after the collection.
        score: u32,
    },
    /// Reports that a monster hurt the player.
    PlayerHurt {
        /// Monster responsible for the hit.
        monster: MonsterId,
        /// Number of hits taken so far.
        hits: u32,
    },
    /// Reports that the player landed on a monster.
    MonsterStomped {
        /// Monster that was stomped.
        monster: MonsterId,
    },
    /// Reports that a monster left the simulation.
    MonsterRemoved {
        /// Monster that was removed.
        monster: MonsterId,
    },
    /// Reports that the player dropped below the tower.
    PlayerFell,
    /// Reports that the player took a lethal hit.
    PlayerDefeated,
    /// Announces that the game loop changed lifecycle state.
    GameStateChanged {
        /// State before the change.
        from: GameState,
        /// State after the change.
        to: GameState,
    },
    /// Announces the end of the current level instance.
    GameOver {
        /// Why the run ended.
        reason: GameOverReason,
    },
    /// Reports a body that had to be clamped back into a valid state.
    InvariantClamped {
        /// Monster whose body was clamped, absent for the player.
        monster: Option<MonsterId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel_out() {
        let input = InputState::idle()
            .holding(Direction::Left)
            .holding(Direction::Right)
            .holding(Direction::Up);

        assert_eq!(input.horizontal_axis(), 0.0);
        assert_eq!(input.vertical_axis(), -1.0);
        assert!(!input.jump_pressed());
    }

    #[test]
    fn jump_edge_can_be_cleared() {
        let input = InputState::idle().holding(Direction::Right).with_jump();
        assert!(input.jump_pressed());

        let next = input.without_jump();
        assert!(!next.jump_pressed());
        assert!(next.is_held(Direction::Right));
    }

    #[test]
    fn input_state_reads_partial_json() {
        let input: InputState = serde_json::from_str(r#"{"down": true}"#).expect("parse");
        assert_eq!(input, InputState::idle().holding(Direction::Down));
    }

    #[test]
    fn column_span_reads_pair_arrays() {
        let span: ColumnSpan = serde_json::from_str("[2, 5]").expect("parse");
        assert_eq!(span, ColumnSpan::new(2, 5));
        assert!(span.contains(2));
        assert!(span.contains(5));
        assert!(!span.contains(6));
        assert!(span.fits_within(6));
        assert!(!span.fits_within(5));
        assert!(!ColumnSpan::new(4, 1).fits_within(10));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let touching = Aabb::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let overlapping = Aabb::new(Vec2::new(9.5, 9.5), Vec2::splat(10.0));

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&overlapping));
        assert!(overlapping.overlaps(&a));
    }

    #[test]
    fn archetype_glyphs_round_trip() {
        for archetype in Archetype::ALL {
            assert_eq!(Archetype::from_glyph(archetype.glyph()), Some(archetype));
        }
        assert_eq!(Archetype::from_glyph('X'), None);
    }

    #[test]
    fn only_slime_and_snail_feel_gravity() {
        assert!(!Archetype::Block.is_grounded());
        assert!(!Archetype::Fly.is_grounded());
        assert!(Archetype::Slime.is_grounded());
        assert!(Archetype::Snail.is_grounded());
        assert!(Archetype::Snail.speed_in_meters() < Archetype::Slime.speed_in_meters());
        assert_eq!(Archetype::Block.axis(), MovementAxis::Vertical);
    }

    #[test]
    fn patrol_orders_inverted_bounds() {
        let patrol = Patrol::new(30.0, 10.0);
        assert_eq!(patrol.min(), 10.0);
        assert_eq!(patrol.max(), 30.0);
    }

    #[test]
    fn hurt_window_is_exclusive_of_expiry_tick() {
        let snapshot = PlayerSnapshot {
            body: Body::new(Vec2::ZERO, Vec2::ONE, Facing::None),
            state: PlayerState::Hurt,
            hurt_until: Some(10),
            jump_buffer: 0,
            coins: 0,
            score: 0,
            hits: 1,
        };

        assert!(snapshot.is_hurt(9));
        assert!(!snapshot.is_hurt(10));
    }
}
