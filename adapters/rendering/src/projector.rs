//! Projection of simulation snapshots into viewport space.

use tower_platformer_core::{Aabb, CellCoord, FrameSnapshot, Pose, Role, Viewport};
use tower_platformer_world::Tower;

use crate::{
    sprites::pose_animation, Hud, RenderingError, Scene, SceneCoin, SceneEntity, SceneTile,
    SpriteFrame, TileKind,
};

/// Maps frame snapshots and tower geometry onto drawable scene content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projector {
    simulation_fps: u32,
}

impl Projector {
    /// Creates a projector for a simulation ticking `simulation_fps` times per second.
    pub fn new(simulation_fps: u32) -> Result<Self, RenderingError> {
        if simulation_fps == 0 {
            return Err(RenderingError::ZeroSimulationRate);
        }
        Ok(Self { simulation_fps })
    }

    /// Builds the scene visible through the frame's viewport.
    ///
    /// Everything that lies entirely outside the viewport is culled.
    #[must_use]
    pub fn project(&self, tower: &Tower, frame: &FrameSnapshot) -> Scene {
        let viewport = frame.viewport;
        let visible = viewport.bounds();

        let mut tiles = Vec::new();
        let mut coins = Vec::new();
        let min = viewport.origin;
        let max = visible.max();
        if let (Some((first_column, last_column)), Some((first_row, last_row))) = (
            tower.columns_between(min.x, max.x),
            tower.rows_between(min.y, max.y),
        ) {
            for row in first_row..=last_row {
                for column in first_column..=last_column {
                    let cell = CellCoord::new(column, row);
                    let kind = if tower.is_ground(cell) {
                        Some(TileKind::Ground)
                    } else if tower.is_ladder(cell) {
                        Some(TileKind::Ladder)
                    } else {
                        None
                    };
                    let bounds = tower.cell_bounds(cell);
                    if let Some(kind) = kind.filter(|_| bounds.overlaps(&visible)) {
                        tiles.push(SceneTile {
                            kind,
                            cell,
                            bounds: to_view(bounds, &viewport),
                        });
                    }
                }
            }
        }
        for cell in tower.coins() {
            let bounds = tower.coin_bounds(cell);
            if bounds.overlaps(&visible) {
                coins.push(SceneCoin {
                    cell,
                    bounds: to_view(bounds, &viewport),
                });
            }
        }

        let entities = frame
            .entities
            .iter()
            .filter(|entity| entity.bounds.overlaps(&visible))
            .filter_map(|entity| {
                let archetype = match entity.role {
                    Role::Player => None,
                    Role::Monster(archetype) => Some(archetype),
                };
                let animation = pose_animation(entity.pose, archetype, entity.facing)?;
                let index = if entity.pose == Pose::Dying {
                    0
                } else {
                    animation.frame_at(frame.tick, self.simulation_fps)
                };
                Some(SceneEntity {
                    role: entity.role,
                    monster: entity.monster,
                    bounds: to_view(entity.bounds, &viewport),
                    sprite: SpriteFrame { animation, index },
                    pose: entity.pose,
                })
            })
            .collect();

        Scene {
            size: viewport.size,
            tiles,
            coins,
            entities,
            hud: Hud {
                tick: frame.tick,
                game_state: frame.game_state,
                score: frame.score,
                coins: frame.coins,
                coins_remaining: frame.coins_remaining,
            },
        }
    }
}

fn to_view(bounds: Aabb, viewport: &Viewport) -> Aabb {
    Aabb::new(viewport.to_view(bounds.min()), bounds.size())
}
