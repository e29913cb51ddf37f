#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-size viewport that follows the player through the tower.

use glam::Vec2;
use tower_platformer_core::Viewport;
use tower_platformer_world::Tuning;

/// Camera that keeps a target centred while staying inside the tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    size: Vec2,
    smoothing: f32,
    origin: Vec2,
}

impl Camera {
    /// Creates a camera with the provided viewport size and smoothing factor.
    ///
    /// Smoothing outside `(0, 1]` falls back to `1.0`, which snaps every tick.
    #[must_use]
    pub fn new(size: Vec2, smoothing: f32) -> Self {
        let smoothing = if smoothing > 0.0 && smoothing <= 1.0 {
            smoothing
        } else {
            1.0
        };
        Self {
            size,
            smoothing,
            origin: Vec2::ZERO,
        }
    }

    /// Creates a camera from the viewport and smoothing settings in `tuning`.
    #[must_use]
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.viewport_size(), tuning.camera_smoothing)
    }

    /// Moves toward the window centred on `target` and returns the new viewport.
    pub fn focus(&mut self, target: Vec2, tower_size: Vec2) -> Viewport {
        let desired = clamp_origin(target - self.size * 0.5, self.size, tower_size);
        let origin = self.origin + (desired - self.origin) * self.smoothing;
        self.origin = clamp_origin(origin, self.size, tower_size);
        self.viewport()
    }

    /// Jumps straight to the window centred on `target`, ignoring smoothing.
    pub fn snap(&mut self, target: Vec2, tower_size: Vec2) -> Viewport {
        self.origin = clamp_origin(target - self.size * 0.5, self.size, tower_size);
        self.viewport()
    }

    /// Currently visible window.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.origin, self.size)
    }
}

fn clamp_origin(desired: Vec2, size: Vec2, tower_size: Vec2) -> Vec2 {
    Vec2::new(
        clamp_axis(desired.x, size.x, tower_size.x),
        clamp_axis(desired.y, size.y, tower_size.y),
    )
}

fn clamp_axis(desired: f32, size: f32, extent: f32) -> f32 {
    if extent <= size || !desired.is_finite() {
        0.0
    } else {
        desired.clamp(0.0, extent - size)
    }
}
