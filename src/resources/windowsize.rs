//! Window size resource.
//!
//! Tracks the window dimensions in pixels. Updated each frame by the host to
//! handle resizing; pointer rays are computed against it.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub w: i32,
    pub h: i32,
}

impl WindowSize {
    pub fn aspect(&self) -> f32 {
        if self.h <= 0 {
            1.0
        } else {
            self.w as f32 / self.h as f32
        }
    }
}
