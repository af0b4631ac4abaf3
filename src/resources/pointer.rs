//! Per-frame pointer state.
//!
//! Written by the input system from raylib and read by picking and the reveal
//! overlay. Tests drive the same fields directly.

use bevy_ecs::prelude::*;

use crate::geometry::Ray;

#[derive(Resource, Debug, Clone, Default)]
pub struct PointerState {
    /// Window-space position, origin top-left.
    pub x: f32,
    pub y: f32,
    /// World-space ray under the pointer, if the window has a size.
    pub ray: Option<Ray>,
    /// Primary button went down this frame. Consumers clear it once handled.
    pub just_clicked: bool,
    /// Back key went down this frame.
    pub back_pressed: bool,
    /// Pack currently under the pointer.
    pub hovered: Option<Entity>,
}

impl PointerState {
    /// Take the click, returning whether there was one.
    pub fn consume_click(&mut self) -> bool {
        std::mem::take(&mut self.just_clicked)
    }
}
