//! Debug toggle resource.
//!
//! The mere presence of this resource enables the debug overlay: pack pick
//! volumes, phases and texture status are drawn on top of the scene.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy)]
pub struct DebugMode {}
