//! Animation tuning shared by every pack.

use bevy_ecs::prelude::Resource;

/// Per-frame easing and motion parameters of the interaction state machine.
///
/// Loaded from the `[animation]` section of the config file.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct AnimationTuning {
    /// Fraction of the remaining difference covered each frame.
    pub lerp_rate: f32,
    /// Convergence threshold for position, scale and rotation angle (radians).
    pub epsilon: f32,
    /// Spin speed while dropping, degrees per second.
    pub spin_speed: f32,
    pub hover_scale: f32,
    pub click_scale: f32,
    /// How far below the focus point the pack drops while spinning.
    pub drop_distance: f32,
    /// Distance in front of the camera where a selected pack stops.
    pub focus_distance: f32,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
    /// Re-enter `Hovered` right after a reset when the pointer is over the pack.
    pub hover_on_settle: bool,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            lerp_rate: 0.05,
            epsilon: 0.01,
            spin_speed: 360.0,
            hover_scale: 1.1,
            click_scale: 1.5,
            drop_distance: 2.5,
            focus_distance: 6.0,
            bob_amplitude: 0.08,
            bob_speed: 2.0,
            hover_on_settle: true,
        }
    }
}
