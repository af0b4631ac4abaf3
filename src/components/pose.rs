//! Position, orientation and scale of a pack, with per-frame easing.

use cgmath::{InnerSpace, MetricSpace, One, Vector3, VectorSpace};

use crate::geometry::{Quat, Vec3, quat_angle, slerp_shortest};

/// Where a pack is (or should be) in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Default for AnimationPose {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            orientation: Quat::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl AnimationPose {
    pub fn new(position: Vec3, orientation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
            scale,
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Same pose with the scale multiplied by `factor`.
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }

    /// Move a fraction `rate` of the remaining way towards `target`.
    ///
    /// Position and scale are lerped, orientation is slerped along the
    /// shorter arc.
    pub fn step_toward(&mut self, target: &AnimationPose, rate: f32) {
        self.position = self.position.lerp(target.position, rate);
        self.scale = self.scale.lerp(target.scale, rate);
        self.orientation = slerp_shortest(self.orientation, target.orientation, rate);
    }

    /// Largest remaining difference: position, scale and rotation angle (radians).
    pub fn difference(&self, target: &AnimationPose) -> f32 {
        self.position
            .distance(target.position)
            .max(self.scale.distance(target.scale))
            .max(quat_angle(self.orientation, target.orientation))
    }

    pub fn converged(&self, target: &AnimationPose, epsilon: f32) -> bool {
        self.difference(target) < epsilon
    }
}
