//! Perspective camera looking at the pack pool.
//!
//! The renderer builds its raylib camera from this resource, and picking casts
//! rays through it, so both always agree on the projection.

use bevy_ecs::prelude::Resource;
use cgmath::{InnerSpace, Vector3};

use crate::geometry::{Ray, Vec3};

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 12.0),
            target: Vector3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            fovy: 45.0,
        }
    }
}

impl SceneCamera {
    pub fn forward(&self) -> Vec3 {
        let dir = self.target - self.position;
        if dir.magnitude2() < 1e-12 {
            -Vector3::unit_z()
        } else {
            dir.normalize()
        }
    }

    /// Camera basis `(right, up)` orthogonal to [`forward`](Self::forward).
    fn basis(&self) -> (Vec3, Vec3) {
        let forward = self.forward();
        let mut right = forward.cross(self.up);
        if right.magnitude2() < 1e-12 {
            right = forward.cross(Vector3::unit_z());
        }
        let right = right.normalize();
        (right, right.cross(forward))
    }

    /// Point `distance` units in front of the camera.
    pub fn focus_point(&self, distance: f32) -> Vec3 {
        self.position + self.forward() * distance
    }

    /// Ray through window pixel `(x, y)`, origin top-left.
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Ray> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height;
        let tan_half = (self.fovy.to_radians() * 0.5).tan();
        let aspect = width / height;
        let (right, up) = self.basis();
        let dir = self.forward() + right * (ndc_x * tan_half * aspect) + up * (ndc_y * tan_half);
        Ray::new(self.position, dir)
    }
}
