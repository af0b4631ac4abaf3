//! 3D math helpers shared by picking and the interaction state machine.
//!
//! Everything here works on `cgmath` `f32` types. Orientations are unit
//! quaternions; comparisons between orientations use the rotation angle of
//! their relative rotation, so `q` and `-q` compare equal.

use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Quat = Quaternion<f32>;

/// Half-line used for pointer picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` for a zero-length direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        if direction.magnitude2() < 1e-12 {
            return None;
        }
        Some(Self {
            origin,
            direction: direction.normalize(),
        })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Oriented box: a unit cube scaled by `half_extents`, rotated and moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub orientation: Quat,
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Distance along the ray to the first hit, if any.
    ///
    /// The ray is moved into box space and tested slab by slab. A ray starting
    /// inside the box hits at `t = 0`.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inv = self.orientation.conjugate();
        let origin = inv * (ray.origin - self.center);
        let dir = inv * ray.direction;

        let mut t_near = 0.0f32;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let (o, d, h) = (origin[axis], dir[axis], self.half_extents[axis]);
            if d.abs() < 1e-8 {
                if o < -h || o > h {
                    return None;
                }
                continue;
            }
            let mut t0 = (-h - o) / d;
            let mut t1 = (h - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_far < t_near {
                return None;
            }
        }
        Some(t_near)
    }
}

/// Angle in radians of the rotation taking `a` to `b`.
pub fn quat_angle(a: Quat, b: Quat) -> f32 {
    let dot = a.normalize().dot(b.normalize()).abs().min(1.0);
    2.0 * dot.acos()
}

/// Spherical interpolation along the shorter arc.
pub fn slerp_shortest(from: Quat, to: Quat, t: f32) -> Quat {
    let to = if from.dot(to) < 0.0 { -to } else { to };
    from.slerp(to, t).normalize()
}

/// Axis and angle (degrees) for renderers that take axis-angle rotations.
/// The identity maps to `(+Y, 0°)`.
pub fn axis_angle_degrees(q: Quat) -> (Vec3, f32) {
    let q = q.normalize();
    let q = if q.s < 0.0 { -q } else { q };
    let half = q.s.clamp(-1.0, 1.0).acos();
    let sin_half = half.sin();
    if sin_half.abs() < 1e-6 {
        return (Vector3::unit_y(), 0.0);
    }
    (q.v / sin_half, (half * 2.0).to_degrees())
}

/// Orientation that turns a pack at `position` so its cover faces
/// `camera_position`.
///
/// The cover normal is +Z in model space. `base` is the pack's resting
/// orientation; the result is the shortest turn from there, so the pack
/// keeps its roll.
pub fn face_camera(position: Vec3, camera_position: Vec3, base: Quat) -> Quat {
    let to_camera = camera_position - position;
    if to_camera.magnitude2() < 1e-12 {
        return base;
    }
    let cover_normal = base * Vector3::unit_z();
    let turn = Quaternion::from_arc(
        cover_normal.normalize(),
        to_camera.normalize(),
        Some(Vector3::unit_y()),
    );
    (turn * base).normalize()
}

/// Rotation of `degrees` about +Y.
pub fn yaw(degrees: f32) -> Quat {
    Quaternion::from_angle_y(Deg(degrees))
}
