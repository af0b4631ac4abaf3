//! Identity of a pack entity inside its pool.

use bevy_ecs::prelude::Component;
use cgmath::{ElementWise, Vector3};

use crate::components::interaction::PackInteraction;
use crate::geometry::{OrientedBox, Vec3};

/// Half extents of the pack model at scale 1: a thin card-sized slab.
pub fn pack_half_extents() -> Vec3 {
    Vector3::new(0.9, 1.3, 0.08)
}

/// Marks an entity as a pack of the pool.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct PackInstance {
    /// Position in the pool's instance list.
    pub index: usize,
    /// Index of the set this pack opens into, in the set manifest.
    pub set_index: usize,
    pub half_extents: Vec3,
    /// Clicks on a pack that is not clickable are ignored. Hover still works.
    pub clickable: bool,
}

impl PackInstance {
    pub fn new(index: usize, set_index: usize) -> Self {
        Self {
            index,
            set_index,
            half_extents: pack_half_extents(),
            clickable: true,
        }
    }

    /// Pick volume at the pack's current pose.
    pub fn bounds(&self, interaction: &PackInteraction) -> OrientedBox {
        let pose = interaction.pose();
        OrientedBox {
            center: pose.position,
            orientation: pose.orientation,
            half_extents: self.half_extents.mul_element_wise(pose.scale),
        }
    }

    /// Full size of the model at scale 1.
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }
}
