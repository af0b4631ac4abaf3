//! The pool of pack instances shown side by side.
//!
//! [`PackPool`] holds one [`Entity`] handle per instance (index = instance
//! index) and the pool-wide coordination state:
//! - the selection lock, so only one pack at a time can leave the pool
//! - the interaction lock, set while the reveal overlay is mounted
//! - the bobbing switch
//! - awarded cards waiting for their pack's reveal
//!
//! The pool never touches a pack's phase directly; it requests transitions by
//! triggering [`ResetPack`].

use bevy_ecs::prelude::*;
use cgmath::Vector3;
use log::debug;
use rustc_hash::FxHashMap;

use crate::components::pose::AnimationPose;
use crate::events::pack::ResetPack;
use crate::geometry::yaw;
use crate::resources::reveal::Card;

/// Vertical spacing factor between grid rows, relative to `spacing`.
const GRID_ROW_FACTOR: f32 = 1.35;

/// How instances are arranged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoolLayout {
    /// Rows of `columns` packs, `spacing` units apart.
    Grid { columns: usize, spacing: f32 },
    /// Packs spread over an arc of `arc_degrees`, each turned towards the arc's center.
    Carousel { radius: f32, arc_degrees: f32 },
    /// A single bobbing pack.
    Daily,
}

impl Default for PoolLayout {
    fn default() -> Self {
        PoolLayout::Grid {
            columns: 3,
            spacing: 2.4,
        }
    }
}

impl PoolLayout {
    /// Build a layout from config values. Unset values use defaults.
    pub fn from_settings(
        kind: Option<&str>,
        columns: Option<usize>,
        spacing: Option<f32>,
        radius: Option<f32>,
        arc_degrees: Option<f32>,
    ) -> Result<Self, String> {
        match kind.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            None | Some("grid") => Ok(PoolLayout::Grid {
                columns: columns.unwrap_or(3).max(1),
                spacing: spacing.unwrap_or(2.4),
            }),
            Some("carousel") => Ok(PoolLayout::Carousel {
                radius: radius.unwrap_or(7.0),
                arc_degrees: arc_degrees.unwrap_or(120.0),
            }),
            Some("daily") => Ok(PoolLayout::Daily),
            Some(other) => Err(format!("Unknown pool layout '{}'", other)),
        }
    }

    pub fn parse(name: &str) -> Result<Self, String> {
        Self::from_settings(Some(name), None, None, None, None)
    }

    /// Bobbing starts on only for the single daily pack.
    pub fn bobbing_enabled(&self) -> bool {
        matches!(self, PoolLayout::Daily)
    }

    /// How many of `available` sets the layout shows.
    pub fn instance_count(&self, available: usize) -> usize {
        match self {
            PoolLayout::Daily => available.min(1),
            _ => available,
        }
    }

    /// Original pose of each of `count` instances.
    pub fn poses(&self, count: usize) -> Vec<AnimationPose> {
        match *self {
            PoolLayout::Grid { columns, spacing } => {
                let columns = columns.max(1);
                let rows = count.div_ceil(columns);
                (0..count)
                    .map(|i| {
                        let row = i / columns;
                        let col = i % columns;
                        let in_row = (count - row * columns).min(columns);
                        let x = (col as f32 - (in_row as f32 - 1.0) * 0.5) * spacing;
                        let y =
                            ((rows as f32 - 1.0) * 0.5 - row as f32) * spacing * GRID_ROW_FACTOR;
                        AnimationPose::at(Vector3::new(x, y, 0.0))
                    })
                    .collect()
            }
            PoolLayout::Carousel {
                radius,
                arc_degrees,
            } => {
                let step = if count > 1 {
                    arc_degrees / (count as f32 - 1.0)
                } else {
                    0.0
                };
                (0..count)
                    .map(|i| {
                        let degrees = -arc_degrees * 0.5 + step * i as f32;
                        let a = if count > 1 { degrees.to_radians() } else { 0.0 };
                        let position =
                            Vector3::new(radius * a.sin(), 0.0, -radius * (1.0 - a.cos()));
                        AnimationPose::at(position).with_orientation(yaw(-a.to_degrees()))
                    })
                    .collect()
            }
            PoolLayout::Daily => (0..count.min(1))
                .map(|_| AnimationPose::at(Vector3::new(0.0, 0.0, 0.0)))
                .collect(),
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PackPool {
    instances: Vec<Entity>,
    /// Pack holding the selection lock.
    active: Option<Entity>,
    /// Set while the reveal overlay is mounted; blocks every click on packs.
    pub interaction_locked: bool,
    pending_awards: FxHashMap<Entity, Vec<Card>>,
    pub layout: PoolLayout,
}

impl PackPool {
    pub fn new(layout: PoolLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    /// Append an instance and return its index.
    pub fn register(&mut self, entity: Entity) -> usize {
        self.instances.push(entity);
        self.instances.len() - 1
    }

    pub fn handle(&self, index: usize) -> Option<Entity> {
        self.instances.get(index).copied()
    }

    pub fn instances(&self) -> &[Entity] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn active(&self) -> Option<Entity> {
        self.active
    }

    /// Take the selection lock. Refused while another pack holds it.
    pub fn try_claim(&mut self, entity: Entity) -> bool {
        match self.active {
            Some(holder) if holder != entity => {
                debug!("Selection lock held by {:?}; {:?} refused", holder, entity);
                false
            }
            _ => {
                self.active = Some(entity);
                true
            }
        }
    }

    /// Release the lock if `entity` holds it.
    pub fn release(&mut self, entity: Entity) {
        if self.active == Some(entity) {
            self.active = None;
        }
    }

    /// Request a reset of instance `index`. Returns `false` for an unknown index.
    pub fn reset(&self, index: usize, commands: &mut Commands) -> bool {
        match self.handle(index) {
            Some(entity) => {
                commands.trigger(ResetPack { entity });
                true
            }
            None => false,
        }
    }

    pub fn store_award(&mut self, entity: Entity, cards: Vec<Card>) {
        self.pending_awards.insert(entity, cards);
    }

    pub fn take_award(&mut self, entity: Entity) -> Option<Vec<Card>> {
        self.pending_awards.remove(&entity)
    }

    pub fn has_award(&self, entity: Entity) -> bool {
        self.pending_awards.contains_key(&entity)
    }

    /// Forget a despawned instance.
    pub fn remove(&mut self, entity: Entity) {
        self.instances.retain(|e| *e != entity);
        self.pending_awards.remove(&entity);
        self.release(entity);
    }
}
