//! Pool reducer: reacts to pack lifecycle messages.
//!
//! - `ResetComplete` releases the selection lock.
//! - `OverlayVisibilityChanged { visible: true }` mounts the
//!   [`RevealOverlay`] with the pack's awarded cards and locks interaction.
//! - `OverlayVisibilityChanged { visible: false }` unlocks interaction.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::packinstance::PackInstance;
use crate::events::pack::PackEvent;
use crate::resources::packpool::PackPool;
use crate::resources::reveal::RevealOverlay;

pub fn pool_event_system(
    mut reader: MessageReader<PackEvent>,
    mut pool: ResMut<PackPool>,
    mut commands: Commands,
) {
    for event in reader.read() {
        match *event {
            PackEvent::SelectionStarted { entity } => {
                debug!("Pool: {:?} holds the selection lock", entity);
            }
            PackEvent::ResetComplete { entity } => {
                pool.release(entity);
            }
            PackEvent::OverlayVisibilityChanged {
                entity,
                visible: true,
            } => {
                let cards = pool.take_award(entity).unwrap_or_default();
                info!("Revealing {} card(s) from {:?}", cards.len(), entity);
                pool.interaction_locked = true;
                commands.insert_resource(RevealOverlay::new(entity, cards));
            }
            PackEvent::OverlayVisibilityChanged { visible: false, .. } => {
                pool.interaction_locked = false;
            }
            PackEvent::OpenRequested { .. } | PackEvent::AnimationComplete { .. } => {}
        }
    }
}

/// Drop despawned packs from the pool.
pub fn prune_despawned_packs(
    mut removed: RemovedComponents<PackInstance>,
    mut pool: ResMut<PackPool>,
) {
    for entity in removed.read() {
        pool.remove(entity);
    }
}
