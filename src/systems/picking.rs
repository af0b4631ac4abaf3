//! Pointer picking against pack volumes.
//!
//! Each frame the pointer ray is tested against every pack's oriented box at
//! its current pose; the nearest hit is the hovered pack. Hover changes are
//! forwarded to the packs as enter/leave requests, and a click on a pack
//! triggers [`PackClicked`]. While the pool's interaction lock is held no pack
//! counts as hovered, so the pack under the pointer is entered once it clears.

use bevy_ecs::prelude::*;

use crate::components::interaction::PackInteraction;
use crate::components::packinstance::PackInstance;
use crate::events::pack::{PackClicked, ResetAllPacks};
use crate::geometry::Ray;
use crate::resources::packpool::PackPool;
use crate::resources::pointer::PointerState;

/// Nearest pack hit by `ray`.
pub fn nearest_hit<'a>(
    ray: &Ray,
    packs: impl Iterator<Item = (Entity, &'a PackInstance, &'a PackInteraction)>,
) -> Option<Entity> {
    packs
        .filter_map(|(entity, instance, interaction)| {
            instance
                .bounds(interaction)
                .intersect(ray)
                .map(|t| (entity, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

pub fn pick_packs(
    mut pointer: ResMut<PointerState>,
    pool: Res<PackPool>,
    mut query: Query<(Entity, &PackInstance, &mut PackInteraction)>,
    mut commands: Commands,
) {
    let hit = pointer
        .ray
        .and_then(|ray| nearest_hit(&ray, query.iter()));
    let hovered = hit.filter(|_| !pool.interaction_locked);

    if pointer.hovered != hovered {
        if let Some(previous) = pointer.hovered
            && let Ok((_, _, mut pack)) = query.get_mut(previous)
        {
            pack.pointer_leave();
        }
        if let Some(current) = hovered
            && let Ok((_, _, mut pack)) = query.get_mut(current)
        {
            pack.pointer_enter();
        }
        pointer.hovered = hovered;
    }

    if let Some(entity) = hit
        && pointer.just_clicked
    {
        pointer.just_clicked = false;
        commands.trigger(PackClicked { entity });
    }
}

/// Back key resets every pack.
pub fn reset_on_back(mut pointer: ResMut<PointerState>, mut commands: Commands) {
    if std::mem::take(&mut pointer.back_pressed) {
        commands.trigger(ResetAllPacks {});
    }
}
