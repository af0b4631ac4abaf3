//! Reveal overlay flow.
//!
//! While a [`RevealOverlay`] is mounted every click dismisses the front card.
//! Dismissing the last card unmounts the overlay, announces it with
//! `OverlayVisibilityChanged { visible: false }` and resets the owning pack.
//! If the owner leaves `RevealShown` by other means (back key, despawn) the
//! overlay is unmounted without another reset.

use bevy_ecs::prelude::*;
use log::info;

use crate::components::interaction::{InteractionPhase, PackInteraction};
use crate::events::pack::{PackEvent, ResetPack};
use crate::resources::pointer::PointerState;
use crate::resources::reveal::RevealOverlay;

pub fn reveal_overlay_system(
    overlay: Option<ResMut<RevealOverlay>>,
    mut pointer: ResMut<PointerState>,
    packs: Query<&PackInteraction>,
    mut events: MessageWriter<PackEvent>,
    mut commands: Commands,
) {
    let Some(mut overlay) = overlay else {
        return;
    };
    let owner = overlay.owner;
    let revealing = packs
        .get(owner)
        .map(|pack| pack.phase() == InteractionPhase::RevealShown)
        .unwrap_or(false);

    if !revealing {
        commands.remove_resource::<RevealOverlay>();
        events.write(PackEvent::OverlayVisibilityChanged {
            entity: owner,
            visible: false,
        });
        return;
    }

    if pointer.consume_click() && overlay.advance() {
        info!("Reveal of {:?} finished", owner);
        commands.remove_resource::<RevealOverlay>();
        events.write(PackEvent::OverlayVisibilityChanged {
            entity: owner,
            visible: false,
        });
        commands.trigger(ResetPack { entity: owner });
    }
}
