//! Systems and observers driving the pack interaction state machines.
//!
//! Observers turn transition requests into state machine calls:
//! - [`pack_clicked_observer`] – first click selects (if the pool grants the
//!   lock), second click opens
//! - [`reset_pack_observer`] / [`reset_all_observer`] – send packs back
//! - [`cards_awarded_observer`] – hand the awarded cards to the pack
//! - [`set_bobbing_observer`] – switch idle bobbing on or off
//!
//! [`advance_pack_interactions`] steps every pack once per frame and turns
//! the returned signals into [`PackEvent`] messages.

use std::f32::consts::TAU;

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::bobbing::BobbingState;
use crate::components::interaction::{InteractionPhase, PackInteraction, PackSignal};
use crate::components::packinstance::PackInstance;
use crate::events::cards::CardsAwarded;
use crate::events::pack::{PackClicked, PackEvent, ResetAllPacks, ResetPack, SetBobbing};
use crate::resources::camera::SceneCamera;
use crate::resources::packpool::PackPool;
use crate::resources::pointer::PointerState;
use crate::resources::tuning::AnimationTuning;
use crate::resources::worldtime::WorldTime;

pub fn pack_clicked_observer(
    trigger: On<PackClicked>,
    mut pool: ResMut<PackPool>,
    camera: Res<SceneCamera>,
    tuning: Res<AnimationTuning>,
    mut query: Query<(&PackInstance, &mut PackInteraction)>,
    mut events: MessageWriter<PackEvent>,
) {
    let entity = trigger.event().entity;
    if pool.interaction_locked {
        debug!("Click on {:?} ignored while the reveal is open", entity);
        return;
    }
    let Ok((instance, mut pack)) = query.get_mut(entity) else {
        return;
    };
    if !instance.clickable {
        debug!("Click on {:?} ignored: not clickable", entity);
        return;
    }

    match pack.phase() {
        phase if phase.is_at_rest() => {
            if !pool.try_claim(entity) {
                return;
            }
            let focus = camera.focus_point(tuning.focus_distance);
            if pack.begin_selection(focus, camera.position, &tuning) {
                info!("Pack {:?} selected", entity);
                events.write(PackEvent::SelectionStarted { entity });
            } else {
                pool.release(entity);
            }
        }
        InteractionPhase::Selected => {
            if pack.open(&tuning) {
                info!("Pack {:?} opening", entity);
                events.write(PackEvent::OpenRequested { entity });
            }
        }
        _ => {}
    }
}

pub fn reset_pack_observer(trigger: On<ResetPack>, mut query: Query<&mut PackInteraction>) {
    let entity = trigger.event().entity;
    if let Ok(mut pack) = query.get_mut(entity)
        && pack.reset()
    {
        debug!("Pack {:?} resetting", entity);
    }
}

pub fn reset_all_observer(
    _trigger: On<ResetAllPacks>,
    pool: Res<PackPool>,
    mut commands: Commands,
) {
    for &entity in pool.instances() {
        commands.trigger(ResetPack { entity });
    }
}

/// Each pack switched back on gets a fresh phase so the pool does not bob in unison.
pub fn set_bobbing_observer(
    trigger: On<SetBobbing>,
    mut query: Query<(&PackInteraction, &mut BobbingState)>,
) {
    let enabled = trigger.event().enabled;
    let mut switched = 0;
    for (pack, mut bobbing) in query.iter_mut() {
        if bobbing.set_active(enabled, pack.original().position.y, fastrand::f32() * TAU) {
            switched += 1;
        }
    }
    if switched > 0 {
        info!(
            "Bobbing {} for {} pack(s)",
            if enabled { "on" } else { "off" },
            switched
        );
    }
}

/// Cards only reach packs that are being opened; late awards are dropped.
pub fn cards_awarded_observer(
    trigger: On<CardsAwarded>,
    mut pool: ResMut<PackPool>,
    mut query: Query<&mut PackInteraction>,
    mut events: MessageWriter<PackEvent>,
) {
    let award = trigger.event();
    let entity = award.entity;
    let Ok(mut pack) = query.get_mut(entity) else {
        debug!("Cards for despawned {:?} dropped", entity);
        return;
    };
    if !matches!(
        pack.phase(),
        InteractionPhase::Selected | InteractionPhase::SpinningDown | InteractionPhase::RevealShown
    ) {
        debug!("Cards for {:?} arrived in {:?}; dropped", entity, pack.phase());
        return;
    }
    pool.store_award(entity, award.cards.clone());
    if let Some(PackSignal::OverlayShown) = pack.deliver_cards() {
        events.write(PackEvent::OverlayVisibilityChanged {
            entity,
            visible: true,
        });
    }
}

/// Step every pack once and publish the resulting lifecycle messages.
pub fn advance_pack_interactions(
    time: Res<WorldTime>,
    tuning: Res<AnimationTuning>,
    pool: Res<PackPool>,
    pointer: Res<PointerState>,
    mut query: Query<(
        Entity,
        &PackInstance,
        &mut PackInteraction,
        Option<&BobbingState>,
    )>,
    mut events: MessageWriter<PackEvent>,
) {
    for (entity, instance, mut pack, bobbing) in query.iter_mut() {
        let rest_height = bobbing.and_then(|b| b.height(time.elapsed));

        for signal in pack.advance(time.delta, rest_height, &tuning) {
            match signal {
                PackSignal::AnimationComplete => {
                    events.write(PackEvent::AnimationComplete { entity });
                }
                PackSignal::OverlayShown => {
                    events.write(PackEvent::OverlayVisibilityChanged {
                        entity,
                        visible: true,
                    });
                }
                PackSignal::ResetComplete => {
                    events.write(PackEvent::ResetComplete { entity });
                    // Pointer may already rest on the pack: no enter event would follow
                    if tuning.hover_on_settle
                        && !pool.interaction_locked
                        && let Some(ray) = pointer.ray
                        && instance.bounds(&pack).intersect(&ray).is_some()
                    {
                        pack.pointer_enter();
                    }
                }
            }
        }
    }
}

/// Advance the ECS message queue for [`PackEvent`].
pub fn update_pack_messages(mut msgs: ResMut<Messages<PackEvent>>) {
    msgs.update();
}
