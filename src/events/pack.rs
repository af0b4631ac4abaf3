//! Pack lifecycle messages and transition requests.
//!
//! Two kinds of types live here:
//! - [`PackEvent`] is a [`Message`] written by the interaction systems and
//!   read by the pool, the reveal overlay and any host-side collaborator.
//! - [`PackClicked`], [`ResetPack`], [`ResetAllPacks`] and [`SetBobbing`] are observer
//!   [`Event`]s that *request* a transition. The receiving observers decide
//!   whether the request is valid for the pack's current phase.

use bevy_ecs::prelude::*;

/// Lifecycle notification of one pack.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackEvent {
    /// The pack won the selection lock and started flying to the center.
    SelectionStarted { entity: Entity },
    /// Second click: the pack is being opened. Answer with
    /// [`CardsAwarded`](crate::events::cards::CardsAwarded).
    OpenRequested { entity: Entity },
    /// Drop and spin finished.
    AnimationComplete { entity: Entity },
    /// The pack is back at rest after a reset.
    ResetComplete { entity: Entity },
    /// The reveal overlay for this pack was mounted or unmounted.
    OverlayVisibilityChanged { entity: Entity, visible: bool },
}

impl PackEvent {
    pub fn entity(&self) -> Entity {
        match *self {
            PackEvent::SelectionStarted { entity }
            | PackEvent::OpenRequested { entity }
            | PackEvent::AnimationComplete { entity }
            | PackEvent::ResetComplete { entity }
            | PackEvent::OverlayVisibilityChanged { entity, .. } => entity,
        }
    }
}

/// The pointer clicked on a pack.
#[derive(Event, Debug, Clone, Copy)]
pub struct PackClicked {
    pub entity: Entity,
}

/// Send one pack back to its original pose.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetPack {
    pub entity: Entity,
}

/// Send every pack of the pool back (back key).
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetAllPacks {}

/// Turn idle bobbing on or off for every pack.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetBobbing {
    pub enabled: bool,
}
