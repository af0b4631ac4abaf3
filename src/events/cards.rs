//! Awarded cards handed back by whoever opened the pack.

use bevy_ecs::prelude::*;

use crate::resources::reveal::Card;

/// Cards awarded for a pack after [`PackEvent::OpenRequested`].
///
/// [`PackEvent::OpenRequested`]: crate::events::pack::PackEvent::OpenRequested
#[derive(Event, Debug, Clone)]
pub struct CardsAwarded {
    pub entity: Entity,
    pub cards: Vec<Card>,
}
