//! Commands and messages exchanged with the texture worker thread.

use std::sync::Arc;

use bevy_ecs::prelude::*;

use crate::compositor::{CompositedTexture, TextureRequest};

/// Commands sent *to* the texture worker.
#[derive(Debug, Clone)]
pub enum TextureCmd {
    Composite {
        entity: Entity,
        generation: u64,
        request: TextureRequest,
    },
    Shutdown,
}

/// Results sent *back* from the texture worker.
#[derive(Message, Debug, Clone)]
pub enum TextureMessage {
    Ready {
        entity: Entity,
        generation: u64,
        texture: Arc<CompositedTexture>,
    },
    Failed {
        entity: Entity,
        generation: u64,
        error: String,
    },
}

/// A pack's cover texture was replaced. Purely informational.
#[derive(Message, Debug, Clone)]
pub struct CanvasReady {
    pub entity: Entity,
    pub width: u32,
    pub height: u32,
    pub preview_data_uri: String,
}
