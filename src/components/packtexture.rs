//! Cover inputs and the composited texture state of a pack.
//!
//! [`PackCover`] is what the host supplies; changing it schedules a new
//! composite on the texture worker. [`PackTexture`] tracks the request
//! generation so that results of superseded requests can be discarded.

use std::sync::Arc;

use bevy_ecs::prelude::Component;

use crate::compositor::{CompositedTexture, ImageSource, TextureRequest};

/// Images and title the pack cover is built from.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct PackCover {
    pub base: ImageSource,
    pub overlay: ImageSource,
    pub title: Option<String>,
}

impl PackCover {
    pub fn request(&self) -> TextureRequest {
        TextureRequest {
            base: self.base.clone(),
            overlay: self.overlay.clone(),
            title: self.title.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextureStatus {
    /// No request sent yet.
    #[default]
    Empty,
    Pending,
    Ready,
    /// The last request failed; `texture` still holds the previous result, if any.
    Failed,
}

/// Latest composited cover of a pack.
#[derive(Component, Clone, Debug, Default)]
pub struct PackTexture {
    /// Generation of the most recent request. Results carrying another
    /// generation are stale.
    pub generation: u64,
    pub status: TextureStatus,
    pub texture: Option<Arc<CompositedTexture>>,
    /// Generation of `texture`, used by the renderer to know when to re-upload.
    pub texture_generation: u64,
}

impl PackTexture {
    /// Start a new request and return its generation.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.status = TextureStatus::Pending;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn accept(&mut self, generation: u64, texture: Arc<CompositedTexture>) {
        self.texture = Some(texture);
        self.texture_generation = generation;
        self.status = TextureStatus::Ready;
    }

    /// Keep whatever texture was there before.
    pub fn fail(&mut self) {
        self.status = TextureStatus::Failed;
    }
}
