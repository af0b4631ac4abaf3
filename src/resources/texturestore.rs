//! GPU textures of composited pack covers.
//!
//! Non-send: raylib textures must stay on the thread that owns the GL
//! context. Each entry remembers which cover generation it was uploaded from
//! so the renderer only re-uploads when the pack received a newer cover.

use bevy_ecs::prelude::Entity;
use raylib::prelude::Texture2D;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct TextureStore {
    map: FxHashMap<Entity, (u64, Texture2D)>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: Entity) -> Option<&Texture2D> {
        self.map.get(&entity).map(|(_, tex)| tex)
    }

    /// Generation of the cover currently uploaded for `entity`.
    pub fn generation(&self, entity: Entity) -> Option<u64> {
        self.map.get(&entity).map(|(generation, _)| *generation)
    }

    pub fn insert(&mut self, entity: Entity, generation: u64, texture: Texture2D) {
        self.map.insert(entity, (generation, texture));
    }

    /// Drop textures of packs for which `alive` returns false.
    pub fn retain(&mut self, mut alive: impl FnMut(Entity) -> bool) {
        self.map.retain(|entity, _| alive(*entity));
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
