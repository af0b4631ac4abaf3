//! Scene setup and the demo card collaborator.
//!
//! [`spawn_pack_pool`] builds one pack entity per shown set and registers it
//! in the [`PackPool`]. [`demo_pack_opener`] answers `OpenRequested` with
//! random cards from the set manifest, standing in for a real backend.

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::components::bobbing::BobbingState;
use crate::components::interaction::PackInteraction;
use crate::components::packinstance::PackInstance;
use crate::components::packtexture::{PackCover, PackTexture};
use crate::events::cards::CardsAwarded;
use crate::events::pack::PackEvent;
use crate::resources::appconfig::AppConfig;
use crate::resources::manifest::SetManifest;
use crate::resources::packpool::PackPool;
use crate::resources::reveal::Card;
use crate::resources::tuning::AnimationTuning;

/// Spawn the pack pool described by `manifest` and `config`.
///
/// Inserts the [`PackPool`] resource and returns how many packs were spawned.
pub fn spawn_pack_pool(world: &mut World, manifest: &SetManifest, config: &AppConfig) -> usize {
    let layout = config.layout;
    let count = layout.instance_count(manifest.sets.len());
    let poses = layout.poses(count);
    let tuning: &AnimationTuning = &config.animation;
    let mut pool = PackPool::new(layout);

    for (index, (set, pose)) in manifest.sets.iter().zip(poses).enumerate() {
        let mut bobbing = BobbingState::new(
            pose.position.y,
            fastrand::f32() * TAU,
            tuning.bob_amplitude,
            tuning.bob_speed,
        );
        bobbing.active = layout.bobbing_enabled();

        let entity = world
            .spawn((
                PackInstance::new(index, index),
                PackInteraction::new(pose),
                bobbing,
                PackCover {
                    base: manifest.base_source(),
                    overlay: set.cover_source(),
                    title: Some(set.title.clone()).filter(|t| !t.trim().is_empty()),
                },
                PackTexture::default(),
            ))
            .id();
        pool.register(entity);
    }

    if count == 0 {
        warn!("The set manifest lists no set with a cover; the pool is empty");
    } else {
        info!("Spawned {} pack(s) in a {:?} layout", count, layout);
    }
    world.insert_resource(pool);
    count
}

/// Stand-in for the pack-opening backend.
#[derive(Resource)]
pub struct DemoPackOpener {
    pub cards_per_pack: usize,
    rng: fastrand::Rng,
}

impl DemoPackOpener {
    pub fn new(cards_per_pack: usize) -> Self {
        Self {
            cards_per_pack,
            rng: fastrand::Rng::new(),
        }
    }

    /// Deterministic draws for tests.
    pub fn with_seed(cards_per_pack: usize, seed: u64) -> Self {
        Self {
            cards_per_pack,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Draw `cards_per_pack` cards uniformly, with replacement.
    pub fn draw(&mut self, pool: &[Card]) -> Vec<Card> {
        if pool.is_empty() {
            return Vec::new();
        }
        (0..self.cards_per_pack)
            .map(|_| pool[self.rng.usize(..pool.len())].clone())
            .collect()
    }
}

/// Award cards to every pack that asked to be opened this frame.
pub fn demo_pack_opener(
    mut reader: MessageReader<PackEvent>,
    mut opener: ResMut<DemoPackOpener>,
    manifest: Res<SetManifest>,
    packs: Query<&PackInstance>,
    mut commands: Commands,
) {
    for event in reader.read() {
        let PackEvent::OpenRequested { entity } = *event else {
            continue;
        };
        let Ok(instance) = packs.get(entity) else {
            continue;
        };
        let cards = opener.draw(&manifest.cards_of(instance.set_index));
        info!(
            "Awarding {} card(s) from set #{} to {:?}",
            cards.len(),
            instance.set_index,
            entity
        );
        commands.trigger(CardsAwarded { entity, cards });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            name: id.to_uppercase(),
            set_title: String::new(),
            rarity: "common".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_draw_respects_cards_per_pack() {
        let mut opener = DemoPackOpener::with_seed(5, 7);
        let pool = vec![card("a"), card("b")];
        let drawn = opener.draw(&pool);
        assert_eq!(drawn.len(), 5);
        assert!(drawn.iter().all(|c| c.id == "a" || c.id == "b"));
    }

    #[test]
    fn test_draw_from_empty_set() {
        let mut opener = DemoPackOpener::with_seed(3, 1);
        assert!(opener.draw(&[]).is_empty());
    }

    #[test]
    fn test_spawn_pool_registers_every_set() {
        let json = r#"{
            "base_texture": "base.png",
            "sets": [
                { "title": "Alpha", "cover": "a.png", "cards": [] },
                { "title": "Beta", "cover": "b.png", "cards": [] },
                { "title": "Gamma", "cover": "", "cards": [] }
            ]
        }"#;
        let manifest = SetManifest::from_json(json).unwrap();
        let config = AppConfig::new();
        let mut world = World::new();

        assert_eq!(spawn_pack_pool(&mut world, &manifest, &config), 2);
        let pool = world.resource::<PackPool>();
        assert_eq!(pool.len(), 2);
        let second = pool.handle(1).unwrap();
        let instance = world.get::<PackInstance>(second).unwrap();
        assert_eq!(instance.index, 1);
        let cover = world.get::<PackCover>(second).unwrap();
        assert_eq!(cover.title.as_deref(), Some("Beta"));
    }
}
