//! Set manifest: which packs the pool shows and what they contain.
//!
//! ```json
//! {
//!   "base_texture": "assets/pack_base.png",
//!   "sets": [
//!     { "title": "Space Explorers", "cover": "assets/covers/space.png",
//!       "cards": [ { "id": "c1", "name": "Voyager 1", "rarity": "rare" } ] }
//!   ]
//! }
//! ```
//!
//! Sets whose cover is empty are dropped while loading; they cannot be
//! composited and are never shown.

use std::path::Path;

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::compositor::ImageSource;
use crate::resources::reveal::Card;

/// One openable set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetEntry {
    pub title: String,
    /// Cover overlay as a path or data URI.
    pub cover: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl SetEntry {
    pub fn cover_source(&self) -> ImageSource {
        ImageSource::parse(&self.cover)
    }
}

#[derive(Resource, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SetManifest {
    /// Base pack texture shared by every cover.
    pub base_texture: String,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

impl SetManifest {
    /// Load the manifest from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let file_content = std::fs::read_to_string(path.as_ref())?;
        let manifest = Self::from_json(&file_content)?;
        info!(
            "Loaded {} set(s) from {}",
            manifest.sets.len(),
            path.as_ref().display()
        );
        Ok(manifest)
    }

    /// Parse a manifest and drop sets without a cover.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut manifest: SetManifest = serde_json::from_str(json)?;
        manifest.sets.retain(|set| {
            let keep = !set.cover.trim().is_empty();
            if !keep {
                warn!("Set '{}' has no cover; skipping it", set.title);
            }
            keep
        });
        Ok(manifest)
    }

    pub fn base_source(&self) -> ImageSource {
        ImageSource::parse(&self.base_texture)
    }

    /// Cards of a set with their `set_title` filled in.
    pub fn cards_of(&self, set_index: usize) -> Vec<Card> {
        self.sets
            .get(set_index)
            .map(|set| {
                set.cards
                    .iter()
                    .cloned()
                    .map(|mut card| {
                        if card.set_title.is_empty() {
                            card.set_title = set.title.clone();
                        }
                        card
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
