//! Awarded cards and the reveal overlay that shows them one at a time.

use std::collections::VecDeque;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

fn default_rarity() -> String {
    "common".to_string()
}

/// One collectible card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub set_title: String,
    #[serde(default = "default_rarity")]
    pub rarity: String,
    /// Card art, as a path or data URI.
    #[serde(default)]
    pub image: Option<String>,
}

/// Cards left to reveal, front first. Only ever shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealQueue {
    cards: VecDeque<Card>,
}

impl RevealQueue {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    pub fn front(&self) -> Option<&Card> {
        self.cards.front()
    }

    pub fn pop_front(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Mounted while a pack's awarded cards are on screen.
#[derive(Resource, Debug, Clone)]
pub struct RevealOverlay {
    pub owner: Entity,
    queue: RevealQueue,
    total: usize,
}

impl RevealOverlay {
    pub fn new(owner: Entity, cards: Vec<Card>) -> Self {
        let total = cards.len();
        Self {
            owner,
            queue: RevealQueue::new(cards),
            total,
        }
    }

    pub fn current(&self) -> Option<&Card> {
        self.queue.front()
    }

    /// 1-based position of the current card and the total count.
    pub fn progress(&self) -> (usize, usize) {
        (self.total - self.queue.len() + 1, self.total)
    }

    /// Dismiss the current card. Returns `true` once nothing is left.
    pub fn advance(&mut self) -> bool {
        self.queue.pop_front();
        self.queue.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }
}
