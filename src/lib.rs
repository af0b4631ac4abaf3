//! packopener library.
//!
//! This module exposes the ECS components, cover compositor, events,
//! resources and systems for use in integration tests and as a reusable
//! library.

pub mod components;
pub mod compositor;
pub mod events;
pub mod game;
pub mod geometry;
pub mod resources;
pub mod systems;
