//! Systems.
//!
//! This module groups all ECS systems that advance input, pack interaction,
//! cover compositing and rendering.
//!
//! Submodules overview
//! - [`input`] – read the mouse and keyboard into [`crate::resources::pointer::PointerState`]
//! - [`interaction`] – click/reset/cards observers and the per-frame phase step
//! - [`picking`] – ray-pick packs, forward hover changes and clicks
//! - [`pool`] – react to pack lifecycle messages (locks, overlay mounting)
//! - [`render`] – draw packs, the reveal overlay and debug info using Raylib
//! - [`reveal`] – dismiss revealed cards and unmount the overlay
//! - [`texture`] – texture worker thread and the bridge systems around it
//! - [`time`] – update simulation time and delta

pub mod input;
pub mod interaction;
pub mod picking;
pub mod pool;
pub mod render;
pub mod reveal;
pub mod texture;
pub mod time;
