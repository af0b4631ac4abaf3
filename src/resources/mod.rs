//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: pool coordination, pointer state,
//! timing, configuration, the reveal overlay and the texture worker bridge.
//! Each submodule documents the semantics and intended usage of its
//! resource(s).
//!
//! Overview
//! - `appconfig` – INI-backed settings for the window, assets, pool and tuning
//! - `camera` – perspective camera shared by rendering and picking
//! - `debugmode` – presence toggles the debug overlay
//! - `manifest` – sets shown by the pool and their cards
//! - `packpool` – instance handles, selection lock and awarded cards
//! - `pointer` – per-frame pointer position, ray and clicks
//! - `reveal` – the card reveal overlay and its queue
//! - `texturebridge` – channels and join handle of the texture worker
//! - `texturestore` – GPU textures of composited covers (non-send)
//! - `tuning` – animation rates, scales and distances
//! - `windowsize` – current window dimensions in pixels
//! - `worldtime` – simulation time and delta
pub mod appconfig;
pub mod camera;
pub mod debugmode;
pub mod manifest;
pub mod packpool;
pub mod pointer;
pub mod reveal;
pub mod texturebridge;
pub mod texturestore;
pub mod tuning;
pub mod windowsize;
pub mod worldtime;
