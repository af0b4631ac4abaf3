//! ECS resources that bridge the main thread with the texture worker thread.
//!
//! Use [`setup_texture_worker`] once during initialization to spawn the worker
//! and insert the [`TextureBridge`] and `Messages<TextureMessage>` resources.
//! Call [`shutdown_texture_worker`] during teardown to stop and join it.

use std::path::Path;

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{info, warn};

use crate::compositor::CompositorSettings;
use crate::compositor::typography::{GlyphSource, load_font};
use crate::events::texture::{CanvasReady, TextureCmd, TextureMessage};
use crate::systems::texture::texture_worker;

/// Shared bridge between the ECS world and the texture worker.
#[derive(Resource)]
pub struct TextureBridge {
    /// Sender for [`TextureCmd`] messages (ECS -> worker).
    pub tx_cmd: Sender<TextureCmd>,
    /// Receiver for [`TextureMessage`] messages (worker -> ECS).
    pub rx_msg: Receiver<TextureMessage>,
    /// Join handle for the worker thread.
    pub handle: std::thread::JoinHandle<()>,
}

/// Spawn the worker with an already loaded glyph source (or none).
pub fn spawn_texture_worker(
    world: &mut World,
    settings: CompositorSettings,
    glyphs: Option<Box<dyn GlyphSource>>,
) {
    let (tx_cmd, rx_cmd) = unbounded::<TextureCmd>();
    let (tx_msg, rx_msg) = unbounded::<TextureMessage>();

    let handle = std::thread::spawn(move || texture_worker(rx_cmd, tx_msg, settings, glyphs));

    world.insert_resource(TextureBridge {
        tx_cmd,
        rx_msg,
        handle,
    });
    world.insert_resource(Messages::<TextureMessage>::default());
    world.insert_resource(Messages::<CanvasReady>::default());
}

/// Load the title font and spawn the texture worker.
///
/// A missing or unreadable font is not fatal: covers are then composited
/// without titles.
pub fn setup_texture_worker(world: &mut World, settings: CompositorSettings, font_path: &Path) {
    let glyphs: Option<Box<dyn GlyphSource>> = match load_font(font_path) {
        Ok(font) => Some(Box::new(font)),
        Err(e) => {
            warn!("{}; covers will be drawn without titles", e);
            None
        }
    };
    spawn_texture_worker(world, settings, glyphs);
    info!("Texture worker started");
}

/// Request shutdown of the worker and join it.
pub fn shutdown_texture_worker(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<TextureBridge>() {
        let _ = bridge.tx_cmd.send(TextureCmd::Shutdown);
        let _ = bridge.handle.join();
        info!("Texture worker stopped");
    }
}
