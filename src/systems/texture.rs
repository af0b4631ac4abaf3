//! Cover compositing on a dedicated worker thread.
//!
//! - [`texture_worker`] runs on its own OS thread, owns the glyph source and
//!   composites every [`TextureCmd::Composite`] it receives.
//! - [`request_pack_textures`] sends a request whenever a pack's
//!   [`PackCover`] is added or changed.
//! - [`poll_texture_messages`] drains worker results into the ECS mailbox
//!   without blocking.
//! - [`apply_texture_results`] stores fresh results on the pack and drops
//!   stale ones (despawned entity or superseded generation).
//!
//! Image decoding and rasterization never run on the frame thread.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::components::packtexture::{PackCover, PackTexture};
use crate::compositor::typography::GlyphSource;
use crate::compositor::{CompositorSettings, TextureRequest, composite_or_fallback};
use crate::events::texture::{CanvasReady, TextureCmd, TextureMessage};
use crate::resources::texturebridge::TextureBridge;

/// Entry point of the texture worker thread.
///
/// Blocks on the command channel. Commands queued while a composite was
/// running are coalesced so only the newest request per entity is drawn.
/// Returns on [`TextureCmd::Shutdown`] or when every sender is gone.
pub fn texture_worker(
    rx_cmd: Receiver<TextureCmd>,
    tx_msg: Sender<TextureMessage>,
    settings: CompositorSettings,
    glyphs: Option<Box<dyn GlyphSource>>,
) {
    info!(
        "[texture] worker starting (id={:?})",
        std::thread::current().id()
    );

    'run: while let Ok(first) = rx_cmd.recv() {
        let mut batch: Vec<(Entity, u64, TextureRequest)> = Vec::new();
        let mut latest: FxHashMap<Entity, usize> = FxHashMap::default();

        for cmd in std::iter::once(first).chain(rx_cmd.try_iter()) {
            match cmd {
                TextureCmd::Composite {
                    entity,
                    generation,
                    request,
                } => match latest.get(&entity) {
                    Some(&slot) if batch[slot].1 >= generation => {}
                    Some(&slot) => batch[slot] = (entity, generation, request),
                    None => {
                        latest.insert(entity, batch.len());
                        batch.push((entity, generation, request));
                    }
                },
                TextureCmd::Shutdown => {
                    info!("[texture] shutdown requested");
                    break 'run;
                }
            }
        }

        for (entity, generation, request) in batch {
            let msg = match composite_or_fallback(&request, glyphs.as_deref(), &settings) {
                Ok(texture) => {
                    debug!(
                        "[texture] {:?} gen {} ready {}x{}{}",
                        entity,
                        generation,
                        texture.width,
                        texture.height,
                        if texture.fallback { " (fallback)" } else { "" }
                    );
                    TextureMessage::Ready {
                        entity,
                        generation,
                        texture: Arc::new(texture),
                    }
                }
                Err(e) => TextureMessage::Failed {
                    entity,
                    generation,
                    error: e.to_string(),
                },
            };
            if tx_msg.send(msg).is_err() {
                break 'run;
            }
        }
    }

    info!(
        "[texture] worker exiting (id={:?})",
        std::thread::current().id()
    );
}

/// Send a composite request for every pack whose cover was added or changed.
pub fn request_pack_textures(
    bridge: Res<TextureBridge>,
    mut query: Query<(Entity, &PackCover, &mut PackTexture), Changed<PackCover>>,
) {
    for (entity, cover, mut texture) in query.iter_mut() {
        let generation = texture.next_generation();
        let cmd = TextureCmd::Composite {
            entity,
            generation,
            request: cover.request(),
        };
        if bridge.tx_cmd.send(cmd).is_err() {
            warn!("Texture worker is gone; {:?} keeps its current cover", entity);
            texture.fail();
        }
    }
}

/// Drain pending worker results into `Messages<TextureMessage>`.
pub fn poll_texture_messages(
    bridge: Res<TextureBridge>,
    mut writer: MessageWriter<TextureMessage>,
) {
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Advance the ECS message queue for [`TextureMessage`].
pub fn update_texture_messages(mut msgs: ResMut<Messages<TextureMessage>>) {
    msgs.update();
}

/// Advance the ECS message queue for [`CanvasReady`].
pub fn update_canvas_messages(mut msgs: ResMut<Messages<CanvasReady>>) {
    msgs.update();
}

/// Apply worker results to their packs.
///
/// Results for despawned packs or superseded generations are discarded. A
/// failure keeps the previous texture.
pub fn apply_texture_results(
    mut reader: MessageReader<TextureMessage>,
    mut query: Query<&mut PackTexture>,
    mut ready: MessageWriter<CanvasReady>,
) {
    for msg in reader.read() {
        let (entity, generation) = match msg {
            TextureMessage::Ready {
                entity, generation, ..
            }
            | TextureMessage::Failed {
                entity, generation, ..
            } => (*entity, *generation),
        };
        let Ok(mut texture) = query.get_mut(entity) else {
            debug!("Discarding texture result for despawned {:?}", entity);
            continue;
        };
        if !texture.is_current(generation) {
            debug!(
                "Discarding stale texture result for {:?} (gen {} < {})",
                entity, generation, texture.generation
            );
            continue;
        }
        match msg {
            TextureMessage::Ready { texture: tex, .. } => {
                texture.accept(generation, Arc::clone(tex));
                ready.write(CanvasReady {
                    entity,
                    width: tex.width,
                    height: tex.height,
                    preview_data_uri: tex.preview_data_uri.clone(),
                });
            }
            TextureMessage::Failed { error, .. } => {
                warn!("Cover for {:?} failed: {}", entity, error);
                texture.fail();
            }
        }
    }
}
