//! Rendering with Raylib.
//!
//! [`render_system`] uploads covers that changed since the last frame, draws
//! every pack as a slab at its current pose with the composited cover on the
//! front face, then the reveal overlay and the debug overlay on top.
use bevy_ecs::prelude::*;
use log::{debug, warn};
use raylib::ffi;
use raylib::prelude::*;

use crate::components::interaction::PackInteraction;
use crate::components::packinstance::PackInstance;
use crate::components::packtexture::{PackTexture, TextureStatus};
use crate::geometry::{Vec3, axis_angle_degrees};
use crate::resources::camera::SceneCamera;
use crate::resources::debugmode::DebugMode;
use crate::resources::packpool::PackPool;
use crate::resources::reveal::RevealOverlay;
use crate::resources::texturestore::TextureStore;
use crate::resources::windowsize::WindowSize;

const BACKGROUND: Color = Color::new(22, 24, 32, 255);
const PACK_EDGE: Color = Color::new(48, 50, 62, 255);
const PACK_PENDING: Color = Color::new(90, 92, 110, 255);
/// Gap between the slab and the cover quad, avoids z-fighting.
const COVER_LIFT: f32 = 0.002;

fn rl_vec(v: Vec3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

fn rl_camera(camera: &SceneCamera) -> Camera3D {
    Camera3D::perspective(
        rl_vec(camera.position),
        rl_vec(camera.target),
        rl_vec(camera.up),
        camera.fovy,
    )
}

fn rarity_color(rarity: &str) -> Color {
    match rarity.to_ascii_lowercase().as_str() {
        "uncommon" => Color::new(96, 200, 120, 255),
        "rare" => Color::new(80, 150, 255, 255),
        "epic" => Color::new(180, 100, 255, 255),
        "legendary" => Color::new(255, 190, 60, 255),
        _ => Color::new(200, 200, 200, 255),
    }
}

/// Upload every cover whose generation is newer than the one on the GPU.
fn upload_covers(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    store: &mut TextureStore,
    packs: &Query<(Entity, &PackInstance, &PackInteraction, &PackTexture)>,
) {
    store.retain(|entity| packs.contains(entity));
    for (entity, _, _, cover) in packs.iter() {
        let Some(texture) = cover.texture.as_ref() else {
            continue;
        };
        if store.generation(entity) == Some(cover.texture_generation) {
            continue;
        }
        let png = match texture.png_bytes() {
            Ok(png) => png,
            Err(e) => {
                warn!("Could not encode cover of {:?}: {}", entity, e);
                continue;
            }
        };
        let uploaded = Image::load_image_from_mem(".png", &png)
            .map_err(|e| e.to_string())
            .and_then(|image| {
                rl.load_texture_from_image(thread, &image)
                    .map_err(|e| e.to_string())
            });
        match uploaded {
            Ok(gpu) => {
                debug!(
                    "Uploaded cover of {:?} (gen {})",
                    entity, cover.texture_generation
                );
                store.insert(entity, cover.texture_generation, gpu);
            }
            Err(e) => warn!("Could not upload cover of {:?}: {}", entity, e),
        }
    }
}

/// Draw one pack: an untextured slab plus a textured quad on its front face.
fn draw_pack(
    d3: &mut RaylibMode3D<RaylibDrawHandle>,
    instance: &PackInstance,
    pack: &PackInteraction,
    cover: Option<&Texture2D>,
) {
    let pose = pack.pose();
    let (axis, angle) = axis_angle_degrees(pose.orientation);
    let size = instance.size();
    let (hx, hy, hz) = (size.x * 0.5, size.y * 0.5, size.z * 0.5 + COVER_LIFT);

    // SAFETY: rlgl calls happen inside an active 3D mode on the render thread,
    // and every push is matched by a pop before returning.
    unsafe {
        ffi::rlPushMatrix();
        ffi::rlTranslatef(pose.position.x, pose.position.y, pose.position.z);
        ffi::rlRotatef(angle, axis.x, axis.y, axis.z);
        ffi::rlScalef(pose.scale.x, pose.scale.y, pose.scale.z);
    }

    d3.draw_cube(Vector3::zero(), size.x, size.y, size.z, PACK_EDGE);

    unsafe {
        match cover {
            Some(texture) => {
                ffi::rlSetTexture(texture.id);
                ffi::rlColor4ub(255, 255, 255, 255);
            }
            None => ffi::rlColor4ub(PACK_PENDING.r, PACK_PENDING.g, PACK_PENDING.b, 255),
        }
        ffi::rlBegin(ffi::RL_QUADS as i32);
        ffi::rlNormal3f(0.0, 0.0, 1.0);
        ffi::rlTexCoord2f(0.0, 1.0);
        ffi::rlVertex3f(-hx, -hy, hz);
        ffi::rlTexCoord2f(1.0, 1.0);
        ffi::rlVertex3f(hx, -hy, hz);
        ffi::rlTexCoord2f(1.0, 0.0);
        ffi::rlVertex3f(hx, hy, hz);
        ffi::rlTexCoord2f(0.0, 0.0);
        ffi::rlVertex3f(-hx, hy, hz);
        ffi::rlEnd();
        ffi::rlSetTexture(0);
        ffi::rlPopMatrix();
    }
}

fn draw_reveal(d: &mut RaylibDrawHandle, overlay: &RevealOverlay, window: WindowSize) {
    d.draw_rectangle(0, 0, window.w, window.h, Color::new(0, 0, 0, 170));

    let panel_w = 420.min(window.w - 40).max(200);
    let panel_h = 240;
    let x = (window.w - panel_w) / 2;
    let y = (window.h - panel_h) / 2;
    d.draw_rectangle(x, y, panel_w, panel_h, Color::new(30, 32, 44, 240));

    let (shown, total) = overlay.progress();
    match overlay.current() {
        Some(card) => {
            let accent = rarity_color(&card.rarity);
            d.draw_rectangle_lines(x, y, panel_w, panel_h, accent);
            d.draw_text(&card.name, x + 24, y + 40, 30, Color::WHITE);
            d.draw_text(&card.rarity.to_uppercase(), x + 24, y + 86, 20, accent);
            d.draw_text(&card.set_title, x + 24, y + 118, 18, Color::LIGHTGRAY);
        }
        None => {
            d.draw_rectangle_lines(x, y, panel_w, panel_h, Color::GRAY);
            d.draw_text("This pack was empty", x + 24, y + 40, 26, Color::WHITE);
        }
    }
    let footer = format!("{} / {}  click to continue", shown.min(total), total);
    d.draw_text(&footer, x + 24, y + panel_h - 36, 16, Color::GRAY);
}

fn draw_debug(
    d: &mut RaylibDrawHandle,
    packs: &Query<(Entity, &PackInstance, &PackInteraction, &PackTexture)>,
    pool: &PackPool,
    store: &TextureStore,
) {
    let text = format!("DEBUG MODE (press F11 to toggle) | FPS: {}", d.get_fps());
    d.draw_text(&text, 10, 10, 10, Color::RAYWHITE);
    let text = format!(
        "Packs: {} | GPU covers: {} | Lock: {:?} | Reveal lock: {}",
        pool.len(),
        store.len(),
        pool.active(),
        pool.interaction_locked
    );
    d.draw_text(&text, 10, 26, 10, Color::RAYWHITE);

    let mut line = 42;
    for (entity, instance, pack, cover) in packs.iter() {
        let status = match cover.status {
            TextureStatus::Empty => "empty",
            TextureStatus::Pending => "pending",
            TextureStatus::Ready => "ready",
            TextureStatus::Failed => "failed",
        };
        let text = format!(
            "#{} {:?} {:?} spin {:.0} cover {} (gen {})",
            instance.index,
            entity,
            pack.phase(),
            pack.spin_degrees(),
            status,
            cover.texture_generation
        );
        d.draw_text(&text, 10, line, 10, Color::RAYWHITE);
        line += 14;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn render_system(
    mut rl: NonSendMut<RaylibHandle>,
    thread: NonSend<RaylibThread>,
    mut store: NonSendMut<TextureStore>,
    camera: Res<SceneCamera>,
    window: Res<WindowSize>,
    pool: Res<PackPool>,
    overlay: Option<Res<RevealOverlay>>,
    debug_mode: Option<Res<DebugMode>>,
    packs: Query<(Entity, &PackInstance, &PackInteraction, &PackTexture)>,
) {
    upload_covers(&mut rl, &thread, &mut store, &packs);

    let mut d = rl.begin_drawing(&thread);
    d.clear_background(BACKGROUND);

    {
        let mut d3 = d.begin_mode3D(rl_camera(&camera));
        for (entity, instance, pack, _) in packs.iter() {
            draw_pack(&mut d3, instance, pack, store.get(entity));
        }
        if debug_mode.is_some() {
            for (_, instance, pack, _) in packs.iter() {
                let bounds = instance.bounds(pack);
                let (axis, angle) = axis_angle_degrees(bounds.orientation);
                let size = bounds.half_extents * 2.0;
                unsafe {
                    ffi::rlPushMatrix();
                    ffi::rlTranslatef(bounds.center.x, bounds.center.y, bounds.center.z);
                    ffi::rlRotatef(angle, axis.x, axis.y, axis.z);
                }
                d3.draw_cube_wires(Vector3::zero(), size.x, size.y, size.z, Color::RED);
                unsafe {
                    ffi::rlPopMatrix();
                }
            }
        }
    }

    if let Some(overlay) = overlay.as_deref() {
        draw_reveal(&mut d, overlay, *window);
    }
    if debug_mode.is_some() {
        draw_debug(&mut d, &packs, &pool, &store);
    }
}
