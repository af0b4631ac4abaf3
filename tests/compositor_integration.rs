//! Cover compositing integration tests: full pipeline, worker thread and stale results.

#![allow(dead_code, unused_imports)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use image::{ImageFormat, Rgba, RgbaImage};

use packopener::components::packtexture::{PackCover, PackTexture, TextureStatus};
use packopener::compositor::typography::{EMPHASIS_SCALE, GlyphBitmap, GlyphSource, load_font};
use packopener::compositor::{
    CompositeError, CompositedTexture, CompositorSettings, ImageSource, TextureRequest, composite,
    composite_or_fallback,
};
use packopener::events::texture::{CanvasReady, TextureMessage};
use packopener::resources::appconfig::AppConfig;
use packopener::resources::manifest::SetManifest;
use packopener::resources::texturebridge::{shutdown_texture_worker, spawn_texture_worker};
use packopener::systems::texture::{
    apply_texture_results, poll_texture_messages, request_pack_textures,
    update_canvas_messages, update_texture_messages,
};

const EPSILON: f32 = 1e-3;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Every glyph is a solid square of `0.6 × size` advancing `0.7 × size`.
struct Blocks;

impl GlyphSource for Blocks {
    fn advance(&self, _ch: char, px: f32) -> f32 {
        px * 0.7
    }
    fn rasterize(&self, _ch: char, px: f32) -> GlyphBitmap {
        let side = (px * 0.6).round() as usize;
        GlyphBitmap {
            width: side,
            height: side,
            xmin: 0,
            ymin: 0,
            coverage: vec![255; side * side],
        }
    }
}

fn data_uri(img: &RgbaImage) -> String {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    format!(
        "data:image/png;base64,{}",
        STANDARD.encode(out.into_inner())
    )
}

fn scenario_request() -> TextureRequest {
    let base = RgbaImage::from_pixel(512, 512, Rgba([20, 20, 30, 255]));
    let overlay = RgbaImage::from_pixel(200, 100, Rgba([230, 40, 40, 255]));
    TextureRequest {
        base: ImageSource::parse(&data_uri(&base)),
        overlay: ImageSource::parse(&data_uri(&overlay)),
        title: Some("Space Explorers".to_string()),
    }
}

fn texture_stub(width: u32, height: u32) -> Arc<CompositedTexture> {
    Arc::new(CompositedTexture {
        pixels: vec![255; (width * height * 4) as usize],
        width,
        height,
        preview_data_uri: "data:image/png;base64,".to_string(),
        layout: Default::default(),
        fallback: false,
    })
}

// ==================== FULL PIPELINE ====================

#[test]
fn composite_keeps_canvas_and_emphasizes_word_initials() {
    let settings = CompositorSettings::default();
    let texture = composite(&scenario_request(), Some(&Blocks), &settings).unwrap();

    assert_eq!((texture.width, texture.height), (512, 512));
    assert_eq!(texture.pixels.len(), 512 * 512 * 4);
    assert!(!texture.fallback);

    let rect = texture.layout.overlay_rect.expect("overlay drawn");
    assert!(approx_eq(rect.width, 200.0));
    assert!(approx_eq(rect.height, 100.0));

    let title = texture.layout.title.as_ref().expect("title laid out");
    let base = title.base_size;
    let s = title.glyph(0).unwrap();
    let e = title.glyph(6).unwrap();
    let x = title.glyph(7).unwrap();
    // titles are uppercased; the `x` of "Explorers" is not a word initial
    assert_eq!((s.ch, e.ch, x.ch), ('S', 'E', 'X'));
    assert!(approx_eq(s.size, base * EMPHASIS_SCALE));
    assert!(approx_eq(e.size, base * EMPHASIS_SCALE));
    assert!(approx_eq(x.size, base));

    assert!(texture.preview_data_uri.starts_with("data:image/png;base64,"));
    let png = texture.png_bytes().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (512, 512));
}

#[test]
fn oversized_overlay_is_scaled_into_its_box() {
    let settings = CompositorSettings::default();
    let mut request = scenario_request();
    let overlay = RgbaImage::from_pixel(700, 350, Rgba([0, 200, 0, 255]));
    request.overlay = ImageSource::parse(&data_uri(&overlay));

    let texture = composite(&request, None, &settings).unwrap();
    let rect = texture.layout.overlay_rect.unwrap();
    assert!(approx_eq(rect.width, 350.0));
    assert!(approx_eq(rect.height, 175.0));
    assert!(texture.layout.title.is_none());
}

#[test]
fn unreadable_overlay_falls_back_to_the_base() {
    let settings = CompositorSettings::default();
    let mut request = scenario_request();
    request.overlay = ImageSource::parse("/definitely/not/here.png");

    assert!(matches!(
        composite(&request, Some(&Blocks), &settings),
        Err(CompositeError::ImageLoad { .. })
    ));
    let texture = composite_or_fallback(&request, Some(&Blocks), &settings).unwrap();
    assert!(texture.fallback);
    assert_eq!((texture.width, texture.height), (512, 512));
    assert!(texture.layout.overlay_rect.is_none());
}

// ==================== DEMO ASSETS ====================

#[test]
fn default_config_covers_composite_with_titles() {
    let mut config = AppConfig::with_path(concat!(env!("CARGO_MANIFEST_DIR"), "/config.ini"));
    config.load_from_file().unwrap();
    let manifest = SetManifest::load_from_file(&config.manifest_path).unwrap();
    let font = load_font(&config.font_path).unwrap();
    assert!(!manifest.sets.is_empty());

    for set in &manifest.sets {
        let request = TextureRequest {
            base: manifest.base_source(),
            overlay: set.cover_source(),
            title: Some(set.title.clone()),
        };
        let texture = composite(&request, Some(&font), &config.compositor)
            .unwrap_or_else(|e| panic!("{}: {}", set.title, e));
        assert!(!texture.fallback, "{}", set.title);
        assert!(texture.layout.overlay_rect.is_some());
        assert!(texture.layout.title.is_some(), "{} has no title", set.title);
    }
}

// ==================== WORKER THREAD ====================

#[test]
fn worker_composites_pack_cover_off_thread() {
    let mut world = World::new();
    spawn_texture_worker(&mut world, CompositorSettings::default(), Some(Box::new(Blocks)));

    let request = scenario_request();
    let pack = world
        .spawn((
            PackCover {
                base: request.base.clone(),
                overlay: request.overlay.clone(),
                title: request.title.clone(),
            },
            PackTexture::default(),
        ))
        .id();

    let mut send = Schedule::default();
    send.add_systems(request_pack_textures);
    send.run(&mut world);
    assert_eq!(
        world.get::<PackTexture>(pack).unwrap().status,
        TextureStatus::Pending
    );

    let mut receive = Schedule::default();
    receive.add_systems(
        (
            update_texture_messages,
            update_canvas_messages,
            poll_texture_messages,
            apply_texture_results,
        )
            .chain(),
    );
    let mut canvas = SystemState::<MessageReader<CanvasReady>>::new(&mut world);
    let mut ready = Vec::new();
    for _ in 0..500 {
        receive.run(&mut world);
        ready.extend(canvas.get_mut(&mut world).read().cloned());
        if !ready.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    shutdown_texture_worker(&mut world);

    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].entity, pack);
    assert_eq!((ready[0].width, ready[0].height), (512, 512));

    let texture = world.get::<PackTexture>(pack).unwrap();
    assert_eq!(texture.status, TextureStatus::Ready);
    assert_eq!(texture.texture_generation, 1);
    assert!(texture.texture.is_some());
}

// ==================== STALE RESULTS ====================

#[test]
fn superseded_and_orphaned_results_are_discarded() {
    let mut world = World::new();
    world.init_resource::<Messages<TextureMessage>>();
    world.init_resource::<Messages<CanvasReady>>();

    let mut texture = PackTexture::default();
    texture.next_generation();
    texture.next_generation();
    let pack = world.spawn(texture).id();
    let gone = world.spawn(PackTexture::default()).id();
    world.despawn(gone);

    let mut apply = Schedule::default();
    apply.add_systems(apply_texture_results);

    world.write_message(TextureMessage::Ready {
        entity: pack,
        generation: 1,
        texture: texture_stub(4, 4),
    });
    world.write_message(TextureMessage::Ready {
        entity: gone,
        generation: 1,
        texture: texture_stub(4, 4),
    });
    apply.run(&mut world);
    let current = world.get::<PackTexture>(pack).unwrap();
    assert!(current.texture.is_none());
    assert_eq!(current.status, TextureStatus::Pending);

    world.write_message(TextureMessage::Ready {
        entity: pack,
        generation: 2,
        texture: texture_stub(8, 8),
    });
    apply.run(&mut world);
    let current = world.get::<PackTexture>(pack).unwrap();
    assert_eq!(current.status, TextureStatus::Ready);
    assert_eq!(current.texture_generation, 2);
    assert_eq!(current.texture.as_ref().map(|t| t.width), Some(8));
}

#[test]
fn failed_result_keeps_the_previous_cover() {
    let mut world = World::new();
    world.init_resource::<Messages<TextureMessage>>();
    world.init_resource::<Messages<CanvasReady>>();

    let mut texture = PackTexture::default();
    let first = texture.next_generation();
    texture.accept(first, texture_stub(4, 4));
    let second = texture.next_generation();
    let pack = world.spawn(texture).id();

    let mut apply = Schedule::default();
    apply.add_systems(apply_texture_results);
    world.write_message(TextureMessage::Failed {
        entity: pack,
        generation: second,
        error: "failed to load overlay image: gone".to_string(),
    });
    apply.run(&mut world);

    let current = world.get::<PackTexture>(pack).unwrap();
    assert_eq!(current.status, TextureStatus::Failed);
    assert_eq!(current.texture_generation, first);
    assert!(current.texture.is_some());
}
