//! packopener main entry point.
//!
//! A 3D pack-opening scene written in Rust using:
//! - **raylib** for windowing and drawing
//! - **bevy_ecs** for entity-component-system architecture
//! - **tiny-skia + fontdue** for compositing pack covers on a worker thread
//!
//! # Project Structure
//!
//! - [`components`] – per-pack state (interaction phase machine, pose, cover)
//! - [`compositor`] – cover compositing: colour analysis, typography, raster
//! - [`events`] – pack lifecycle messages and transition requests
//! - [`game`] – pool spawning and the demo card collaborator
//! - [`resources`] – pool, camera, pointer, config, reveal overlay, worker bridge
//! - [`systems`] – picking, interaction, texture worker, reveal, rendering
//!
//! # Main Loop
//!
//! 1. Load `config.ini` and the set manifest, initialize raylib and the ECS world
//! 2. Start the texture worker and spawn the pack pool
//! 3. Register observers and systems
//! 4. Run the frame loop: pointer input, texture results, reveal overlay,
//!    picking, state machines, pool reducer, rendering
//! 5. Stop the texture worker on exit
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --layout carousel
//! cargo run --release -- --composite out.png --base base.png --overlay logo.png --title "Space Explorers"
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod components;
mod compositor;
mod events;
mod game;
mod geometry;
mod resources;
mod systems;

use std::path::{Path, PathBuf};

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};

use crate::compositor::typography::{GlyphSource, load_font};
use crate::compositor::{ImageSource, TextureRequest, composite};
use crate::events::pack::PackEvent;
use crate::events::switchdebug::switch_debug_observer;
use crate::game::{DemoPackOpener, demo_pack_opener, spawn_pack_pool};
use crate::resources::appconfig::AppConfig;
use crate::resources::camera::SceneCamera;
use crate::resources::manifest::SetManifest;
use crate::resources::packpool::PoolLayout;
use crate::resources::pointer::PointerState;
use crate::resources::texturebridge::{setup_texture_worker, shutdown_texture_worker};
use crate::resources::texturestore::TextureStore;
use crate::resources::windowsize::WindowSize;
use crate::resources::worldtime::WorldTime;
use crate::systems::input::update_pointer_state;
use crate::systems::interaction::{
    advance_pack_interactions, cards_awarded_observer, pack_clicked_observer,
    reset_all_observer, reset_pack_observer, set_bobbing_observer, update_pack_messages,
};
use crate::systems::picking::{pick_packs, reset_on_back};
use crate::systems::pool::{pool_event_system, prune_despawned_packs};
use crate::systems::render::render_system;
use crate::systems::reveal::reveal_overlay_system;
use crate::systems::texture::{
    apply_texture_results, poll_texture_messages, request_pack_textures,
    update_canvas_messages, update_texture_messages,
};
use crate::systems::time::update_world_time;

/// Open card packs in 3D
#[derive(Parser)]
#[command(version, about = "Pick a pack, spin it open, reveal the cards.")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Override the set manifest path from the config.
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Override the pool layout: grid, carousel or daily.
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<String>,

    /// Composite a single cover into OUT (PNG) and exit without opening a window.
    #[arg(long, value_name = "OUT", requires_all = ["base", "overlay"])]
    composite: Option<PathBuf>,

    /// Base texture for --composite (path or data URI).
    #[arg(long, value_name = "SOURCE")]
    base: Option<String>,

    /// Overlay image for --composite (path or data URI).
    #[arg(long, value_name = "SOURCE")]
    overlay: Option<String>,

    /// Title drawn under the overlay for --composite.
    #[arg(long, value_name = "TEXT")]
    title: Option<String>,
}

/// Render one cover headlessly. Returns the process exit code.
fn run_composite(cli: &Cli, config: &AppConfig, out: &Path) -> i32 {
    let request = TextureRequest {
        base: ImageSource::parse(cli.base.as_deref().unwrap_or_default()),
        overlay: ImageSource::parse(cli.overlay.as_deref().unwrap_or_default()),
        title: cli.title.clone(),
    };
    let font = match load_font(&config.font_path) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("{}; the title will be skipped", e);
            None
        }
    };
    let glyphs = font.as_ref().map(|f| f as &dyn GlyphSource);

    let result = composite(&request, glyphs, &config.compositor)
        .and_then(|texture| texture.png_bytes());
    match result {
        Ok(png) => match std::fs::write(out, png) {
            Ok(()) => {
                println!("Cover written to {}", out.display());
                0
            }
            Err(e) => {
                error!("Could not write {}: {}", out.display(), e);
                1
            }
        },
        Err(e) => {
            error!("Compositing failed: {}", e);
            1
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AppConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    if let Some(manifest) = &cli.manifest {
        config.manifest_path = manifest.clone();
    }
    if let Some(layout) = &cli.layout {
        match PoolLayout::parse(layout) {
            Ok(layout) => config.layout = layout,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    // Early-exit: composite a single cover (no window needed)
    if let Some(out) = &cli.composite {
        std::process::exit(run_composite(&cli, &config, out));
    }

    let manifest = match SetManifest::load_from_file(&config.manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            error!(
                "Failed to load set manifest {}: {}",
                config.manifest_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    info!("Hello! Opening packs from {} set(s)", manifest.sets.len());
    // --------------- Raylib window ---------------
    let (mut rl, thread) = raylib::init()
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title("packopener")
        .build();
    rl.set_target_fps(config.target_fps);
    // Escape is the back key, not exit
    rl.set_exit_key(None);

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(WindowSize {
        w: rl.get_screen_width(),
        h: rl.get_screen_height(),
    });
    world.insert_resource(SceneCamera::default());
    world.insert_resource(PointerState::default());
    world.insert_resource(config.animation.clone());
    world.insert_resource(config.compositor.clone());
    world.insert_resource(Messages::<PackEvent>::default());
    world.insert_resource(DemoPackOpener::new(config.cards_per_pack));

    // Worker must be up before packs request their covers
    setup_texture_worker(&mut world, config.compositor.clone(), &config.font_path);
    spawn_pack_pool(&mut world, &manifest, &config);

    world.insert_resource(manifest);
    world.insert_resource(config);
    world.insert_non_send_resource(TextureStore::new());
    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(thread);

    world.spawn(Observer::new(pack_clicked_observer));
    world.spawn(Observer::new(reset_pack_observer));
    world.spawn(Observer::new(reset_all_observer));
    world.spawn(Observer::new(cards_awarded_observer));
    world.spawn(Observer::new(set_bobbing_observer));
    world.spawn(Observer::new(switch_debug_observer));
    // Ensure the observers are registered before we run any systems that may trigger events.
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(
        (
            // message queues advance once per frame, before any writer
            update_pack_messages,
            update_texture_messages,
            update_canvas_messages,
            update_pointer_state,
            // texture worker bridge
            request_pack_textures,
            poll_texture_messages,
            apply_texture_results,
            // the overlay gets the click before the packs do
            reveal_overlay_system,
            reset_on_back,
            pick_packs,
            advance_pack_interactions,
            pool_event_system,
            prune_despawned_packs,
            demo_pack_opener,
            render_system,
        )
            .chain(),
    );

    if let Err(e) = update.initialize(&mut world) {
        error!("Failed to initialize schedule: {}", e);
        shutdown_texture_worker(&mut world);
        std::process::exit(1);
    }

    // --------------- Main loop ---------------
    while !world
        .non_send_resource::<raylib::RaylibHandle>()
        .window_should_close()
    {
        let dt = world
            .non_send_resource::<raylib::RaylibHandle>()
            .get_frame_time();
        update_world_time(&mut world, dt);

        update.run(&mut world);

        world.clear_trackers(); // Clear changed components for next frame

        // Update window size each frame (may change due to resize)
        let (new_w, new_h) = {
            let rl = world.non_send_resource::<raylib::RaylibHandle>();
            (rl.get_screen_width(), rl.get_screen_height())
        };
        {
            let mut window_size = world.resource_mut::<WindowSize>();
            window_size.w = new_w;
            window_size.h = new_h;
        }
    }
    shutdown_texture_worker(&mut world);
}
