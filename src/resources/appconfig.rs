//! Application configuration resource.
//!
//! Settings are loaded from an INI file. Every key is optional and falls back
//! to a safe default, so a missing or partial file still starts the host.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//!
//! [assets]
//! manifest = ./assets/sets.json
//! font = ./assets/fonts/title.ttf
//!
//! [pool]
//! layout = grid          ; grid | carousel | daily
//! columns = 3
//! spacing = 2.4
//! radius = 7
//! arc = 120
//! cards_per_pack = 5
//!
//! [animation]
//! lerp_rate = 0.05
//! epsilon = 0.01
//! spin_speed = 360
//! hover_scale = 1.1
//! click_scale = 1.5
//! drop_distance = 2.5
//! focus_distance = 6
//! bob_amplitude = 0.08
//! bob_speed = 2
//! hover_on_settle = true
//!
//! [compositor]
//! max_overlay_width = 350
//! max_overlay_height = 300
//! overlay_offset_y = -40
//! title_padding = 18
//! target_text_width = 380
//! min_font_size = 28
//! max_font_size = 84
//! skew = 0.2
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};

use crate::compositor::CompositorSettings;
use crate::resources::packpool::PoolLayout;
use crate::resources::tuning::AnimationTuning;

const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CARDS_PER_PACK: usize = 5;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";
const DEFAULT_MANIFEST_PATH: &str = "./assets/sets.json";
const DEFAULT_FONT_PATH: &str = "./assets/fonts/title.ttf";

#[derive(Resource, Debug, Clone)]
pub struct AppConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub manifest_path: PathBuf,
    /// Title font. Covers are drawn without titles when it cannot be loaded.
    pub font_path: PathBuf,
    pub layout: PoolLayout,
    pub cards_per_pack: usize,
    pub animation: AnimationTuning,
    pub compositor: CompositorSettings,
    pub config_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an optional float key.
fn float(config: &Ini, section: &str, key: &str) -> Option<f32> {
    match config.getfloat(section, key) {
        Ok(value) => value.map(|v| v as f32),
        Err(e) => {
            warn!("Ignoring [{}] {}: {}", section, key, e);
            None
        }
    }
}

fn set_float(config: &Ini, section: &str, key: &str, slot: &mut f32) {
    if let Some(v) = float(config, section, key) {
        *slot = v;
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            layout: PoolLayout::default(),
            cards_per_pack: DEFAULT_CARDS_PER_PACK,
            animation: AnimationTuning::default(),
            compositor: CompositorSettings::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let contents = std::fs::read_to_string(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.load_from_str(&contents)?;
        info!(
            "Loaded config: {}x{} window, fps={}, layout={:?}, manifest={}",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.layout,
            self.manifest_path.display()
        );
        Ok(())
    }

    pub fn load_from_str(&mut self, contents: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(contents.to_string())
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        // [window]
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        // [assets]
        if let Some(manifest) = config.get("assets", "manifest") {
            self.manifest_path = PathBuf::from(manifest);
        }
        if let Some(font) = config.get("assets", "font") {
            self.font_path = PathBuf::from(font);
        }

        // [pool]
        if let Some(n) = config.getuint("pool", "cards_per_pack").ok().flatten() {
            self.cards_per_pack = n as usize;
        }
        let columns = config.getuint("pool", "columns").ok().flatten().map(|c| c as usize);
        let spacing = float(&config, "pool", "spacing");
        let radius = float(&config, "pool", "radius");
        let arc = float(&config, "pool", "arc");
        let kind = config.get("pool", "layout");
        self.layout = PoolLayout::from_settings(kind.as_deref(), columns, spacing, radius, arc)
            .unwrap_or_else(|e| {
                warn!("{}; keeping {:?}", e, self.layout);
                self.layout
            });

        // [animation]
        let a = &mut self.animation;
        set_float(&config, "animation", "lerp_rate", &mut a.lerp_rate);
        set_float(&config, "animation", "epsilon", &mut a.epsilon);
        set_float(&config, "animation", "spin_speed", &mut a.spin_speed);
        set_float(&config, "animation", "hover_scale", &mut a.hover_scale);
        set_float(&config, "animation", "click_scale", &mut a.click_scale);
        set_float(&config, "animation", "drop_distance", &mut a.drop_distance);
        set_float(&config, "animation", "focus_distance", &mut a.focus_distance);
        set_float(&config, "animation", "bob_amplitude", &mut a.bob_amplitude);
        set_float(&config, "animation", "bob_speed", &mut a.bob_speed);
        if let Some(v) = config.getbool("animation", "hover_on_settle").ok().flatten() {
            a.hover_on_settle = v;
        }
        if !(a.lerp_rate > 0.0 && a.lerp_rate <= 1.0) {
            warn!("lerp_rate {} out of (0, 1]; using 0.05", a.lerp_rate);
            a.lerp_rate = 0.05;
        }

        // [compositor]
        let c = &mut self.compositor;
        set_float(&config, "compositor", "max_overlay_width", &mut c.max_overlay_width);
        set_float(&config, "compositor", "max_overlay_height", &mut c.max_overlay_height);
        set_float(&config, "compositor", "overlay_offset_y", &mut c.overlay_offset_y);
        set_float(&config, "compositor", "title_padding", &mut c.title_padding);
        set_float(&config, "compositor", "base_font_ratio", &mut c.base_font_ratio);
        set_float(&config, "compositor", "target_text_width", &mut c.target_text_width);
        set_float(&config, "compositor", "min_font_size", &mut c.min_font_size);
        set_float(&config, "compositor", "max_font_size", &mut c.max_font_size);
        set_float(&config, "compositor", "skew", &mut c.skew);
        if c.min_font_size > c.max_font_size {
            warn!(
                "min_font_size {} > max_font_size {}; swapping",
                c.min_font_size, c.max_font_size
            );
            std::mem::swap(&mut c.min_font_size, &mut c.max_font_size);
        }

        Ok(())
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
