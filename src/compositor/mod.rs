//! Procedural pack cover compositing.
//!
//! A cover texture is built from three inputs: a base image that fixes the
//! canvas size, a cover overlay drawn centered on top of it, and an optional
//! set title drawn below the overlay as a sheared, outlined, gradient-filled
//! logotype.
//!
//! Submodules:
//! - [`analysis`] – dominant color, outline contrast and gradient derivation
//! - [`typography`] – title styling, glyph sizing and the [`GlyphSource`] seam
//! - [`raster`] – tiny-skia drawing of the overlay and title glyphs
//!
//! [`composite`] is the strict entry point: any load failure is an error.
//! [`composite_or_fallback`] applies the runtime policy used by the texture
//! worker, where a broken overlay still yields a base-only texture.

pub mod analysis;
pub mod raster;
pub mod typography;

use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bevy_ecs::prelude::Resource;
use image::{ImageFormat, RgbaImage};
use log::{debug, warn};
use thiserror::Error;

use analysis::{TitleGradient, dominant_color, outline_color};
use raster::{OverlayRect, TitlePlacement, TitleStyle};
use typography::{GlyphSource, TitleLayout, layout_title};

/// Tunables for overlay placement and title typography.
///
/// Defaults reproduce the look the cover art was designed against; every
/// value can be overridden in the `[compositor]` section of the config file.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CompositorSettings {
    pub max_overlay_width: f32,
    pub max_overlay_height: f32,
    /// Vertical shift applied after centering; negative moves the overlay up.
    pub overlay_offset_y: f32,
    /// Gap between the overlay bottom and the title's cap line.
    pub title_padding: f32,
    /// Initial base size as a fraction of the drawn overlay width.
    pub base_font_ratio: f32,
    pub min_base_font: f32,
    pub max_base_font: f32,
    /// Total advance the title is rescaled to.
    pub target_text_width: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Horizontal shear factor of the title.
    pub skew: f32,
    /// Outline stroke widths as fractions of the glyph size.
    pub outline_wide: f32,
    pub outline_medium: f32,
    pub outline_thin: f32,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            max_overlay_width: 350.0,
            max_overlay_height: 300.0,
            overlay_offset_y: -40.0,
            title_padding: 18.0,
            base_font_ratio: 0.2,
            min_base_font: 24.0,
            max_base_font: 72.0,
            target_text_width: 380.0,
            min_font_size: 28.0,
            max_font_size: 84.0,
            skew: 0.2,
            outline_wide: 0.18,
            outline_medium: 0.10,
            outline_thin: 0.04,
        }
    }
}

/// Where an input image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
}

impl ImageSource {
    /// Interpret a string from the manifest or command line.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("data:") {
            ImageSource::DataUri(trimmed.to_string())
        } else {
            ImageSource::Path(PathBuf::from(trimmed))
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ImageSource::Path(p) => p.as_os_str().is_empty(),
            ImageSource::Bytes(b) => b.is_empty(),
            ImageSource::DataUri(s) => s.is_empty(),
        }
    }

    /// Decode the image into straight RGBA8.
    pub fn load(&self) -> Result<RgbaImage, String> {
        match self {
            ImageSource::Path(path) => image::open(path)
                .map(|img| img.to_rgba8())
                .map_err(|e| format!("{}: {}", path.display(), e)),
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes)
                .map(|img| img.to_rgba8())
                .map_err(|e| e.to_string()),
            ImageSource::DataUri(uri) => {
                let bytes = decode_data_uri(uri)?;
                image::load_from_memory(&bytes)
                    .map(|img| img.to_rgba8())
                    .map_err(|e| e.to_string())
            }
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(p) => write!(f, "{}", p.display()),
            ImageSource::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            ImageSource::DataUri(s) => write!(f, "<data uri, {} chars>", s.len()),
        }
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;
    if !header.ends_with(";base64") {
        return Err(format!("unsupported data URI encoding '{}'", header));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

/// Which input image an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Base,
    Overlay,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Base => write!(f, "base"),
            ImageRole::Overlay => write!(f, "overlay"),
        }
    }
}

/// Inputs of one composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub base: ImageSource,
    pub overlay: ImageSource,
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("failed to load {which} image: {reason}")]
    ImageLoad { which: ImageRole, reason: String },
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidCanvasDimensions { width: u32, height: u32 },
    #[error("failed to encode preview: {0}")]
    Encode(String),
}

/// Geometry of what was drawn, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeLayout {
    pub overlay_rect: Option<OverlayRect>,
    pub title: Option<TitleLayout>,
    pub placement: Option<TitlePlacement>,
    pub style: Option<TitleStyle>,
}

/// A finished cover texture.
#[derive(Debug, Clone)]
pub struct CompositedTexture {
    /// Straight RGBA8, sRGB, top row first.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `data:image/png;base64,...`
    pub preview_data_uri: String,
    pub layout: CompositeLayout,
    /// Set when the overlay could not be loaded and only the base was drawn.
    pub fallback: bool,
}

impl CompositedTexture {
    /// PNG encoding of the texture.
    pub fn png_bytes(&self) -> Result<Vec<u8>, CompositeError> {
        encode_png(&self.pixels, self.width, self.height)
    }
}

fn load_role(source: &ImageSource, which: ImageRole) -> Result<RgbaImage, CompositeError> {
    source
        .load()
        .map_err(|reason| CompositeError::ImageLoad { which, reason })
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CompositeError> {
    let img = RgbaImage::from_raw(width, height, pixels.to_vec())
        .ok_or_else(|| CompositeError::Encode("pixel buffer does not match canvas".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CompositeError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Encode straight RGBA pixels as a PNG data URI.
pub fn encode_preview(pixels: &[u8], width: u32, height: u32) -> Result<String, CompositeError> {
    let png = encode_png(pixels, width, height)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Load both images and composite them. Any load failure is returned.
pub fn composite(
    request: &TextureRequest,
    glyphs: Option<&dyn GlyphSource>,
    settings: &CompositorSettings,
) -> Result<CompositedTexture, CompositeError> {
    let base = load_role(&request.base, ImageRole::Base)?;
    let overlay = load_role(&request.overlay, ImageRole::Overlay)?;
    compose_images(&base, Some(&overlay), request.title.as_deref(), glyphs, settings)
}

/// Like [`composite`], but a failing overlay degrades to a base-only texture
/// flagged with `fallback`. A failing base is still an error.
pub fn composite_or_fallback(
    request: &TextureRequest,
    glyphs: Option<&dyn GlyphSource>,
    settings: &CompositorSettings,
) -> Result<CompositedTexture, CompositeError> {
    let base = load_role(&request.base, ImageRole::Base)?;
    match load_role(&request.overlay, ImageRole::Overlay) {
        Ok(overlay) => {
            compose_images(&base, Some(&overlay), request.title.as_deref(), glyphs, settings)
        }
        Err(e) => {
            warn!("{}; using base texture only", e);
            let mut texture = compose_images(&base, None, None, glyphs, settings)?;
            texture.fallback = true;
            Ok(texture)
        }
    }
}

/// Composite already decoded images.
///
/// The title is only drawn together with an overlay, since its baseline hangs
/// off the overlay's bottom edge.
pub fn compose_images(
    base: &RgbaImage,
    overlay: Option<&RgbaImage>,
    title: Option<&str>,
    glyphs: Option<&dyn GlyphSource>,
    settings: &CompositorSettings,
) -> Result<CompositedTexture, CompositeError> {
    let (width, height) = base.dimensions();
    let invalid = CompositeError::InvalidCanvasDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    let mut canvas = raster::pixmap_from_rgba(base).ok_or(invalid)?;
    let mut layout = CompositeLayout::default();

    if let Some(overlay) = overlay {
        match raster::pixmap_from_rgba(overlay) {
            Some(overlay_pixmap) => {
                let (ow, oh) = overlay.dimensions();
                let rect = raster::place_overlay(width, height, ow, oh, settings);
                raster::draw_overlay(&mut canvas, &overlay_pixmap, rect);
                layout.overlay_rect = Some(rect);

                let title = title.map(str::trim).filter(|t| !t.is_empty());
                match (title, glyphs) {
                    (Some(title), Some(glyphs)) => {
                        if let Some(title_layout) =
                            layout_title(title, rect.width, glyphs, settings)
                        {
                            let style = TitleStyle {
                                gradient: TitleGradient::from_dominant(dominant_color(overlay)),
                                outline: outline_color(overlay),
                            };
                            let placement =
                                raster::place_title(width, rect, &title_layout, settings);
                            debug!(
                                "Title '{}' at base size {:.1}, width {:.1}",
                                title, title_layout.base_size, title_layout.width
                            );
                            raster::draw_title(
                                &mut canvas,
                                &title_layout,
                                placement,
                                &style,
                                glyphs,
                                settings,
                            );
                            layout.title = Some(title_layout);
                            layout.placement = Some(placement);
                            layout.style = Some(style);
                        }
                    }
                    (Some(title), None) => {
                        warn!("No title font loaded; drawing '{}' cover without title", title);
                    }
                    _ => {}
                }
            }
            None => warn!("Overlay image has zero size; skipping it"),
        }
    }

    let pixels = raster::pixmap_to_rgba(&canvas);
    let preview_data_uri = encode_preview(&pixels, width, height)?;
    Ok(CompositedTexture {
        pixels,
        width,
        height,
        preview_data_uri,
        layout,
        fallback: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::typography::GlyphBitmap;
    use image::Rgba;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    fn png_source(img: &RgbaImage) -> ImageSource {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        ImageSource::Bytes(out.into_inner().into())
    }

    fn pixel(tex: &CompositedTexture, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * tex.width + x) * 4) as usize;
        [tex.pixels[i], tex.pixels[i + 1], tex.pixels[i + 2], tex.pixels[i + 3]]
    }

    /// Every glyph is a solid square of `0.6 × size`.
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

    // ==================== IMAGE SOURCES ====================

    #[test]
    fn test_parse_image_source() {
        assert_eq!(
            ImageSource::parse(" covers/space.png "),
            ImageSource::Path(PathBuf::from("covers/space.png"))
        );
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUri(_)
        ));
        assert!(ImageSource::parse("").is_empty());
    }

    #[test]
    fn test_data_uri_round_trip() {
        let img = solid(4, 3, [1, 2, 3, 255]);
        let tex = compose_images(&img, None, None, None, &CompositorSettings::default()).unwrap();
        let decoded = ImageSource::parse(&tex.preview_data_uri).load().unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_data_uri_requires_base64() {
        let err = ImageSource::DataUri("data:image/png,rawbytes".to_string())
            .load()
            .unwrap_err();
        assert!(err.contains("unsupported"));
    }

    // ==================== COMPOSITING ====================

    #[test]
    fn test_canvas_keeps_base_size() {
        let base = solid(300, 200, [20, 20, 20, 255]);
        let overlay = solid(600, 600, [200, 0, 0, 255]);
        let tex = compose_images(&base, Some(&overlay), None, None, &CompositorSettings::default())
            .unwrap();
        assert_eq!((tex.width, tex.height), (300, 200));
        assert_eq!(tex.pixels.len(), 300 * 200 * 4);
        assert!(tex.preview_data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_overlay_drawn_centered_with_offset() {
        let settings = CompositorSettings::default();
        let base = solid(512, 512, [0, 0, 255, 255]);
        let overlay = solid(200, 100, [255, 0, 0, 255]);
        let tex = compose_images(&base, Some(&overlay), None, None, &settings).unwrap();

        let rect = tex.layout.overlay_rect.unwrap();
        assert_eq!((rect.width, rect.height), (200.0, 100.0));
        // center of the overlay
        assert_eq!(pixel(&tex, 256, 216), [255, 0, 0, 255]);
        // untouched base below the overlay
        assert_eq!(pixel(&tex, 256, 300), [0, 0, 255, 255]);
        assert_eq!(pixel(&tex, 10, 10), [0, 0, 255, 255]);
    }

    #[test]
    fn test_zero_sized_base_is_rejected() {
        let base = RgbaImage::new(0, 10);
        let err = compose_images(&base, None, None, None, &CompositorSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CompositeError::InvalidCanvasDimensions { width: 0, height: 10 }
        ));
    }

    #[test]
    fn test_title_drawn_below_overlay() {
        let settings = CompositorSettings::default();
        let base = solid(512, 512, [0, 0, 255, 255]);
        let overlay = solid(200, 100, [255, 255, 255, 255]);
        let plain = compose_images(&base, Some(&overlay), None, None, &settings).unwrap();
        let titled =
            compose_images(&base, Some(&overlay), Some("Space"), Some(&Blocks), &settings).unwrap();

        let style = titled.layout.style.unwrap();
        assert_eq!(style.outline, analysis::OutlineColor::Black);

        let bottom = titled.layout.overlay_rect.unwrap().bottom() as usize;
        let changed = (bottom * 512 * 4..plain.pixels.len())
            .any(|i| plain.pixels[i] != titled.pixels[i]);
        assert!(changed);
        // nothing above the overlay bottom is touched by the title
        assert_eq!(
            &plain.pixels[..(bottom - 1) * 512 * 4],
            &titled.pixels[..(bottom - 1) * 512 * 4]
        );
    }

    #[test]
    fn test_title_skipped_without_font() {
        let settings = CompositorSettings::default();
        let base = solid(64, 64, [0, 0, 0, 255]);
        let overlay = solid(10, 10, [255, 0, 0, 255]);
        let tex = compose_images(&base, Some(&overlay), Some("Space"), None, &settings).unwrap();
        assert!(tex.layout.title.is_none());
        assert!(tex.layout.overlay_rect.is_some());
    }

    // ==================== ERROR POLICY ====================

    #[test]
    fn test_composite_reports_failing_overlay() {
        let request = TextureRequest {
            base: png_source(&solid(8, 8, [0, 0, 0, 255])),
            overlay: ImageSource::Path(PathBuf::from("/nonexistent/overlay.png")),
            title: None,
        };
        let err = composite(&request, None, &CompositorSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            CompositeError::ImageLoad { which: ImageRole::Overlay, .. }
        ));
    }

    #[test]
    fn test_fallback_on_failing_overlay() {
        let request = TextureRequest {
            base: png_source(&solid(8, 8, [9, 9, 9, 255])),
            overlay: ImageSource::Path(PathBuf::from("/nonexistent/overlay.png")),
            title: Some("Space".to_string()),
        };
        let tex = composite_or_fallback(&request, None, &CompositorSettings::default()).unwrap();
        assert!(tex.fallback);
        assert!(tex.layout.overlay_rect.is_none());
        assert_eq!(pixel(&tex, 4, 4), [9, 9, 9, 255]);
    }

    #[test]
    fn test_fallback_still_fails_on_base() {
        let request = TextureRequest {
            base: ImageSource::Bytes(Arc::from(&b"not an image"[..])),
            overlay: png_source(&solid(8, 8, [0, 0, 0, 255])),
            title: None,
        };
        let err = composite_or_fallback(&request, None, &CompositorSettings::default())
            .unwrap_err();
        assert!(matches!(err, CompositeError::ImageLoad { which: ImageRole::Base, .. }));
    }
}
