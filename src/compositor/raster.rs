//! Software rasterization of the composite canvas.
//!
//! All drawing goes through `tiny-skia` pixmaps, which store premultiplied
//! sRGB bytes. Decoded images are premultiplied on the way in and the final
//! canvas is demultiplied on the way out, so callers only ever see straight
//! RGBA.
//!
//! Title glyphs are drawn one by one into a small layer pixmap (two outline
//! strokes, the gradient fill, one more outline stroke) and the layer is
//! blitted onto the canvas through a horizontal shear.

use image::RgbaImage;
use tiny_skia::{
    BlendMode, Color, FilterQuality, GradientStop, LinearGradient, Mask, Paint, Pixmap,
    PixmapPaint, Point, Rect, SpreadMode, Transform,
};

use crate::compositor::CompositorSettings;
use crate::compositor::analysis::{OutlineColor, Rgb, TitleGradient};
use crate::compositor::typography::{GlyphBitmap, GlyphSource, TitleLayout};

/// Cap height as a fraction of the glyph size, used to place the baseline.
const CAP_HEIGHT_RATIO: f32 = 0.72;

pub(crate) fn premultiply_rgba_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

/// Copy a straight-alpha image into a new premultiplied pixmap.
pub(crate) fn pixmap_from_rgba(image: &RgbaImage) -> Option<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height)?;
    let mut rgba = image.as_raw().clone();
    premultiply_rgba_in_place(&mut rgba);
    pixmap.data_mut().copy_from_slice(&rgba);
    Some(pixmap)
}

/// Straight-alpha RGBA bytes of a pixmap.
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Where the overlay lands on the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayRect {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Fit the overlay into the maximum box (never upscaling), center it
/// horizontally and vertically, then shift it by the configured offset.
pub fn place_overlay(
    canvas_width: u32,
    canvas_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    settings: &CompositorSettings,
) -> OverlayRect {
    let (ow, oh) = (overlay_width.max(1) as f32, overlay_height.max(1) as f32);
    let scale = (settings.max_overlay_width / ow)
        .min(settings.max_overlay_height / oh)
        .min(1.0);
    let width = ow * scale;
    let height = oh * scale;
    OverlayRect {
        x: (canvas_width as f32 - width) * 0.5,
        y: (canvas_height as f32 - height) * 0.5 + settings.overlay_offset_y,
        width,
        height,
    }
}

pub(crate) fn draw_overlay(canvas: &mut Pixmap, overlay: &Pixmap, rect: OverlayRect) {
    let sx = rect.width / overlay.width() as f32;
    let sy = rect.height / overlay.height() as f32;
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Bilinear,
    };
    let transform = Transform::from_row(sx, 0.0, 0.0, sy, rect.x, rect.y);
    canvas.draw_pixmap(0, 0, overlay.as_ref(), &paint, transform, None);
}

/// Pen origin of the title run on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitlePlacement {
    /// Unsheared x of the first glyph's pen position.
    pub start_x: f32,
    pub baseline_y: f32,
    /// Horizontal shear factor; canvas x = x − skew · y.
    pub skew: f32,
}

impl TitlePlacement {
    /// Map an unsheared point to canvas coordinates.
    pub fn shear(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.skew * y, y)
    }
}

/// Put the title below the overlay and center it optically on the canvas.
///
/// The shear moves every row sideways by `skew · y`; the start position is
/// shifted back by the displacement at the text's mid-cap line so the sheared
/// run is centered on the canvas midpoint.
pub fn place_title(
    canvas_width: u32,
    overlay: OverlayRect,
    layout: &TitleLayout,
    settings: &CompositorSettings,
) -> TitlePlacement {
    let cap = layout.max_size() * CAP_HEIGHT_RATIO;
    let baseline_y = overlay.bottom() + settings.title_padding + cap;
    let optical_y = baseline_y - cap * 0.5;
    TitlePlacement {
        start_x: canvas_width as f32 * 0.5 - layout.width * 0.5 + settings.skew * optical_y,
        baseline_y,
        skew: settings.skew,
    }
}

/// Colors used for the title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleStyle {
    pub gradient: TitleGradient,
    pub outline: OutlineColor,
}

fn solid_paint(rgb: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint
}

fn gradient_paint(gradient: &TitleGradient, x0: f32, x1: f32) -> Paint<'static> {
    let stops = gradient
        .stops()
        .iter()
        .map(|(pos, c)| GradientStop::new(*pos, Color::from_rgba8(c[0], c[1], c[2], 255)))
        .collect();
    match LinearGradient::new(
        Point::from_xy(x0, 0.0),
        Point::from_xy(x1, 0.0),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    ) {
        Some(shader) => {
            let mut paint = Paint::default();
            paint.shader = shader;
            paint
        }
        None => solid_paint(gradient.dark),
    }
}

/// Separable square max (grow) or min (shrink) filter over a coverage buffer.
/// Samples outside the buffer count as empty.
fn morph(src: &[u8], w: usize, h: usize, radius: usize, grow: bool) -> Vec<u8> {
    if radius == 0 {
        return src.to_vec();
    }
    let r = radius as isize;
    let pick = |a: u8, b: u8| if grow { a.max(b) } else { a.min(b) };
    let init = if grow { 0 } else { 255 };

    let mut tmp = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = init;
            for dx in -r..=r {
                let sx = x as isize + dx;
                let v = if sx >= 0 && (sx as usize) < w { src[y * w + sx as usize] } else { 0 };
                acc = pick(acc, v);
            }
            tmp[y * w + x] = acc;
        }
    }

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = init;
            for dy in -r..=r {
                let sy = y as isize + dy;
                let v = if sy >= 0 && (sy as usize) < h { tmp[sy as usize * w + x] } else { 0 };
                acc = pick(acc, v);
            }
            out[y * w + x] = acc;
        }
    }
    out
}

/// Coverage of a stroke of width `2 · radius` centered on the glyph outline.
pub(crate) fn stroke_ring(coverage: &[u8], w: usize, h: usize, radius: usize) -> Vec<u8> {
    let grown = morph(coverage, w, h, radius, true);
    let shrunk = morph(coverage, w, h, radius, false);
    grown
        .iter()
        .zip(shrunk.iter())
        .map(|(g, s)| g.saturating_sub(*s))
        .collect()
}

fn stroke_radius(line_width: f32) -> usize {
    ((line_width * 0.5).round() as usize).max(1)
}

/// Copy the glyph bitmap into a buffer with `pad` empty pixels on every side.
fn pad_coverage(bitmap: &GlyphBitmap, pad: usize) -> (Vec<u8>, usize, usize) {
    let w = bitmap.width + pad * 2;
    let h = bitmap.height + pad * 2;
    let mut out = vec![0u8; w * h];
    for row in 0..bitmap.height {
        let src = &bitmap.coverage[row * bitmap.width..(row + 1) * bitmap.width];
        let start = (row + pad) * w + pad;
        out[start..start + bitmap.width].copy_from_slice(src);
    }
    (out, w, h)
}

fn fill_masked(layer: &mut Pixmap, coverage: &[u8], paint: &Paint) {
    let (w, h) = (layer.width(), layer.height());
    let Some(mut mask) = Mask::new(w, h) else {
        return;
    };
    mask.data_mut().copy_from_slice(coverage);
    if let Some(rect) = Rect::from_xywh(0.0, 0.0, w as f32, h as f32) {
        layer.fill_rect(rect, paint, Transform::identity(), Some(&mask));
    }
}

/// Draw the laid out title onto the canvas.
pub(crate) fn draw_title(
    canvas: &mut Pixmap,
    layout: &TitleLayout,
    placement: TitlePlacement,
    style: &TitleStyle,
    glyphs: &dyn GlyphSource,
    settings: &CompositorSettings,
) {
    let shear = Transform::from_row(1.0, 0.0, -placement.skew, 1.0, 0.0, 0.0);
    let outline = solid_paint(style.outline.rgb());
    let blit = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Bilinear,
    };

    for glyph in &layout.glyphs {
        if glyph.ch.is_whitespace() {
            continue;
        }
        let bitmap = glyphs.rasterize(glyph.ch, glyph.size);
        if bitmap.is_empty() || bitmap.coverage.len() < bitmap.width * bitmap.height {
            continue;
        }

        let wide = stroke_radius(glyph.size * settings.outline_wide);
        let medium = stroke_radius(glyph.size * settings.outline_medium);
        let thin = stroke_radius(glyph.size * settings.outline_thin);
        let pad = wide.max(medium).max(thin) + 1;
        let (coverage, w, h) = pad_coverage(&bitmap, pad);
        let Some(mut layer) = Pixmap::new(w as u32, h as u32) else {
            continue;
        };

        let origin_x = placement.start_x + glyph.x + bitmap.xmin as f32 - pad as f32;
        let origin_y =
            placement.baseline_y - (bitmap.height as i32 + bitmap.ymin) as f32 - pad as f32;

        fill_masked(&mut layer, &stroke_ring(&coverage, w, h, wide), &outline);
        fill_masked(&mut layer, &stroke_ring(&coverage, w, h, medium), &outline);
        let fill = gradient_paint(
            &style.gradient,
            placement.start_x - origin_x,
            placement.start_x + layout.width - origin_x,
        );
        fill_masked(&mut layer, &coverage, &fill);
        fill_masked(&mut layer, &stroke_ring(&coverage, w, h, thin), &outline);

        canvas.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &blit,
            shear.pre_translate(origin_x, origin_y),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    // ==================== PIXMAP CONVERSION ====================

    #[test]
    fn test_premultiply_keeps_opaque_pixels() {
        let mut data = vec![200, 100, 50, 255, 200, 100, 50, 0];
        premultiply_rgba_in_place(&mut data);
        assert_eq!(&data[..4], &[200, 100, 50, 255]);
        assert_eq!(&data[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_pixmap_round_trip_opaque() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let pixmap = pixmap_from_rgba(&img).unwrap();
        assert_eq!(pixmap_to_rgba(&pixmap), img.into_raw());
    }

    #[test]
    fn test_pixmap_from_empty_image_fails() {
        let img = RgbaImage::new(0, 0);
        assert!(pixmap_from_rgba(&img).is_none());
    }

    // ==================== OVERLAY PLACEMENT ====================

    #[test]
    fn test_place_overlay_never_upscales() {
        let s = CompositorSettings::default();
        let rect = place_overlay(512, 512, 200, 100, &s);
        assert!(approx_eq(rect.width, 200.0));
        assert!(approx_eq(rect.height, 100.0));
        assert!(approx_eq(rect.x, 156.0));
        assert!(approx_eq(rect.y, 206.0 + s.overlay_offset_y));
    }

    #[test]
    fn test_place_overlay_fits_wide_image() {
        let s = CompositorSettings::default();
        let rect = place_overlay(1024, 1024, 700, 200, &s);
        assert!(approx_eq(rect.width, 350.0));
        assert!(approx_eq(rect.height, 100.0));
    }

    #[test]
    fn test_place_overlay_fits_tall_image() {
        let s = CompositorSettings::default();
        let rect = place_overlay(1024, 1024, 300, 600, &s);
        assert!(approx_eq(rect.height, 300.0));
        assert!(approx_eq(rect.width, 150.0));
        assert!(approx_eq(rect.x + rect.width * 0.5, 512.0));
    }

    // ==================== TITLE PLACEMENT ====================

    #[test]
    fn test_place_title_sits_below_overlay_and_centers_optically() {
        let s = CompositorSettings::default();
        let overlay = place_overlay(512, 512, 200, 100, &s);
        let layout = TitleLayout {
            glyphs: Vec::new(),
            base_size: 40.0,
            width: 300.0,
        };
        let p = place_title(512, overlay, &layout, &s);
        assert!(p.baseline_y > overlay.bottom() + s.title_padding);

        let cap = 40.0 * CAP_HEIGHT_RATIO;
        let optical_y = p.baseline_y - cap * 0.5;
        let (left, _) = p.shear(p.start_x, optical_y);
        let (right, _) = p.shear(p.start_x + layout.width, optical_y);
        assert!(approx_eq((left + right) * 0.5, 256.0));
    }

    // ==================== STROKES ====================

    #[test]
    fn test_stroke_ring_surrounds_edges_only() {
        // 9x9 buffer with a 3x3 solid square in the middle
        let (w, h) = (9, 9);
        let mut cov = vec![0u8; w * h];
        for y in 3..6 {
            for x in 3..6 {
                cov[y * w + x] = 255;
            }
        }
        let ring = stroke_ring(&cov, w, h, 1);
        assert_eq!(ring[4 * w + 4], 0); // deep interior stays unstroked
        assert_eq!(ring[3 * w + 3], 255); // outline pixel
        assert_eq!(ring[2 * w + 2], 255); // one pixel outside
        assert_eq!(ring[0], 0); // far outside
    }

    #[test]
    fn test_stroke_radius_minimum_one() {
        assert_eq!(stroke_radius(0.1), 1);
        assert_eq!(stroke_radius(8.0), 4);
    }

    #[test]
    fn test_pad_coverage_offsets_rows() {
        let bitmap = GlyphBitmap {
            width: 2,
            height: 1,
            xmin: 0,
            ymin: 0,
            coverage: vec![7, 9],
        };
        let (out, w, h) = pad_coverage(&bitmap, 1);
        assert_eq!((w, h), (4, 3));
        assert_eq!(&out[w..2 * w], &[0, 7, 9, 0]);
    }
}
