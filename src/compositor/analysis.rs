//! Color analysis of cover overlays.
//!
//! These helpers look at the overlay image once per composite and derive the
//! colors used to draw the title logotype:
//!
//! - [`dominant_color`] – most frequent quantized color among opaque pixels
//! - [`outline_color`] – black or white, whichever contrasts with the overlay
//! - [`TitleGradient`] – light/dark variants of the dominant color
//!
//! Transparent and partially transparent pixels never take part in any of
//! these computations.

use image::RgbaImage;
use rustc_hash::FxHashMap;

/// Plain 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Sampling stride (in pixels, both axes) for dominant color extraction.
pub const DOMINANT_SAMPLE_STRIDE: u32 = 4;
/// Sampling stride (in pixels, both axes) for contrast estimation.
pub const CONTRAST_SAMPLE_STRIDE: u32 = 8;
/// Width of a quantization bucket per channel.
const BUCKET_SIZE: u8 = 16;

/// Perceptual luminance of a color, normalized to `[0, 1]`.
pub fn luminance(rgb: Rgb) -> f32 {
    (0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32) / 255.0
}

/// Snap every channel down to its 16-level bucket.
pub fn quantize(rgb: Rgb) -> Rgb {
    rgb.map(|c| c / BUCKET_SIZE * BUCKET_SIZE)
}

/// Iterate the fully opaque pixels of a grid sampled every `stride` pixels.
fn opaque_samples(image: &RgbaImage, stride: u32) -> impl Iterator<Item = Rgb> + '_ {
    let stride = stride.max(1) as usize;
    let (w, h) = image.dimensions();
    (0..h)
        .step_by(stride)
        .flat_map(move |y| (0..w).step_by(stride).map(move |x| image.get_pixel(x, y)))
        .filter(|px| px[3] == 255)
        .map(|px| [px[0], px[1], px[2]])
}

/// Most frequent 16-quantized color among the overlay's opaque pixels.
///
/// Ties are broken towards the numerically smallest bucket so the result
/// does not depend on hash iteration order. Returns `[0, 0, 0]` when no
/// opaque pixel was sampled.
pub fn dominant_color(image: &RgbaImage) -> Rgb {
    let mut buckets: FxHashMap<Rgb, u32> = FxHashMap::default();
    for rgb in opaque_samples(image, DOMINANT_SAMPLE_STRIDE) {
        *buckets.entry(quantize(rgb)).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .max_by(|(color_a, count_a), (color_b, count_b)| {
            count_a.cmp(count_b).then_with(|| color_b.cmp(color_a))
        })
        .map(|(color, _)| color)
        .unwrap_or([0, 0, 0])
}

/// Outline color drawn around the title glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineColor {
    Black,
    White,
}

impl OutlineColor {
    pub fn rgb(self) -> Rgb {
        match self {
            OutlineColor::Black => [0, 0, 0],
            OutlineColor::White => [255, 255, 255],
        }
    }
}

/// Mean luminance of the overlay's opaque pixels, if any were sampled.
pub fn mean_luminance(image: &RgbaImage) -> Option<f32> {
    let (sum, count) = opaque_samples(image, CONTRAST_SAMPLE_STRIDE)
        .fold((0.0f32, 0u32), |(sum, count), rgb| (sum + luminance(rgb), count + 1));
    (count > 0).then(|| sum / count as f32)
}

/// Black over bright overlays, white over dark ones. Black when nothing opaque was found.
pub fn outline_color(image: &RgbaImage) -> OutlineColor {
    match mean_luminance(image) {
        Some(l) if l <= 0.5 => OutlineColor::White,
        _ => OutlineColor::Black,
    }
}

/// Fill colors for the title, derived from the dominant color.
///
/// The fill runs `light → dark → light` across the text's horizontal extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleGradient {
    pub light: Rgb,
    pub dark: Rgb,
}

impl TitleGradient {
    /// Light = 30% toward white; dark = darken 40%, then boost 20%, clamped.
    pub fn from_dominant(color: Rgb) -> Self {
        let light = color.map(|c| {
            (c as f32 + (255.0 - c as f32) * 0.3)
                .round()
                .clamp(0.0, 255.0) as u8
        });
        let dark = color.map(|c| (c as f32 * 0.6 * 1.2).round().clamp(0.0, 255.0) as u8);
        Self { light, dark }
    }

    /// Stops at positions 0.0, 0.5 and 1.0.
    pub fn stops(&self) -> [(f32, Rgb); 3] {
        [(0.0, self.light), (0.5, self.dark), (1.0, self.light)]
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

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    // ==================== LUMINANCE ====================

    #[test]
    fn test_luminance_extremes() {
        assert!(approx_eq(luminance([255, 255, 255]), 1.0));
        assert!(approx_eq(luminance([0, 0, 0]), 0.0));
    }

    #[test]
    fn test_luminance_weights_green_highest() {
        assert!(luminance([0, 255, 0]) > luminance([255, 0, 0]));
        assert!(luminance([255, 0, 0]) > luminance([0, 0, 255]));
    }

    #[test]
    fn test_quantize_buckets() {
        assert_eq!(quantize([200, 100, 50]), [192, 96, 48]);
        assert_eq!(quantize([15, 16, 255]), [0, 16, 240]);
    }

    // ==================== DOMINANT COLOR ====================

    #[test]
    fn test_dominant_color_ignores_transparent_pixels() {
        // 90% opaque orange, 10% transparent pixels with a different RGB
        let mut img = solid(40, 40, [200, 100, 50, 255]);
        for y in 0..4 {
            for x in 0..40 {
                img.put_pixel(x, y, Rgba([10, 250, 10, 0]));
            }
        }
        assert_eq!(dominant_color(&img), [192, 96, 48]);
    }

    #[test]
    fn test_dominant_color_skips_semi_transparent() {
        let mut img = solid(16, 16, [30, 30, 30, 254]);
        img.put_pixel(0, 0, Rgba([128, 0, 0, 255]));
        assert_eq!(dominant_color(&img), [128, 0, 0]);
    }

    #[test]
    fn test_dominant_color_fallback_black() {
        let img = solid(16, 16, [255, 255, 255, 0]);
        assert_eq!(dominant_color(&img), [0, 0, 0]);
    }

    #[test]
    fn test_dominant_color_majority_wins() {
        let mut img = solid(32, 32, [0, 0, 200, 255]);
        for y in 0..8 {
            for x in 0..32 {
                img.put_pixel(x, y, Rgba([250, 250, 0, 255]));
            }
        }
        assert_eq!(dominant_color(&img), [0, 0, 192]);
    }

    // ==================== OUTLINE COLOR ====================

    #[test]
    fn test_outline_black_over_white() {
        assert_eq!(outline_color(&solid(64, 64, [255, 255, 255, 255])), OutlineColor::Black);
    }

    #[test]
    fn test_outline_white_over_black() {
        assert_eq!(outline_color(&solid(64, 64, [0, 0, 0, 255])), OutlineColor::White);
    }

    #[test]
    fn test_outline_default_black_without_opaque_pixels() {
        assert_eq!(outline_color(&solid(64, 64, [0, 0, 0, 0])), OutlineColor::Black);
        assert!(mean_luminance(&solid(8, 8, [0, 0, 0, 0])).is_none());
    }

    #[test]
    fn test_outline_color_rgb() {
        assert_eq!(OutlineColor::Black.rgb(), [0, 0, 0]);
        assert_eq!(OutlineColor::White.rgb(), [255, 255, 255]);
    }

    // ==================== GRADIENT ====================

    #[test]
    fn test_gradient_light_moves_toward_white() {
        let g = TitleGradient::from_dominant([105, 15, 255]);
        assert_eq!(g.light, [150, 87, 255]);
    }

    #[test]
    fn test_gradient_dark_is_darkened_then_boosted() {
        let g = TitleGradient::from_dominant([105, 15, 255]);
        // 105 * 0.72 = 75.6, 15 * 0.72 = 10.8, 255 * 0.72 = 183.6
        assert_eq!(g.dark, [76, 11, 184]);
    }

    #[test]
    fn test_gradient_stops_are_symmetric() {
        let g = TitleGradient::from_dominant([64, 128, 192]);
        let stops = g.stops();
        assert_eq!(stops[0].1, stops[2].1);
        assert_eq!(stops[1].1, g.dark);
        assert!(approx_eq(stops[1].0, 0.5));
    }
}
