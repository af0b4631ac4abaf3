//! Title typography: word-aware glyph sizing and layout.
//!
//! The title is uppercased and split into words. The first letter of every
//! major word is emphasized (drawn at [`EMPHASIS_SCALE`] × the base size);
//! words in [`MINOR_WORDS`] are never emphasized. The base size starts from a
//! value proportional to the overlay width and the whole run is then rescaled
//! uniformly so its total advance matches the configured target width.
//!
//! Glyph metrics come from a [`GlyphSource`]; the production source is a
//! [`fontdue::Font`].

use std::path::Path;

use log::info;

use crate::compositor::CompositorSettings;

/// Words that never receive first-letter emphasis.
pub const MINOR_WORDS: [&str; 13] = [
    "&", "AND", "THE", "OF", "A", "AN", "TO", "FOR", "IN", "ON", "AT", "BY", "WITH",
];

/// Size multiplier applied to the first letter of a major word.
pub const EMPHASIS_SCALE: f32 = 1.2;

/// Coverage bitmap of one rasterized glyph.
///
/// `xmin` is the horizontal offset from the pen position to the bitmap's left
/// edge; `ymin` is the offset from the baseline to the bitmap's bottom edge
/// (positive upwards), matching fontdue's metrics.
#[derive(Debug, Clone, Default)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Supplies glyph advances and coverage bitmaps at a given pixel size.
pub trait GlyphSource: Send + Sync {
    /// Horizontal advance of `ch` at `px` pixels.
    fn advance(&self, ch: char, px: f32) -> f32;
    /// Rasterize `ch` at `px` pixels.
    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap;
}

impl GlyphSource for fontdue::Font {
    fn advance(&self, ch: char, px: f32) -> f32 {
        self.metrics(ch, px).advance_width
    }

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let (metrics, coverage) = fontdue::Font::rasterize(self, ch, px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        }
    }
}

/// Load a TrueType/OpenType font used for titles.
pub fn load_font(path: impl AsRef<Path>) -> Result<fontdue::Font, String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read font {}: {}", path.display(), e))?;
    let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
        .map_err(|e| format!("Failed to parse font {}: {}", path.display(), e))?;
    info!("Loaded title font from {}", path.display());
    Ok(font)
}

/// One character of the uppercased title and whether it is emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledChar {
    pub ch: char,
    pub emphasized: bool,
}

impl StyledChar {
    pub fn scale(&self) -> f32 {
        if self.emphasized { EMPHASIS_SCALE } else { 1.0 }
    }
}

/// Whether an (uppercased) word belongs to the minor-word set.
pub fn is_minor_word(word: &str) -> bool {
    MINOR_WORDS.contains(&word)
}

/// Uppercase the title and mark the first letter of each major word.
///
/// Words are separated by single spaces in the output regardless of the
/// whitespace found in the input.
pub fn style_title(title: &str) -> Vec<StyledChar> {
    let upper = title.to_uppercase();
    let mut out = Vec::with_capacity(upper.len());
    for (i, word) in upper.split_whitespace().enumerate() {
        if i > 0 {
            out.push(StyledChar {
                ch: ' ',
                emphasized: false,
            });
        }
        let major = !is_minor_word(word);
        for (j, ch) in word.chars().enumerate() {
            out.push(StyledChar {
                ch,
                emphasized: major && j == 0,
            });
        }
    }
    out
}

/// A glyph positioned along the title run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    /// Pixel size the glyph is drawn at.
    pub size: f32,
    /// Pen offset from the start of the run (unsheared).
    pub x: f32,
    pub advance: f32,
}

/// Result of laying out the title at its final size.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleLayout {
    pub glyphs: Vec<PlacedGlyph>,
    /// Final size of a non-emphasized glyph.
    pub base_size: f32,
    /// Total advance of the run.
    pub width: f32,
}

impl TitleLayout {
    /// Largest glyph size in the run.
    pub fn max_size(&self) -> f32 {
        self.glyphs
            .iter()
            .map(|g| g.size)
            .fold(self.base_size, f32::max)
    }

    /// Glyph at position `index` of the laid out run, spaces included.
    pub fn glyph(&self, index: usize) -> Option<&PlacedGlyph> {
        self.glyphs.get(index)
    }
}

fn run_width(chars: &[StyledChar], base: f32, glyphs: &dyn GlyphSource) -> f32 {
    chars
        .iter()
        .map(|c| glyphs.advance(c.ch, base * c.scale()))
        .sum()
}

/// Lay out the title for an overlay of the given (drawn) width.
///
/// Returns `None` when the title has no visible characters.
pub fn layout_title(
    title: &str,
    overlay_width: f32,
    glyphs: &dyn GlyphSource,
    settings: &CompositorSettings,
) -> Option<TitleLayout> {
    let chars = style_title(title);
    if chars.is_empty() {
        return None;
    }

    let initial = (overlay_width * settings.base_font_ratio)
        .clamp(settings.min_base_font, settings.max_base_font);
    let measured = run_width(&chars, initial, glyphs);
    let base_size = if measured > 0.0 {
        initial * settings.target_text_width / measured
    } else {
        initial
    }
    .clamp(settings.min_font_size, settings.max_font_size);

    let mut pen = 0.0;
    let placed = chars
        .iter()
        .map(|c| {
            let size = base_size * c.scale();
            let advance = glyphs.advance(c.ch, size);
            let glyph = PlacedGlyph {
                ch: c.ch,
                size,
                x: pen,
                advance,
            };
            pen += advance;
            glyph
        })
        .collect();

    Some(TitleLayout {
        glyphs: placed,
        base_size,
        width: pen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Monospace source: every glyph advances 0.5 × size.
    struct HalfEm;

    impl GlyphSource for HalfEm {
        fn advance(&self, _ch: char, px: f32) -> f32 {
            px * 0.5
        }
        fn rasterize(&self, _ch: char, _px: f32) -> GlyphBitmap {
            GlyphBitmap::default()
        }
    }

    // ==================== STYLING ====================

    #[test]
    fn test_style_title_uppercases_and_emphasizes_major_words() {
        let styled = style_title("Space Explorers");
        let text: String = styled.iter().map(|c| c.ch).collect();
        assert_eq!(text, "SPACE EXPLORERS");
        assert!(styled[0].emphasized); // S
        assert!(!styled[1].emphasized); // P
        assert!(!styled[5].emphasized); // space
        assert!(styled[6].emphasized); // E
        assert!(!styled[7].emphasized); // X
    }

    #[test]
    fn test_style_title_minor_words_never_emphasized() {
        let styled = style_title("lord of the rings & more");
        let flags: Vec<(char, bool)> = styled
            .iter()
            .filter(|c| c.emphasized)
            .map(|c| (c.ch, c.emphasized))
            .collect();
        assert_eq!(flags, vec![('L', true), ('R', true), ('M', true)]);
    }

    #[test]
    fn test_style_title_minor_word_first_still_plain() {
        let styled = style_title("The Machine");
        assert!(!styled[0].emphasized);
        assert!(styled[4].emphasized);
    }

    #[test]
    fn test_style_title_collapses_whitespace() {
        let text: String = style_title("  deep   learning ").iter().map(|c| c.ch).collect();
        assert_eq!(text, "DEEP LEARNING");
    }

    #[test]
    fn test_style_title_empty() {
        assert!(style_title("   ").is_empty());
    }

    #[test]
    fn test_is_minor_word() {
        for w in MINOR_WORDS {
            assert!(is_minor_word(w));
        }
        assert!(!is_minor_word("SPACE"));
        assert!(!is_minor_word("and")); // input is expected uppercased
    }

    // ==================== LAYOUT ====================

    #[test]
    fn test_layout_matches_target_width() {
        let settings = CompositorSettings::default();
        let layout = layout_title("Space Explorers", 200.0, &HalfEm, &settings).unwrap();
        assert!(approx_eq(layout.width, settings.target_text_width));
    }

    #[test]
    fn test_layout_emphasis_sizes() {
        let settings = CompositorSettings::default();
        let layout = layout_title("Space Explorers", 200.0, &HalfEm, &settings).unwrap();
        let s = layout.glyph(0).unwrap();
        let p = layout.glyph(1).unwrap();
        let e = layout.glyph(6).unwrap();
        let x = layout.glyph(7).unwrap();
        assert!(approx_eq(s.size, layout.base_size * EMPHASIS_SCALE));
        assert!(approx_eq(p.size, layout.base_size));
        assert!(approx_eq(e.size, layout.base_size * EMPHASIS_SCALE));
        assert!(approx_eq(x.size, layout.base_size));
    }

    #[test]
    fn test_layout_pen_positions_accumulate() {
        let settings = CompositorSettings::default();
        let layout = layout_title("ab cd", 200.0, &HalfEm, &settings).unwrap();
        let mut pen = 0.0;
        for g in &layout.glyphs {
            assert!(approx_eq(g.x, pen));
            pen += g.advance;
        }
        assert!(approx_eq(layout.width, pen));
    }

    #[test]
    fn test_layout_clamps_to_max_font_size() {
        let settings = CompositorSettings::default();
        // A single narrow glyph would need a huge size to reach the target width
        let layout = layout_title("i", 200.0, &HalfEm, &settings).unwrap();
        assert!(approx_eq(layout.base_size * EMPHASIS_SCALE, layout.glyphs[0].size));
        assert!(approx_eq(layout.base_size, settings.max_font_size));
        assert!(layout.width < settings.target_text_width);
    }

    #[test]
    fn test_layout_clamps_to_min_font_size() {
        let settings = CompositorSettings::default();
        let long = "a very long title with lots of words that keeps on going and going";
        let layout = layout_title(long, 200.0, &HalfEm, &settings).unwrap();
        assert!(approx_eq(layout.base_size, settings.min_font_size));
        assert!(layout.width > settings.target_text_width);
    }

    #[test]
    fn test_layout_empty_title() {
        let settings = CompositorSettings::default();
        assert!(layout_title("", 200.0, &HalfEm, &settings).is_none());
    }

    #[test]
    fn test_max_size_includes_emphasis() {
        let settings = CompositorSettings::default();
        let layout = layout_title("Space", 200.0, &HalfEm, &settings).unwrap();
        assert!(approx_eq(layout.max_size(), layout.base_size * EMPHASIS_SCALE));
        let plain = layout_title("the", 200.0, &HalfEm, &settings).unwrap();
        assert!(approx_eq(plain.max_size(), plain.base_size));
    }
}
