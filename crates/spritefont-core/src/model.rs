use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge coordinate (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge coordinate (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(r.x >= self.right() || self.x >= r.right() || r.y >= self.bottom() || self.y >= r.bottom())
    }
}

/// A single character of a font: its image region plus layout metrics.
///
/// `bitmap` is shared; importers usually hand out many glyphs referencing one
/// source surface, and after composition every glyph references the atlas.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Unicode codepoint.
    pub character: u32,
    /// Straight (non-premultiplied) RGBA surface the glyph lives in.
    pub bitmap: Arc<RgbaImage>,
    /// Region of `bitmap` holding this glyph.
    pub subrect: Rect,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

impl Glyph {
    /// Glyph covering the whole of `bitmap`.
    pub fn new(character: u32, bitmap: Arc<RgbaImage>) -> Self {
        let (w, h) = bitmap.dimensions();
        Self::with_subrect(character, bitmap, Rect::new(0, 0, w, h))
    }

    pub fn with_subrect(character: u32, bitmap: Arc<RgbaImage>, subrect: Rect) -> Self {
        Self {
            character,
            bitmap,
            subrect,
            x_offset: 0.0,
            y_offset: 0.0,
            x_advance: 0.0,
        }
    }
}

/// Placement of one glyph cell (glyph plus its 1px border) in the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRect {
    /// Index of the glyph in the input slice.
    pub index: usize,
    pub character: u32,
    /// Cell rectangle, border included.
    pub rect: Rect,
}

/// Result of arranging glyph cells on a surface.
#[derive(Debug, Clone)]
pub struct Arrangement {
    pub width: u32,
    pub height: u32,
    /// One entry per input glyph, in input order.
    pub placements: Vec<PackedRect>,
}

/// Statistics about a finished conversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackStats {
    pub glyph_count: usize,
    pub atlas_width: u32,
    pub atlas_height: u32,
    /// Sum of glyph cell areas (border included).
    pub used_area: u64,
    /// `used_area / atlas area * 100`.
    pub efficiency: f32,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Glyphs: {}, Atlas: {}x{}, Used Area: {} px², Efficiency: {:.2}%",
            self.glyph_count, self.atlas_width, self.atlas_height, self.used_area, self.efficiency,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        (self.atlas_width as u64 * self.atlas_height as u64).saturating_sub(self.used_area)
    }
}
