//! Binary spritefont writer.
//!
//! Layout (all little-endian, no version field):
//!
//! ```text
//! magic            8 bytes  "DXTKfont"
//! glyph count      u32
//! per glyph        character u32, left/top/right/bottom u32,
//!                  x_offset/y_offset/x_advance f32
//! line spacing     f32
//! default char     u32 (0 = none)
//! width, height    u32, u32
//! format tag       u32 (28 rgba32, 115 bgra4444, 74 compressed mono)
//! pitch, rows      u32, u32
//! payload          pitch * rows bytes
//! ```

use crate::error::{Result, SpriteFontError};
use crate::model::{Glyph, Rect};
use crate::texture::EncodedTexture;
use std::io::Write;

pub const SPRITE_FONT_MAGIC: &[u8; 8] = b"DXTKfont";

/// Per-glyph metrics as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub character: u32,
    /// Glyph rectangle in atlas coordinates.
    pub subrect: Rect,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

impl From<&Glyph> for GlyphMetrics {
    fn from(g: &Glyph) -> Self {
        Self {
            character: g.character,
            subrect: g.subrect,
            x_offset: g.x_offset,
            y_offset: g.y_offset,
            x_advance: g.x_advance,
        }
    }
}

/// In-memory image of a spritefont file.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFontFile {
    pub glyphs: Vec<GlyphMetrics>,
    pub line_spacing: f32,
    pub default_character: u32,
    pub texture: EncodedTexture,
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> std::io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn write_f32<W: Write>(w: &mut W, v: f32) -> std::io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// Serializes `font` to `w`.
pub fn write_sprite_font<W: Write>(w: &mut W, font: &SpriteFontFile) -> Result<()> {
    let tag = font
        .texture
        .format
        .format_tag()
        .ok_or_else(|| SpriteFontError::UnsupportedFormat(font.texture.format.to_string()))?;
    let glyph_count = u32::try_from(font.glyphs.len())
        .map_err(|_| SpriteFontError::InvalidInput("too many glyphs".into()))?;

    w.write_all(SPRITE_FONT_MAGIC)?;

    write_u32(w, glyph_count)?;
    for g in &font.glyphs {
        write_u32(w, g.character)?;
        write_u32(w, g.subrect.x)?;
        write_u32(w, g.subrect.y)?;
        write_u32(w, g.subrect.right())?;
        write_u32(w, g.subrect.bottom())?;
        write_f32(w, g.x_offset)?;
        write_f32(w, g.y_offset)?;
        write_f32(w, g.x_advance)?;
    }

    write_f32(w, font.line_spacing)?;
    write_u32(w, font.default_character)?;

    let tex = &font.texture;
    write_u32(w, tex.width)?;
    write_u32(w, tex.height)?;
    write_u32(w, tag)?;
    write_u32(w, tex.pitch)?;
    write_u32(w, tex.rows)?;
    w.write_all(&tex.data)?;
    Ok(())
}

/// Serializes `font` into a byte vector.
pub fn to_bytes(font: &SpriteFontFile) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64 + font.glyphs.len() * 32 + font.texture.data.len());
    write_sprite_font(&mut out, font)?;
    Ok(out)
}
