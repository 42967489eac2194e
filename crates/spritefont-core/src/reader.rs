use crate::config::TextureFormat;
use crate::error::{Result, SpriteFontError};
use crate::model::Rect;
use crate::texture::EncodedTexture;
use crate::writer::{GlyphMetrics, SPRITE_FONT_MAGIC, SpriteFontFile};
use std::io::{ErrorKind, Read};

fn read_array<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => SpriteFontError::Truncated,
        _ => SpriteFontError::Io(e),
    })?;
    Ok(buf)
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    read_array::<R, 4>(r).map(u32::from_le_bytes)
}

fn read_f32<R: Read>(r: &mut R) -> Result<f32> {
    read_array::<R, 4>(r).map(f32::from_le_bytes)
}

/// Parses a spritefont file written by [`crate::writer::write_sprite_font`].
pub fn read_sprite_font<R: Read>(r: &mut R) -> Result<SpriteFontFile> {
    let magic = read_array::<R, 8>(r)?;
    if &magic != SPRITE_FONT_MAGIC {
        return Err(SpriteFontError::InvalidMagic);
    }

    let count = read_u32(r)?;
    let mut glyphs = Vec::with_capacity(count.min(1 << 16) as usize);
    for _ in 0..count {
        let character = read_u32(r)?;
        let left = read_u32(r)?;
        let top = read_u32(r)?;
        let right = read_u32(r)?;
        let bottom = read_u32(r)?;
        if right < left || bottom < top {
            return Err(SpriteFontError::InvalidInput(format!(
                "glyph U+{character:04X} has an inverted rectangle"
            )));
        }
        glyphs.push(GlyphMetrics {
            character,
            subrect: Rect::new(left, top, right - left, bottom - top),
            x_offset: read_f32(r)?,
            y_offset: read_f32(r)?,
            x_advance: read_f32(r)?,
        });
    }

    let line_spacing = read_f32(r)?;
    let default_character = read_u32(r)?;

    let width = read_u32(r)?;
    let height = read_u32(r)?;
    let tag = read_u32(r)?;
    let format = TextureFormat::from_format_tag(tag)
        .ok_or_else(|| SpriteFontError::UnsupportedFormat(format!("format tag {tag}")))?;
    let pitch = read_u32(r)?;
    let rows = read_u32(r)?;
    let len = pitch as usize * rows as usize;
    let mut data = Vec::new();
    r.take(len as u64).read_to_end(&mut data)?;
    if data.len() != len {
        return Err(SpriteFontError::Truncated);
    }

    Ok(SpriteFontFile {
        glyphs,
        line_spacing,
        default_character,
        texture: EncodedTexture {
            format,
            width,
            height,
            pitch,
            rows,
            data,
        },
    })
}

/// Parses a spritefont from a byte slice.
pub fn from_bytes(mut bytes: &[u8]) -> Result<SpriteFontFile> {
    read_sprite_font(&mut bytes)
}
