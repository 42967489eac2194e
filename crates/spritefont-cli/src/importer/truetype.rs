use super::ImportOptions;
use crate::regions::flatten;
use anyhow::{Context, anyhow};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use spritefont_core::{Glyph, ImportedFont};
use std::sync::Arc;
use tracing::{info, warn};

/// Converts a point size to pixels at 96 dpi.
pub fn points_to_pixels(points: f32) -> f32 {
    points * 96.0 / 72.0
}

/// Rasterizes one character as white with coverage in alpha.
///
/// Offsets are relative to the pen position and the top of the line.
pub fn rasterize_glyph(font: &Font, ch: char, px: f32, ascent: f32) -> Glyph {
    let (metrics, coverage) = font.rasterize(ch, px);
    let (w, h) = (metrics.width as u32, metrics.height as u32);

    // empty glyphs (space) get a transparent 1x1 placeholder
    let bitmap = if w == 0 || h == 0 {
        RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0]))
    } else {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([255, 255, 255, coverage[(y * w + x) as usize]])
        })
    };

    let drawn_width = bitmap.width() as f32;
    let mut glyph = Glyph::new(ch as u32, Arc::new(bitmap));
    glyph.x_offset = metrics.xmin as f32;
    glyph.x_advance = metrics.advance_width - metrics.xmin as f32 - drawn_width;
    glyph.y_offset = ascent - (metrics.ymin + h as i32) as f32;
    glyph
}

pub fn import(opts: &ImportOptions) -> anyhow::Result<ImportedFont> {
    let bytes = std::fs::read(&opts.source)
        .with_context(|| format!("Unable to read '{}'", opts.source.display()))?;
    let px = points_to_pixels(opts.font_size);
    let font = Font::from_bytes(
        bytes,
        FontSettings {
            scale: px,
            ..FontSettings::default()
        },
    )
    .map_err(|e| anyhow!("Unable to parse '{}': {e}", opts.source.display()))?;

    let line = font
        .horizontal_line_metrics(px)
        .ok_or_else(|| anyhow!("'{}' has no horizontal metrics", opts.source.display()))?;
    let ascent = line.ascent.round();

    let characters = flatten(&opts.regions);
    let bar = if opts.show_progress {
        let b = ProgressBar::new(characters.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} rasterizing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let mut glyphs = Vec::with_capacity(characters.len());
    for &code in &characters {
        if let Some(b) = &bar {
            b.inc(1);
        }
        let Some(ch) = char::from_u32(code) else {
            warn!(code, "skipping invalid codepoint");
            continue;
        };
        if font.lookup_glyph_index(ch) == 0 {
            warn!("font has no glyph for U+{code:04X}");
            continue;
        }
        glyphs.push(rasterize_glyph(&font, ch, px, ascent));
    }
    if let Some(b) = bar {
        b.finish_and_clear();
    }

    info!(count = glyphs.len(), px, "rasterized glyphs");
    Ok(ImportedFont {
        glyphs,
        line_spacing: line.new_line_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_at_96_dpi() {
        assert_eq!(points_to_pixels(72.0), 96.0);
        assert_eq!(points_to_pixels(24.0), 32.0);
    }
}
