//! Glyph grids drawn in an ordinary image.
//!
//! Glyphs sit in cells surrounded by magenta (255, 0, 255). Monochrome glyphs
//! are white on black; give the image an alpha channel for coloured glyphs.
//! Cells are read left to right, top to bottom, and take codepoints from the
//! character regions in order.

use super::ImportOptions;
use crate::regions::flatten;
use anyhow::Context;
use image::{Rgba, RgbaImage};
use spritefont_core::crop::is_alpha_entirely;
use spritefont_core::{Glyph, ImportedFont, Rect};
use std::sync::Arc;
use tracing::debug;

const MARKER: Rgba<u8> = Rgba([255, 0, 255, 255]);

fn is_marker(img: &RgbaImage, x: u32, y: u32) -> bool {
    *img.get_pixel(x, y) == MARKER
}

/// Finds glyph cells: a cell starts at a non-marker pixel with marker pixels
/// directly left of and above it, and extends right and down until the next
/// marker pixel.
pub fn find_glyphs(img: &RgbaImage) -> Vec<Rect> {
    let (width, height) = img.dimensions();
    let mut found = Vec::new();
    for y in 1..height {
        for x in 1..width {
            if is_marker(img, x, y) || !is_marker(img, x - 1, y) || !is_marker(img, x, y - 1) {
                continue;
            }
            let mut w = 1;
            while x + w < width && !is_marker(img, x + w, y) {
                w += 1;
            }
            let mut h = 1;
            while y + h < height && !is_marker(img, x, y + h) {
                h += 1;
            }
            found.push(Rect::new(x, y, w, h));
        }
    }
    found
}

/// Turns brightness into coverage over white, for sources without alpha.
pub fn convert_grey_to_alpha(img: &mut RgbaImage) {
    for p in img.pixels_mut() {
        let a = ((p[0] as u32 + p[1] as u32 + p[2] as u32) / 3) as u8;
        *p = Rgba([255, 255, 255, a]);
    }
}

/// Splits an in-memory grid into glyphs.
pub fn import_image(mut img: RgbaImage, characters: &[u32]) -> ImportedFont {
    let cells = find_glyphs(&img);

    let full = Rect::new(0, 0, img.width(), img.height());
    if is_alpha_entirely(255, &img, full) {
        convert_grey_to_alpha(&mut img);
    }
    let bitmap = Arc::new(img);

    let mut line_spacing = 0.0f32;
    let mut current = 0u32;
    let mut glyphs = Vec::with_capacity(cells.len());
    for (i, cell) in cells.into_iter().enumerate() {
        current = characters.get(i).copied().unwrap_or(current + 1);
        glyphs.push(Glyph::with_subrect(current, Arc::clone(&bitmap), cell));
        line_spacing = line_spacing.max(cell.h as f32);
    }
    debug!(count = glyphs.len(), "found glyph cells");
    ImportedFont {
        glyphs,
        line_spacing,
    }
}

pub fn import(opts: &ImportOptions) -> anyhow::Result<ImportedFont> {
    let img = image::open(&opts.source)
        .with_context(|| format!("Unable to load '{}'", opts.source.display()))?
        .to_rgba8();
    let characters = flatten(&opts.regions);
    Ok(import_image(img, &characters))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 cells of 3x2 and 2x4 separated by marker pixels.
    fn grid() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(10, 7, MARKER);
        for y in 1..3 {
            for x in 1..4 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        for y in 1..5 {
            for x in 5..7 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        img
    }

    #[test]
    fn cells_are_found_in_reading_order() {
        let cells = find_glyphs(&grid());
        assert_eq!(cells, vec![Rect::new(1, 1, 3, 2), Rect::new(5, 1, 2, 4)]);
    }

    #[test]
    fn opaque_grid_becomes_alpha() {
        let font = import_image(grid(), &['A' as u32]);
        assert_eq!(font.glyphs.len(), 2);
        assert_eq!(font.glyphs[0].character, 'A' as u32);
        // runs past the supplied characters by incrementing
        assert_eq!(font.glyphs[1].character, 'B' as u32);
        assert_eq!(font.line_spacing, 4.0);
        let bmp = &font.glyphs[0].bitmap;
        assert_eq!(bmp.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(bmp.get_pixel(5, 1).0, [255, 255, 255, 0]);
    }

    #[test]
    fn grid_converts_to_a_readable_spritefont() {
        use spritefont_core::reader::from_bytes;
        use spritefont_core::texture::decode;
        use spritefont_core::{SpriteFontConfig, TextureFormat, make_sprite_font};

        let font = import_image(grid(), &['A' as u32, 'B' as u32]);
        let out = make_sprite_font(font, &SpriteFontConfig::default()).expect("convert");
        let file = from_bytes(&out.to_bytes().expect("bytes")).expect("read back");

        assert_eq!(file.line_spacing, 4.0);
        assert_eq!(file.glyphs.len(), 2);
        // grey-to-alpha ran before encoding, so the atlas is white-only
        assert_eq!(file.texture.format, TextureFormat::CompressedMono);

        let a = file.glyphs[0];
        assert_eq!(a.character, 'A' as u32);
        assert_eq!((a.subrect.w, a.subrect.h), (3, 2));
        assert_eq!((a.x_offset, a.y_offset), (0.0, 0.0));

        // the black cell is fully transparent and crops to one pixel
        let b = file.glyphs[1];
        assert_eq!(b.character, 'B' as u32);
        assert_eq!((b.subrect.w, b.subrect.h), (1, 1));
        assert_eq!((b.x_offset, b.y_offset), (1.0, 3.0));

        let tex = &file.texture;
        let atlas = decode(tex.format, &tex.data, tex.width, tex.height).expect("decode");
        for y in a.subrect.y..a.subrect.bottom() {
            for x in a.subrect.x..a.subrect.right() {
                assert_eq!(atlas.get_pixel(x, y).0, [255, 255, 255, 255]);
            }
        }
    }
}
