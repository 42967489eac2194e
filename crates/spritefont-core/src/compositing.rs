use crate::model::{Arrangement, Glyph, Rect};
use crate::packer::GLYPH_BORDER;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tracing::info;

/// Composed atlas surface plus packing efficiency.
pub struct ComposedAtlas {
    pub image: RgbaImage,
    /// Sum of glyph cell areas over atlas area, in percent.
    pub efficiency: f32,
    pub used_area: u64,
}

/// Blit a sub-rectangle `src_rect` of `src` into `canvas` with its top-left at (dx, dy).
pub fn blit_rgba(src: &RgbaImage, src_rect: Rect, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    for yy in 0..src_rect.h {
        for xx in 0..src_rect.w {
            if dx + xx < cw && dy + yy < ch {
                let px = *src.get_pixel(src_rect.x + xx, src_rect.y + yy);
                canvas.put_pixel(dx + xx, dy + yy, px);
            }
        }
    }
}

/// Copies one pixel keeping its RGB but forcing alpha to zero.
fn copy_border_pixel(canvas: &mut RgbaImage, sx: u32, sy: u32, dx: u32, dy: u32) {
    let [r, g, b, _] = canvas.get_pixel(sx, sy).0;
    canvas.put_pixel(dx, dy, Rgba([r, g, b, 0]));
}

/// Fills the 1px ring around `region` with the RGB of the adjacent edge pixel
/// and zero alpha, so bilinear filtering of straight-alpha textures does not
/// fade glyph edges towards black. `region` must have a full ring inside the
/// canvas.
pub fn pad_border_pixels(canvas: &mut RgbaImage, region: Rect) {
    let (left, top) = (region.x, region.y);
    let (right, bottom) = (region.right() - 1, region.bottom() - 1);

    // top and bottom
    for x in left..=right {
        copy_border_pixel(canvas, x, top, x, top - 1);
        copy_border_pixel(canvas, x, bottom, x, bottom + 1);
    }
    // left and right
    for y in top..=bottom {
        copy_border_pixel(canvas, left, y, left - 1, y);
        copy_border_pixel(canvas, right, y, right + 1, y);
    }
    // corners
    copy_border_pixel(canvas, left, top, left - 1, top - 1);
    copy_border_pixel(canvas, right, top, right + 1, top - 1);
    copy_border_pixel(canvas, left, bottom, left - 1, bottom + 1);
    copy_border_pixel(canvas, right, bottom, right + 1, bottom + 1);
}

/// Repoints every glyph at the shared atlas and its interior rectangle there.
pub fn relocate_glyphs(glyphs: &mut [Glyph], arrangement: &Arrangement, atlas: &Arc<RgbaImage>) {
    for placed in &arrangement.placements {
        let glyph = &mut glyphs[placed.index];
        glyph.bitmap = Arc::clone(atlas);
        glyph.subrect = Rect::new(
            placed.rect.x + GLYPH_BORDER,
            placed.rect.y + GLYPH_BORDER,
            glyph.subrect.w,
            glyph.subrect.h,
        );
    }
}

/// Copies every glyph into its arranged cell and pads the borders.
/// The glyphs themselves are left untouched; see [`relocate_glyphs`].
pub fn compose(glyphs: &[Glyph], arrangement: &Arrangement) -> ComposedAtlas {
    let mut canvas = RgbaImage::new(arrangement.width, arrangement.height);
    let mut used_area = 0u64;
    for placed in &arrangement.placements {
        let glyph = &glyphs[placed.index];
        let dest = Rect::new(
            placed.rect.x + GLYPH_BORDER,
            placed.rect.y + GLYPH_BORDER,
            glyph.subrect.w,
            glyph.subrect.h,
        );
        blit_rgba(&glyph.bitmap, glyph.subrect, &mut canvas, dest.x, dest.y);
        pad_border_pixels(&mut canvas, dest);
        used_area += placed.rect.area();
    }
    let total = arrangement.width as u64 * arrangement.height as u64;
    let efficiency = if total > 0 {
        used_area as f32 / total as f32 * 100.0
    } else {
        0.0
    };
    info!(efficiency = format!("{efficiency:.2}%"), "packing efficiency");
    ComposedAtlas {
        image: canvas,
        efficiency,
        used_area,
    }
}
