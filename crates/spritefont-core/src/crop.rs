use crate::model::{Glyph, Rect};
use image::RgbaImage;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Returns true if every pixel of `region` in `image` has alpha `expected`.
pub fn is_alpha_entirely(expected: u8, image: &RgbaImage, region: Rect) -> bool {
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            if image.get_pixel(x, y)[3] != expected {
                return false;
            }
        }
    }
    true
}

/// Trims fully transparent rows and columns from the edges of `glyph.subrect`.
///
/// Top rows bump `y_offset`, left columns bump `x_offset` and right columns
/// bump `x_advance`, so the glyph still renders at the same place. Never
/// shrinks a dimension below one pixel.
pub fn crop_glyph(glyph: &mut Glyph) {
    let bitmap = &*glyph.bitmap;
    let r = &mut glyph.subrect;

    // top
    while r.h > 1 && is_alpha_entirely(0, bitmap, Rect::new(r.x, r.y, r.w, 1)) {
        r.y += 1;
        r.h -= 1;
        glyph.y_offset += 1.0;
    }
    // bottom
    while r.h > 1 && is_alpha_entirely(0, bitmap, Rect::new(r.x, r.bottom() - 1, r.w, 1)) {
        r.h -= 1;
    }
    // left
    while r.w > 1 && is_alpha_entirely(0, bitmap, Rect::new(r.x, r.y, 1, r.h)) {
        r.x += 1;
        r.w -= 1;
        glyph.x_offset += 1.0;
    }
    // right
    while r.w > 1 && is_alpha_entirely(0, bitmap, Rect::new(r.right() - 1, r.y, 1, r.h)) {
        r.w -= 1;
        glyph.x_advance += 1.0;
    }
}

/// Crops every glyph. Glyphs are independent, so with feature "parallel" and
/// `parallel` set this runs on the rayon pool; slot order is preserved.
pub fn crop_glyphs(glyphs: &mut [Glyph], parallel: bool) {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            glyphs.par_iter_mut().for_each(crop_glyph);
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    glyphs.iter_mut().for_each(crop_glyph);
}
