use crate::config::PackMode;
use crate::error::Result;
use crate::model::{Arrangement, Glyph, PackedRect, Rect};
use tracing::debug;

pub mod grid;
pub mod guillotine;

use grid::GridPacker;
use guillotine::GuillotinePacker;

/// One pixel of border on every side of every glyph.
pub const GLYPH_BORDER: u32 = 1;
/// Block size used when rounding atlas dimensions (block compression works on 4x4 blocks).
pub const BLOCK_SIZE: u32 = 4;
/// Largest texture dimension any feature level supports. Larger atlases are
/// still produced, with a warning.
pub const MAX_TEXTURE_DIMENSION: u32 = 16384;

/// A packer places cells of a known size onto a surface of fixed width.
///
/// Implementations must never return overlapping placements. Placement order
/// matters: callers feed cells in the order the packer expects.
pub trait Packer {
    /// Places a `w` x `h` cell and returns its rectangle.
    fn pack(&mut self, w: u32, h: u32) -> Result<Rect>;
}

/// Rounds `value` up to a valid texture size: a multiple of the block size,
/// or the next power of two (at least the block size) when `pow2` is set.
pub fn make_valid_texture_size(value: u32, pow2: bool) -> u32 {
    if pow2 {
        let mut p = BLOCK_SIZE;
        while p < value {
            p <<= 1;
        }
        p
    } else {
        value.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
    }
}

/// Padded cell size of a glyph.
pub fn cell_size(glyph: &Glyph) -> (u32, u32) {
    (
        glyph.subrect.w + GLYPH_BORDER * 2,
        glyph.subrect.h + GLYPH_BORDER * 2,
    )
}

/// Guesses a good output width: square-ish area, never narrower than the
/// widest cell, rounded up to a power of two.
pub fn guess_output_width(glyphs: &[Glyph]) -> u32 {
    let mut max_cell_width = 0u32;
    let mut total_area = 0u64;
    for g in glyphs {
        max_cell_width = max_cell_width.max(cell_size(g).0);
        total_area += g.subrect.area();
    }
    let side = (total_area as f64).sqrt() as u32;
    make_valid_texture_size(side.max(max_cell_width), true)
}

/// Arranges glyph cells on a surface using `mode`.
///
/// Placements come back in input order; the tight packer internally visits
/// the cells tallest-first with codepoint as a tie-break.
pub fn arrange_glyphs(glyphs: &[Glyph], mode: PackMode) -> Result<Arrangement> {
    let width = guess_output_width(glyphs);
    let mut placements: Vec<Option<PackedRect>> = vec![None; glyphs.len()];
    let mut used_height = 0u32;

    match mode {
        PackMode::Tight => {
            let mut order: Vec<usize> = (0..glyphs.len()).collect();
            order.sort_by(|&a, &b| {
                size_key(&glyphs[b])
                    .cmp(&size_key(&glyphs[a]))
                    .then_with(|| glyphs[a].character.cmp(&glyphs[b].character))
            });
            let mut packer = GuillotinePacker::new(width);
            for (n, idx) in order.into_iter().enumerate() {
                if n > 0 && n % 500 == 0 {
                    debug!(placed = n, total = glyphs.len(), "packing");
                }
                let (w, h) = cell_size(&glyphs[idx]);
                let rect = packer.pack(w, h)?;
                used_height = used_height.max(rect.bottom());
                placements[idx] = Some(PackedRect {
                    index: idx,
                    character: glyphs[idx].character,
                    rect,
                });
            }
        }
        PackMode::Fast => {
            let (cell_w, cell_h) = glyphs.iter().map(cell_size).fold((1, 1), |(mw, mh), (w, h)| {
                (mw.max(w), mh.max(h))
            });
            let mut packer = GridPacker::new(width, cell_w, cell_h);
            for (idx, g) in glyphs.iter().enumerate() {
                let (w, h) = cell_size(g);
                let cell = packer.pack(w, h)?;
                used_height = used_height.max(cell.bottom());
                placements[idx] = Some(PackedRect {
                    index: idx,
                    character: g.character,
                    rect: Rect::new(cell.x, cell.y, w, h),
                });
            }
        }
    }

    let height = make_valid_texture_size(used_height.max(1), false);
    debug!(width, height, ?mode, "arranged glyphs");
    Ok(Arrangement {
        width,
        height,
        placements: placements.into_iter().flatten().collect(),
    })
}

fn size_key(g: &Glyph) -> u64 {
    // Large enough that height always dominates width.
    const HEIGHT_WEIGHT: u64 = 1 << 16;
    let (w, h) = cell_size(g);
    h as u64 * HEIGHT_WEIGHT + w as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_texture_sizes() {
        assert_eq!(make_valid_texture_size(0, true), 4);
        assert_eq!(make_valid_texture_size(5, true), 8);
        assert_eq!(make_valid_texture_size(64, true), 64);
        assert_eq!(make_valid_texture_size(65, true), 128);
        assert_eq!(make_valid_texture_size(1, false), 4);
        assert_eq!(make_valid_texture_size(22, false), 24);
        assert_eq!(make_valid_texture_size(24, false), 24);
    }
}
