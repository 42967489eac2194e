use image::RgbaImage;
use rand::{Rng, SeedableRng};
use spritefont_core::config::PackMode;
use spritefont_core::model::{Arrangement, Glyph, Rect};
use spritefont_core::packer::guillotine::GuillotinePacker;
use spritefont_core::packer::{MAX_TEXTURE_DIMENSION, Packer, arrange_glyphs, guess_output_width};
use std::sync::Arc;

fn glyph(c: u32, w: u32, h: u32) -> Glyph {
    Glyph::new(c, Arc::new(RgbaImage::new(w, h)))
}

fn random_glyphs(seed: u64, n: u32) -> Vec<Glyph> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|c| glyph(32 + c, rng.gen_range(1..=30), rng.gen_range(1..=40)))
        .collect()
}

fn disjoint(arr: &Arrangement) -> bool {
    let p = &arr.placements;
    for i in 0..p.len() {
        for j in (i + 1)..p.len() {
            if p[i].rect.intersects(&p[j].rect) {
                return false;
            }
        }
    }
    true
}

/// Scan placement: slide right past whatever we collide with, drop a row when
/// out of width. Slow but obviously correct; used as a reference.
fn scan_pack(sizes: &[(u32, u32)], width: u32) -> Vec<Rect> {
    let mut placed: Vec<Rect> = Vec::new();
    for &(w, h) in sizes {
        let (mut x, mut y) = (0u32, 0u32);
        loop {
            let candidate = Rect::new(x, y, w, h);
            match placed.iter().find(|r| r.intersects(&candidate)) {
                None => {
                    placed.push(candidate);
                    break;
                }
                Some(hit) => {
                    x = hit.right();
                    if x + w > width {
                        x = 0;
                        y += 1;
                    }
                }
            }
        }
    }
    placed
}

#[test]
fn three_glyph_example() {
    let glyphs = vec![glyph(65, 10, 20), glyph(66, 10, 20), glyph(67, 3, 3)];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    assert_eq!(arr.width, 32);
    assert_eq!(arr.placements[0].rect, Rect::new(0, 0, 12, 22));
    assert_eq!(arr.placements[1].rect, Rect::new(12, 0, 12, 22));
    assert_eq!(arr.placements[2].rect, Rect::new(24, 0, 5, 5));
    assert_eq!(arr.height, 24);

    // The scan reference agrees on this input.
    let reference = scan_pack(&[(12, 22), (12, 22), (5, 5)], 32);
    let tight: Vec<Rect> = arr.placements.iter().map(|p| p.rect).collect();
    assert_eq!(reference, tight);
}

#[test]
fn tie_break_by_codepoint() {
    // Equal sizes: lower codepoint goes first, regardless of input order.
    // Cells are 8x8 on an 8 wide surface, so they stack.
    let glyphs = vec![glyph(90, 6, 6), glyph(80, 6, 6)];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    assert_eq!(arr.width, 8);
    assert_eq!(arr.placements[1].character, 80);
    assert_eq!(arr.placements[1].rect, Rect::new(0, 0, 8, 8));
    assert_eq!(arr.placements[0].rect, Rect::new(0, 8, 8, 8));
    assert_eq!(arr.height, 16);
}

#[test]
fn random_sets_are_disjoint_and_valid() {
    for seed in 0..8 {
        let glyphs = random_glyphs(seed, 150);
        let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
        assert!(disjoint(&arr), "seed {seed} overlaps");
        assert_eq!(arr.width % 4, 0);
        assert_eq!(arr.height % 4, 0);
        assert!(arr.width.is_power_of_two());
        let max_w = glyphs.iter().map(|g| g.subrect.w).max().unwrap();
        assert!(arr.width >= max_w);
        for p in &arr.placements {
            assert!(p.rect.right() <= arr.width);
            assert!(p.rect.bottom() <= arr.height);
            let g = &glyphs[p.index];
            assert_eq!((p.rect.w, p.rect.h), (g.subrect.w + 2, g.subrect.h + 2));
            assert_eq!(p.character, g.character);
        }
    }
}

#[test]
fn tight_is_deterministic() {
    let glyphs = random_glyphs(42, 300);
    let a = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    let b = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_eq!(a.placements, b.placements);
}

#[test]
fn tight_not_taller_than_grid() {
    let glyphs = random_glyphs(3, 200);
    let tight = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    let fast = arrange_glyphs(&glyphs, PackMode::Fast).expect("pack");
    assert_eq!(tight.width, fast.width);
    assert!(tight.height <= fast.height);
}

#[test]
fn wide_single_glyph_fits_width() {
    // A 16x16 glyph pads to 18, wider than the sqrt-of-area guess.
    let glyphs = vec![glyph(1, 16, 16)];
    assert!(guess_output_width(&glyphs) >= 18);
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    assert_eq!(arr.placements[0].rect, Rect::new(0, 0, 18, 18));
}

#[test]
fn free_pool_stays_disjoint_and_useful() {
    for seed in 0..8u64 {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut cells: Vec<(u32, u32)> = (0..150)
            .map(|_| (rng.gen_range(3..=34), rng.gen_range(3..=42)))
            .collect();
        cells.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

        let mut packer = GuillotinePacker::new(256);
        let mut placed: Vec<Rect> = Vec::new();
        for (w, h) in cells {
            let rect = packer.pack(w, h).expect("pack");
            assert!(rect.right() <= 256);
            placed.push(rect);

            let free: Vec<Rect> = packer.free_rects().copied().collect();
            for (i, f) in free.iter().enumerate() {
                assert!(f.w > 2 && f.h > 2, "seed {seed}: thin free bin {f:?}");
                assert!(f.right() <= 256, "seed {seed}: free bin {f:?} out of bounds");
                for other in &free[i + 1..] {
                    assert!(!f.intersects(other), "seed {seed}: free {f:?} overlaps {other:?}");
                }
                for p in &placed {
                    assert!(!f.intersects(p), "seed {seed}: free {f:?} overlaps cell {p:?}");
                }
            }
        }
    }
}

#[test]
fn tight_atlas_may_exceed_the_largest_texture() {
    // One very tall glyph: tight mode still places it and the pipeline only warns.
    let glyphs = vec![glyph(1, 1, MAX_TEXTURE_DIMENSION + 100)];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    assert_eq!(arr.placements[0].rect, Rect::new(0, 0, 3, MAX_TEXTURE_DIMENSION + 102));
    assert!(arr.height > MAX_TEXTURE_DIMENSION);
    assert_eq!(arr.height % 4, 0);
}
