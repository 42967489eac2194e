use rand::{Rng, SeedableRng};
use spritefont_core::packer::arrange_glyphs;
use spritefont_core::{Glyph, PackMode};
use std::sync::Arc;
use std::time::Instant;

use image::{Rgba, RgbaImage};

fn glyphs(n: usize, seed: u64) -> Vec<Glyph> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let w: u32 = rng.gen_range(2..=40);
            let h: u32 = rng.gen_range(8..=48);
            let bmp = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
            Glyph::new(0x20 + i as u32, Arc::new(bmp))
        })
        .collect()
}

fn run(n: usize, mode: PackMode, seed: u64) {
    let glyphs = glyphs(n, seed);
    let used: u64 = glyphs
        .iter()
        .map(|g| (g.subrect.w as u64 + 2) * (g.subrect.h as u64 + 2))
        .sum();

    let start = Instant::now();
    let arrangement = match arrange_glyphs(&glyphs, mode) {
        Ok(a) => a,
        Err(e) => {
            println!("mode={:?} failed: {}", mode, e);
            return;
        }
    };
    let elapsed = start.elapsed();
    let area = arrangement.width as u64 * arrangement.height as u64;
    println!(
        "mode={:?} size={}x{} occ={:.2}% time={}us",
        mode,
        arrangement.width,
        arrangement.height,
        used as f64 / area as f64 * 100.0,
        elapsed.as_micros()
    );
}

fn main() {
    for (n, seed) in [(256, 1337), (4096, 4242)] {
        println!("N={}", n);
        run(n, PackMode::Tight, seed);
        run(n, PackMode::Fast, seed);
    }
}
