use image::{Rgba, RgbaImage};
use spritefont_core::compositing::{compose, relocate_glyphs};
use spritefont_core::config::PackMode;
use spritefont_core::model::{Glyph, Rect};
use spritefont_core::packer::arrange_glyphs;
use std::sync::Arc;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(rgba))
}

#[test]
fn border_copies_rgb_with_zero_alpha() {
    let mut img = solid(4, 3, [200, 100, 50, 255]);
    img.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
    img.put_pixel(3, 2, Rgba([9, 8, 7, 128]));
    let glyphs = vec![Glyph::new(65, Arc::new(img))];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    let atlas = compose(&glyphs, &arr).image;

    // glyph interior starts at (1,1)
    assert_eq!(atlas.get_pixel(1, 1).0, [1, 2, 3, 255]);
    assert_eq!(atlas.get_pixel(4, 3).0, [9, 8, 7, 128]);
    // edges
    assert_eq!(atlas.get_pixel(2, 0).0, [200, 100, 50, 0]);
    assert_eq!(atlas.get_pixel(0, 2).0, [200, 100, 50, 0]);
    assert_eq!(atlas.get_pixel(5, 2).0, [200, 100, 50, 0]);
    assert_eq!(atlas.get_pixel(2, 4).0, [200, 100, 50, 0]);
    // corners
    assert_eq!(atlas.get_pixel(0, 0).0, [1, 2, 3, 0]);
    assert_eq!(atlas.get_pixel(5, 4).0, [9, 8, 7, 0]);
    assert_eq!(atlas.get_pixel(5, 0).0, [200, 100, 50, 0]);
    assert_eq!(atlas.get_pixel(0, 4).0, [200, 100, 50, 0]);
}

#[test]
fn neighbours_do_not_bleed() {
    let red = Glyph::new(1, Arc::new(solid(8, 8, [255, 0, 0, 255])));
    let green = Glyph::new(2, Arc::new(solid(8, 8, [0, 255, 0, 255])));
    let glyphs = vec![red, green];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    let atlas = compose(&glyphs, &arr).image;
    for p in &arr.placements {
        let expected = if p.character == 1 { [255, 0, 0] } else { [0, 255, 0] };
        let r = p.rect;
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                let px = atlas.get_pixel(x, y).0;
                assert_eq!(&px[..3], &expected, "at {x},{y}");
            }
        }
    }
}

#[test]
fn single_glyph_efficiency() {
    let glyphs = vec![Glyph::new(1, Arc::new(solid(10, 20, [255, 255, 255, 255])))];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    assert_eq!((arr.width, arr.height), (16, 24));
    let composed = compose(&glyphs, &arr);
    assert_eq!(composed.used_area, 12 * 22);
    let expected = 100.0 * (12.0 * 22.0) / (16.0 * 24.0);
    assert!((composed.efficiency - expected).abs() < 1e-4);
    assert!(composed.efficiency > 0.0 && composed.efficiency <= 100.0);
}

#[test]
fn relocate_points_into_atlas() {
    let src = Arc::new(solid(10, 10, [255, 255, 255, 255]));
    let mut glyphs = vec![
        Glyph::with_subrect(1, Arc::clone(&src), Rect::new(0, 0, 5, 10)),
        Glyph::with_subrect(2, Arc::clone(&src), Rect::new(5, 0, 5, 4)),
    ];
    let arr = arrange_glyphs(&glyphs, PackMode::Tight).expect("pack");
    let atlas = Arc::new(compose(&glyphs, &arr).image);
    relocate_glyphs(&mut glyphs, &arr, &atlas);
    for (g, p) in glyphs.iter().zip(&arr.placements) {
        assert!(Arc::ptr_eq(&g.bitmap, &atlas));
        assert_eq!(g.subrect.x, p.rect.x + 1);
        assert_eq!(g.subrect.y, p.rect.y + 1);
        assert_eq!(g.subrect.w + 2, p.rect.w);
        assert_eq!(g.subrect.h + 2, p.rect.h);
    }
}
