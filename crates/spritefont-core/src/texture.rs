//! Texture payload encoding.
//!
//! Three encodings are supported:
//! - `Rgba32`: R,G,B,A bytes, row-major.
//! - `Bgra4444`: 4 bits per channel, `B | G<<4 | R<<8 | A<<12`, little-endian words.
//! - `CompressedMono`: 4x4 blocks in the BC2 layout with endpoints fixed to
//!   white and black. Font atlases are achromatic, so only coverage needs
//!   encoding and crisp black/white is more important than exact greys.
//!
//! Decoders for each format live here too; they reconstruct an RGBA surface
//! from a payload for inspection and testing.

use crate::config::TextureFormat;
use crate::error::{Result, SpriteFontError};
use image::{Rgba, RgbaImage};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bytes per encoded 4x4 block.
pub const BLOCK_BYTES: usize = 16;

/// White in 5:6:5, the first endpoint of every compressed-mono block.
const WHITE_565: u16 = 0xFFFF;
/// Black in 5:6:5, the second endpoint.
const BLACK_565: u16 = 0x0000;

/// An encoded texture ready for the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTexture {
    /// Concrete format; never `Auto`.
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Bytes per row (per block row for compressed formats).
    pub pitch: u32,
    /// Pixel rows, or block rows for compressed formats.
    pub rows: u32,
    pub data: Vec<u8>,
}

/// Returns true if every non-transparent pixel has exactly the given RGB.
pub fn is_rgb_entirely(rgb: [u8; 3], image: &RgbaImage) -> bool {
    image
        .pixels()
        .filter(|p| p[3] != 0)
        .all(|p| p[0] == rgb[0] && p[1] == rgb[1] && p[2] == rgb[2])
}

/// Picks a concrete format for `Auto`: compressed mono for white-only
/// atlases, RGBA32 otherwise. Concrete formats pass through.
pub fn resolve_format(format: TextureFormat, image: &RgbaImage) -> TextureFormat {
    match format {
        TextureFormat::Auto => {
            if is_rgb_entirely([255, 255, 255], image) {
                TextureFormat::CompressedMono
            } else {
                TextureFormat::Rgba32
            }
        }
        other => other,
    }
}

/// Converts straight alpha to premultiplied alpha in place.
pub fn premultiply_alpha(image: &mut RgbaImage) {
    for p in image.pixels_mut() {
        let a = p[3] as u32;
        for c in 0..3 {
            p[c] = (p[c] as u32 * a / 255) as u8;
        }
    }
}

/// Encodes `image` as `format`. `premultiplied` only affects compressed mono,
/// which quantizes coverage differently for premultiplied output.
pub fn encode(
    image: &RgbaImage,
    format: TextureFormat,
    premultiplied: bool,
    parallel: bool,
) -> Result<EncodedTexture> {
    let (width, height) = image.dimensions();
    let format = resolve_format(format, image);
    let (pitch, rows, data) = match format {
        TextureFormat::Rgba32 => (width * 4, height, encode_rgba32(image)),
        TextureFormat::Bgra4444 => (width * 2, height, encode_bgra4444(image)),
        TextureFormat::CompressedMono => (
            width * 4,
            height / 4,
            encode_compressed_mono(image, premultiplied, parallel)?,
        ),
        TextureFormat::Auto => {
            return Err(SpriteFontError::UnsupportedFormat(format.to_string()));
        }
    };
    debug!(%format, width, height, bytes = data.len(), "encoded texture");
    Ok(EncodedTexture {
        format,
        width,
        height,
        pitch,
        rows,
        data,
    })
}

pub fn encode_rgba32(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.width() as usize * image.height() as usize * 4);
    for p in image.pixels() {
        out.extend_from_slice(&p.0);
    }
    out
}

pub fn encode_bgra4444(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.width() as usize * image.height() as usize * 2);
    for p in image.pixels() {
        let [r, g, b, a] = p.0.map(|c| (c >> 4) as u16);
        let packed = b | (g << 4) | (r << 8) | (a << 12);
        out.extend_from_slice(&packed.to_le_bytes());
    }
    out
}

/// Quantizes one coverage value to `(alpha_index, rgb_index)`.
///
/// Straight alpha keeps 4-bit alpha over white. Premultiplied output snaps to
/// the four levels (0, 1/3, 2/3, 1) that BC2's interpolated colours can hit
/// exactly, paired with the alpha nibble of the same level so RGB and alpha
/// always agree.
fn quantize_mono(value: u8, premultiplied: bool) -> (u64, u32) {
    if !premultiplied {
        return ((value >> 4) as u64, 0);
    }
    let v = value as u32;
    if v < 256 / 6 {
        (0, 1)
    } else if v < 256 / 2 {
        (5, 3)
    } else if v < 256 * 5 / 6 {
        (10, 2)
    } else {
        (15, 0)
    }
}

/// Compresses the 4x4 block whose top-left pixel is (bx, by).
pub fn compress_block(image: &RgbaImage, bx: u32, by: u32, premultiplied: bool) -> [u8; BLOCK_BYTES] {
    let mut alpha_bits = 0u64;
    let mut rgb_bits = 0u32;
    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            let (alpha, rgb) = quantize_mono(image.get_pixel(bx + x, by + y)[3], premultiplied);
            alpha_bits |= alpha << (i * 4);
            rgb_bits |= rgb << (i * 2);
        }
    }
    let mut block = [0u8; BLOCK_BYTES];
    block[0..8].copy_from_slice(&alpha_bits.to_le_bytes());
    block[8..10].copy_from_slice(&WHITE_565.to_le_bytes());
    block[10..12].copy_from_slice(&BLACK_565.to_le_bytes());
    block[12..16].copy_from_slice(&rgb_bits.to_le_bytes());
    block
}

fn compress_block_row(image: &RgbaImage, by: u32, premultiplied: bool) -> Vec<u8> {
    let mut row = Vec::with_capacity(image.width() as usize / 4 * BLOCK_BYTES);
    for bx in (0..image.width()).step_by(4) {
        row.extend_from_slice(&compress_block(image, bx, by, premultiplied));
    }
    row
}

/// Encodes the whole surface as compressed mono blocks, block rows top to bottom.
pub fn encode_compressed_mono(image: &RgbaImage, premultiplied: bool, parallel: bool) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width % 4 != 0 || height % 4 != 0 {
        return Err(SpriteFontError::BlockSizeMismatch { width, height });
    }
    let block_rows: Vec<u32> = (0..height).step_by(4).collect();

    #[cfg(feature = "parallel")]
    {
        if parallel {
            let rows: Vec<Vec<u8>> = block_rows
                .par_iter()
                .map(|&by| compress_block_row(image, by, premultiplied))
                .collect();
            return Ok(rows.concat());
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    Ok(block_rows
        .into_iter()
        .flat_map(|by| compress_block_row(image, by, premultiplied))
        .collect())
}

// ---------- decoding ----------

fn expect_len(data: &[u8], len: usize) -> Result<()> {
    if data.len() < len {
        Err(SpriteFontError::Truncated)
    } else {
        Ok(())
    }
}

pub fn decode_rgba32(data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    let len = width as usize * height as usize * 4;
    expect_len(data, len)?;
    RgbaImage::from_raw(width, height, data[..len].to_vec()).ok_or(SpriteFontError::Truncated)
}

/// Expands each 4-bit channel back to 8 bits (`n * 17`).
pub fn decode_bgra4444(data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    expect_len(data, width as usize * height as usize * 2)?;
    let mut img = RgbaImage::new(width, height);
    for (p, word) in img.pixels_mut().zip(data.chunks_exact(2)) {
        let v = u16::from_le_bytes([word[0], word[1]]);
        let nib = |shift: u16| (((v >> shift) & 0xF) as u8) * 17;
        *p = Rgba([nib(8), nib(4), nib(0), nib(12)]);
    }
    Ok(img)
}

/// Decodes BC2 blocks using the endpoints stored in each block.
pub fn decode_compressed_mono(data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    if width % 4 != 0 || height % 4 != 0 {
        return Err(SpriteFontError::BlockSizeMismatch { width, height });
    }
    let blocks_x = (width / 4) as usize;
    expect_len(data, blocks_x * (height / 4) as usize * BLOCK_BYTES)?;
    let mut img = RgbaImage::new(width, height);
    for (n, block) in data.chunks_exact(BLOCK_BYTES).take(blocks_x * (height / 4) as usize).enumerate() {
        let bx = (n % blocks_x) as u32 * 4;
        let by = (n / blocks_x) as u32 * 4;
        let pixels = decode_block(block);
        for (i, px) in pixels.into_iter().enumerate() {
            img.put_pixel(bx + (i % 4) as u32, by + (i / 4) as u32, Rgba(px));
        }
    }
    Ok(img)
}

fn expand_565(c: u16) -> [u32; 3] {
    let r = ((c >> 11) & 0x1F) as u32;
    let g = ((c >> 5) & 0x3F) as u32;
    let b = (c & 0x1F) as u32;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

fn decode_block(block: &[u8]) -> [[u8; 4]; 16] {
    let mut alpha_bytes = [0u8; 8];
    alpha_bytes.copy_from_slice(&block[0..8]);
    let alpha_bits = u64::from_le_bytes(alpha_bytes);
    let c0 = expand_565(u16::from_le_bytes([block[8], block[9]]));
    let c1 = expand_565(u16::from_le_bytes([block[10], block[11]]));
    let rgb_bits = u32::from_le_bytes([block[12], block[13], block[14], block[15]]);

    // BC2 always uses four-colour interpolation.
    let lerp = |a: u32, b: u32, wa: u32, wb: u32| ((a * wa + b * wb) / 3) as u8;
    let palette: [[u8; 3]; 4] = [
        c0.map(|c| c as u8),
        c1.map(|c| c as u8),
        [0usize, 1, 2].map(|i| lerp(c0[i], c1[i], 2, 1)),
        [0usize, 1, 2].map(|i| lerp(c0[i], c1[i], 1, 2)),
    ];

    let mut out = [[0u8; 4]; 16];
    for (i, px) in out.iter_mut().enumerate() {
        let a = ((alpha_bits >> (i * 4)) & 0xF) as u8;
        let [r, g, b] = palette[((rgb_bits >> (i * 2)) & 0x3) as usize];
        *px = [r, g, b, a * 17];
    }
    out
}

/// Decodes any supported payload back into an RGBA surface.
pub fn decode(format: TextureFormat, data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    match format {
        TextureFormat::Rgba32 => decode_rgba32(data, width, height),
        TextureFormat::Bgra4444 => decode_bgra4444(data, width, height),
        TextureFormat::CompressedMono => decode_compressed_mono(data, width, height),
        TextureFormat::Auto => Err(SpriteFontError::UnsupportedFormat("auto".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_levels_agree_between_rgb_and_alpha() {
        // Each (alpha nibble, rgb index) pair decodes to the same fraction.
        for (value, expected) in [(0u8, 0u8), (60, 85), (150, 170), (255, 255)] {
            let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, value]));
            let block = compress_block(&img, 0, 0, true);
            let px = decode_block(&block)[0];
            assert_eq!(px[3], expected, "alpha for {value}");
            assert_eq!(px[0], expected, "rgb for {value}");
        }
    }

    #[test]
    fn quantize_thresholds() {
        assert_eq!(quantize_mono(41, true), (0, 1));
        assert_eq!(quantize_mono(42, true), (5, 3));
        assert_eq!(quantize_mono(127, true), (5, 3));
        assert_eq!(quantize_mono(128, true), (10, 2));
        assert_eq!(quantize_mono(212, true), (10, 2));
        assert_eq!(quantize_mono(213, true), (15, 0));
        assert_eq!(quantize_mono(0xA7, false), (0xA, 0));
    }

    #[test]
    fn block_layout() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let block = compress_block(&img, 0, 0, false);
        assert_eq!(u64::from_le_bytes(block[0..8].try_into().unwrap()), 0xF0);
        assert_eq!(&block[8..12], &[0xFF, 0xFF, 0x00, 0x00]);
        assert_eq!(u32::from_le_bytes(block[12..16].try_into().unwrap()), 0);
    }
}
