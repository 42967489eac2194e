//! Core library for baking glyph images into sprite fonts.
//!
//! - Cropping: trims transparent borders while keeping glyph metrics intact
//! - Packing: tight height-bucketed guillotine, or a fast uniform grid
//! - Compositing: one atlas with a 1px filtering border around every glyph
//! - Encoding: RGBA32, BGRA4444, and a fixed-endpoint BC2 variant for monochrome fonts
//! - Binary spritefont writer and reader
//!
//! Quick example:
//! ```ignore
//! use std::sync::Arc;
//! use spritefont_core::{Glyph, ImportedFont, SpriteFontConfig, make_sprite_font};
//! # fn main() -> anyhow::Result<()> {
//! let img = image::ImageReader::open("a.png")?.decode()?.to_rgba8();
//! let font = ImportedFont {
//!     glyphs: vec![Glyph::new('a' as u32, Arc::new(img))],
//!     line_spacing: 16.0,
//! };
//! let out = make_sprite_font(font, &SpriteFontConfig::default())?;
//! std::fs::write("font.spritefont", out.to_bytes()?)?;
//! println!("{}", out.stats.summary());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod crop;
pub mod error;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod reader;
pub mod texture;
pub mod writer;

pub use config::*;
pub use error::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `spritefont_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        FeatureLevel, PackMode, SpriteFontConfig, SpriteFontConfigBuilder, TextureFormat,
    };
    pub use crate::crop::{crop_glyph, crop_glyphs};
    pub use crate::model::{Arrangement, Glyph, PackStats, PackedRect, Rect};
    pub use crate::packer::arrange_glyphs;
    pub use crate::reader::read_sprite_font;
    pub use crate::texture::EncodedTexture;
    pub use crate::writer::{GlyphMetrics, SpriteFontFile, write_sprite_font};
    pub use crate::{ImportedFont, SpriteFontOutput, make_sprite_font};
}
