use crate::compositing::{compose, relocate_glyphs};
use crate::config::{SpriteFontConfig, TextureFormat};
use crate::crop::crop_glyphs;
use crate::error::{Result, SpriteFontError};
use crate::model::{Glyph, PackStats};
use crate::packer::{MAX_TEXTURE_DIMENSION, arrange_glyphs};
use crate::texture::{encode, premultiply_alpha, resolve_format};
use crate::writer::{GlyphMetrics, SpriteFontFile};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Glyphs and line spacing produced by an importer.
pub struct ImportedFont {
    pub glyphs: Vec<Glyph>,
    pub line_spacing: f32,
}

/// Output of a conversion: the file image, the final atlas and statistics.
pub struct SpriteFontOutput {
    pub file: SpriteFontFile,
    /// Glyphs in codepoint order, pointing into `atlas`.
    pub glyphs: Vec<Glyph>,
    /// Atlas as encoded (premultiplied unless disabled).
    pub atlas: Arc<RgbaImage>,
    pub stats: PackStats,
}

impl SpriteFontOutput {
    /// Serializes the file image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::writer::to_bytes(&self.file)
    }
}

/// Sorts glyphs by codepoint and checks the set against `cfg`.
pub fn validate_glyphs(glyphs: &mut [Glyph], cfg: &SpriteFontConfig) -> Result<()> {
    if glyphs.is_empty() {
        return Err(SpriteFontError::Empty);
    }
    glyphs.sort_by_key(|g| g.character);
    if let Some(dup) = glyphs.windows(2).find(|w| w[0].character == w[1].character) {
        return Err(SpriteFontError::DuplicateCharacter(dup[0].character));
    }
    for g in glyphs.iter() {
        let (bw, bh) = g.bitmap.dimensions();
        if g.subrect.w == 0 || g.subrect.h == 0 || g.subrect.right() > bw || g.subrect.bottom() > bh {
            return Err(SpriteFontError::InvalidInput(format!(
                "glyph U+{:04X} region {:?} does not fit its {}x{} bitmap",
                g.character, g.subrect, bw, bh
            )));
        }
    }
    if cfg.default_character != 0 && !glyphs.iter().any(|g| g.character == cfg.default_character) {
        return Err(SpriteFontError::MissingDefaultCharacter(cfg.default_character));
    }
    Ok(())
}

fn warn_texture_size(width: u32, height: u32, cfg: &SpriteFontConfig) {
    let dim = width.max(height);
    if dim > MAX_TEXTURE_DIMENSION {
        warn!(width, height, "resulting texture is too large for all known feature levels");
    } else if dim > cfg.feature_level.max_texture_dimension() {
        warn!(
            width,
            height,
            feature_level = ?cfg.feature_level,
            "resulting texture exceeds the configured feature level"
        );
    }
}

#[instrument(skip_all)]
/// Converts imported glyphs into a spritefont.
///
/// Steps: validate and sort, crop, arrange, compose, apply spacing, pick the
/// texture format, premultiply, encode.
pub fn make_sprite_font(font: ImportedFont, cfg: &SpriteFontConfig) -> Result<SpriteFontOutput> {
    cfg.validate()?;
    let ImportedFont {
        mut glyphs,
        mut line_spacing,
    } = font;

    validate_glyphs(&mut glyphs, cfg)?;
    info!(count = glyphs.len(), "captured glyphs");

    info!("cropping glyph borders");
    crop_glyphs(&mut glyphs, cfg.parallel);

    info!(mode = ?cfg.pack_mode, "packing glyphs into sprite sheet");
    let arrangement = arrange_glyphs(&glyphs, cfg.pack_mode)?;
    let composed = compose(&glyphs, &arrangement);
    warn_texture_size(arrangement.width, arrangement.height, cfg);

    line_spacing += cfg.line_spacing;
    for g in &mut glyphs {
        g.x_advance += cfg.character_spacing;
    }

    let mut image = composed.image;
    let format = resolve_format(cfg.texture_format, &image);
    if cfg.texture_format == TextureFormat::Auto {
        info!(%format, "detected texture format");
    }

    if cfg.premultiply {
        info!("premultiplying alpha");
        premultiply_alpha(&mut image);
    }

    let texture = encode(&image, format, cfg.premultiply, cfg.parallel)?;
    let atlas = Arc::new(image);
    relocate_glyphs(&mut glyphs, &arrangement, &atlas);

    let stats = PackStats {
        glyph_count: glyphs.len(),
        atlas_width: arrangement.width,
        atlas_height: arrangement.height,
        used_area: composed.used_area,
        efficiency: composed.efficiency,
    };

    let file = SpriteFontFile {
        glyphs: glyphs.iter().map(GlyphMetrics::from).collect(),
        line_spacing,
        default_character: cfg.default_character,
        texture,
    };

    Ok(SpriteFontOutput {
        file,
        glyphs,
        atlas,
        stats,
    })
}

