use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Glyph placement strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackMode {
    /// Height-bucketed guillotine packing; dense and deterministic.
    #[default]
    Tight,
    /// Uniform grid of max-glyph-sized cells; O(N), much larger atlas.
    Fast,
}

impl FromStr for PackMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tight" | "guillotine" => Ok(Self::Tight),
            "fast" | "grid" => Ok(Self::Fast),
            _ => Err(()),
        }
    }
}

/// Output pixel encodings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    /// Compressed mono when the atlas is white-only, RGBA32 otherwise.
    #[default]
    Auto,
    Rgba32,
    Bgra4444,
    CompressedMono,
}

impl TextureFormat {
    /// Stable numeric identifier written to the file (DXGI enumeration values).
    /// `Auto` has no identifier and must be resolved first.
    pub fn format_tag(self) -> Option<u32> {
        match self {
            TextureFormat::Auto => None,
            TextureFormat::Rgba32 => Some(28),
            TextureFormat::Bgra4444 => Some(115),
            TextureFormat::CompressedMono => Some(74),
        }
    }

    pub fn from_format_tag(tag: u32) -> Option<Self> {
        match tag {
            28 => Some(TextureFormat::Rgba32),
            115 => Some(TextureFormat::Bgra4444),
            74 => Some(TextureFormat::CompressedMono),
            _ => None,
        }
    }
}

impl FromStr for TextureFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "rgba32" | "rgba" => Ok(Self::Rgba32),
            "bgra4444" | "4444" => Ok(Self::Bgra4444),
            "compressedmono" | "compressed_mono" | "mono" | "bc2" => Ok(Self::CompressedMono),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextureFormat::Auto => "Auto",
            TextureFormat::Rgba32 => "Rgba32",
            TextureFormat::Bgra4444 => "Bgra4444",
            TextureFormat::CompressedMono => "CompressedMono",
        };
        f.write_str(s)
    }
}

/// Target device capability; only used for texture size warnings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FeatureLevel {
    #[default]
    #[serde(rename = "9.1")]
    Fl9_1,
    #[serde(rename = "9.2")]
    Fl9_2,
    #[serde(rename = "9.3")]
    Fl9_3,
    #[serde(rename = "10.0")]
    Fl10_0,
    #[serde(rename = "10.1")]
    Fl10_1,
    #[serde(rename = "11.0")]
    Fl11_0,
    #[serde(rename = "11.1")]
    Fl11_1,
    #[serde(rename = "12.0")]
    Fl12_0,
    #[serde(rename = "12.1")]
    Fl12_1,
}

impl FromStr for FeatureLevel {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        let s = s.trim_start_matches("fl").replace('_', ".");
        match s.as_str() {
            "9.1" => Ok(Self::Fl9_1),
            "9.2" => Ok(Self::Fl9_2),
            "9.3" => Ok(Self::Fl9_3),
            "10.0" => Ok(Self::Fl10_0),
            "10.1" => Ok(Self::Fl10_1),
            "11.0" => Ok(Self::Fl11_0),
            "11.1" => Ok(Self::Fl11_1),
            "12.0" => Ok(Self::Fl12_0),
            "12.1" => Ok(Self::Fl12_1),
            _ => Err(()),
        }
    }
}

impl FeatureLevel {
    /// Largest texture dimension this level guarantees.
    pub fn max_texture_dimension(self) -> u32 {
        match self {
            FeatureLevel::Fl9_1 | FeatureLevel::Fl9_2 => 2048,
            FeatureLevel::Fl9_3 => 4096,
            FeatureLevel::Fl10_0 | FeatureLevel::Fl10_1 => 8192,
            _ => 16384,
        }
    }
}

/// Conversion options.
/// Key notes:
///   - `pack_mode` selects the tight guillotine packer or the fast uniform grid
///   - `texture_format` `Auto` picks compressed mono for white-only atlases, else RGBA32
///   - `premultiply` converts the atlas to premultiplied alpha before encoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpriteFontConfig {
    #[serde(default)]
    pub pack_mode: PackMode,
    #[serde(default)]
    pub texture_format: TextureFormat,
    /// Convert the atlas to premultiplied alpha before encoding.
    #[serde(default = "default_premultiply")]
    pub premultiply: bool,
    /// Fallback codepoint for missing characters; 0 means none.
    #[serde(default)]
    pub default_character: u32,
    /// Added to the imported line spacing.
    #[serde(default)]
    pub line_spacing: f32,
    /// Added to every glyph's advance.
    #[serde(default)]
    pub character_spacing: f32,
    #[serde(default)]
    pub feature_level: FeatureLevel,
    /// Crop and compress on the rayon pool when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for SpriteFontConfig {
    fn default() -> Self {
        Self {
            pack_mode: PackMode::Tight,
            texture_format: TextureFormat::Auto,
            premultiply: default_premultiply(),
            default_character: 0,
            line_spacing: 0.0,
            character_spacing: 0.0,
            feature_level: FeatureLevel::Fl9_1,
            parallel: false,
        }
    }
}

fn default_premultiply() -> bool {
    true
}

impl SpriteFontConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if the default character is not a valid Unicode scalar
    /// value or a spacing adjustment is not finite.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpriteFontError;

        if self.default_character != 0 && char::from_u32(self.default_character).is_none() {
            return Err(SpriteFontError::InvalidConfig(format!(
                "default_character 0x{:X} is not a valid Unicode scalar value",
                self.default_character
            )));
        }
        if !self.line_spacing.is_finite() || !self.character_spacing.is_finite() {
            return Err(SpriteFontError::InvalidConfig(
                "line_spacing and character_spacing must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `SpriteFontConfig`.
    pub fn builder() -> SpriteFontConfigBuilder {
        SpriteFontConfigBuilder::new()
    }
}

/// Builder for `SpriteFontConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SpriteFontConfigBuilder {
    cfg: SpriteFontConfig,
}

impl SpriteFontConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: SpriteFontConfig::default(),
        }
    }
    pub fn pack_mode(mut self, v: PackMode) -> Self {
        self.cfg.pack_mode = v;
        self
    }
    pub fn texture_format(mut self, v: TextureFormat) -> Self {
        self.cfg.texture_format = v;
        self
    }
    pub fn premultiply(mut self, v: bool) -> Self {
        self.cfg.premultiply = v;
        self
    }
    pub fn default_character(mut self, v: u32) -> Self {
        self.cfg.default_character = v;
        self
    }
    pub fn line_spacing(mut self, v: f32) -> Self {
        self.cfg.line_spacing = v;
        self
    }
    pub fn character_spacing(mut self, v: f32) -> Self {
        self.cfg.character_spacing = v;
        self
    }
    pub fn feature_level(mut self, v: FeatureLevel) -> Self {
        self.cfg.feature_level = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> SpriteFontConfig {
        self.cfg
    }
}
