use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteFontError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Font does not contain any glyphs")]
    Empty,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("The specified default character U+{0:04X} is not part of this font")]
    MissingDefaultCharacter(u32),
    #[error("Character U+{0:04X} appears more than once in the glyph set")]
    DuplicateCharacter(u32),
    #[error("Block compression requires texture size to be a multiple of 4 (got {width}x{height})")]
    BlockSizeMismatch { width: u32, height: u32 },
    #[error("Glyph of size {width}x{height} could not be placed in the atlas")]
    OutOfSpace { width: u32, height: u32 },
    #[error("Unsupported texture format: {0}")]
    UnsupportedFormat(String),
    #[error("Not a spritefont file (bad magic)")]
    InvalidMagic,
    #[error("Spritefont file is truncated")]
    Truncated,
}

pub type Result<T> = std::result::Result<T, SpriteFontError>;
