use crate::regions::CharacterRegion;
use spritefont_core::ImportedFont;
use std::path::{Path, PathBuf};

pub mod bitmap;
pub mod truetype;

/// What an importer needs to know.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub source: PathBuf,
    pub regions: Vec<CharacterRegion>,
    /// TrueType size in points (96 dpi).
    pub font_size: f32,
    pub show_progress: bool,
}

/// Source font kinds, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontImporter {
    /// Marked-up glyph grid in an image file.
    Bitmap,
    /// TrueType / OpenType outline font.
    TrueType,
}

const BITMAP_EXTENSIONS: &[&str] = &["bmp", "png", "gif"];

impl FontImporter {
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if BITMAP_EXTENSIONS.contains(&ext.as_str()) {
            FontImporter::Bitmap
        } else {
            FontImporter::TrueType
        }
    }

    pub fn import(self, opts: &ImportOptions) -> anyhow::Result<ImportedFont> {
        match self {
            FontImporter::Bitmap => bitmap::import(opts),
            FontImporter::TrueType => truetype::import(opts),
        }
    }
}
