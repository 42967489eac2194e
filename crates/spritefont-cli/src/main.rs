use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;
use spritefont_core::texture::decode;
use spritefont_core::{
    FeatureLevel, ImportedFont, PackMode, SpriteFontConfig, TextureFormat, make_sprite_font,
};
use tracing::{info, warn};

mod importer;
mod regions;

use importer::{FontImporter, ImportOptions};
use regions::{CharacterRegion, parse_character};

#[derive(Parser, Debug)]
#[command(
    name = "make-spritefont",
    about = "Bake a TrueType or bitmap font into a .spritefont file",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a font into a spritefont
    Convert(ConvertArgs),
    /// Print the contents of an existing spritefont
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
struct ConvertArgs {
    // Input/Output
    /// Font file: .ttf/.otf, or a marked-up .bmp/.png/.gif glyph grid
    #[arg(help_heading = "Input/Output")]
    source: PathBuf,
    /// Output .spritefont path
    #[arg(help_heading = "Input/Output")]
    output: PathBuf,
    /// YAML config file (overrides the options it sets)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Font
    /// Characters to include: "A", "a-z", "32-127", "0x20-0x7F" (repeatable)
    #[arg(long = "character-region", alias = "cr", help_heading = "Font")]
    character_regions: Vec<CharacterRegion>,
    /// Fallback for characters missing from the font
    #[arg(long, alias = "dc", help_heading = "Font")]
    default_character: Option<String>,
    /// TrueType size in points
    #[arg(long, default_value_t = 23.0, help_heading = "Font")]
    font_size: f32,
    /// Extra vertical space between lines
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, help_heading = "Font")]
    line_spacing: f32,
    /// Extra horizontal space between characters
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, help_heading = "Font")]
    character_spacing: f32,

    // Texture
    /// Texture format: auto | rgba32 | bgra4444 | compressed_mono
    #[arg(long, default_value = "auto", help_heading = "Texture")]
    texture_format: String,
    /// Keep straight alpha instead of premultiplying
    #[arg(long, default_value_t = false, help_heading = "Texture")]
    no_premultiply: bool,
    /// Target feature level for size warnings: 9.1 .. 12.1
    #[arg(long, default_value = "9.1", help_heading = "Texture")]
    feature_level: String,
    /// Grid packing: much faster, much larger atlas
    #[arg(long, default_value_t = false, help_heading = "Texture")]
    fast_pack: bool,
    /// Crop and compress in parallel (requires feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Texture")]
    parallel: bool,

    // Export
    /// Also write the atlas as PNG
    #[arg(long, help_heading = "Export")]
    debug_output_sprite_sheet: Option<PathBuf>,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// Spritefont file
    input: PathBuf,
    /// List every glyph
    #[arg(long, default_value_t = false)]
    glyphs: bool,
    /// Decode the texture and save it as PNG
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Convert(args) => run_convert(args, cli.progress && !cli.quiet),
        Commands::Inspect(args) => run_inspect(args),
    }
}

/// Everything a conversion needs besides the source path.
#[derive(Debug, Clone, serde::Serialize)]
struct ConvertSettings {
    character_regions: Vec<CharacterRegion>,
    font_size: f32,
    #[serde(flatten)]
    core: SpriteFontConfig,
}

fn settings_from_args(args: &ConvertArgs) -> anyhow::Result<ConvertSettings> {
    let default_character = match &args.default_character {
        Some(s) => parse_character(s)?,
        None => 0,
    };
    let core = SpriteFontConfig::builder()
        .pack_mode(if args.fast_pack {
            PackMode::Fast
        } else {
            PackMode::Tight
        })
        .texture_format(parse_texture_format(&args.texture_format)?)
        .premultiply(!args.no_premultiply)
        .default_character(default_character)
        .line_spacing(args.line_spacing)
        .character_spacing(args.character_spacing)
        .feature_level(parse_feature_level(&args.feature_level)?)
        .parallel(args.parallel)
        .build();

    let mut settings = ConvertSettings {
        character_regions: args.character_regions.clone(),
        font_size: args.font_size,
        core,
    };
    if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.apply(&mut settings)?;
    }
    if settings.character_regions.is_empty() {
        settings.character_regions.push(regions::DEFAULT_REGION);
    }
    if settings.core.parallel && !cfg!(feature = "parallel") {
        warn!("parallel requested but the `parallel` feature is off; running sequentially");
    }
    settings.core.validate()?;
    Ok(settings)
}

fn run_convert(args: &ConvertArgs, show_progress: bool) -> anyhow::Result<()> {
    let settings = settings_from_args(args)?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&settings)?),
            _ => println!("{}", serde_json::to_string_pretty(&settings)?),
        }
        return Ok(());
    }

    let importer = FontImporter::for_path(&args.source);
    info!(source = %args.source.display(), ?importer, "importing font");
    let opts = ImportOptions {
        source: args.source.clone(),
        regions: settings.character_regions.clone(),
        font_size: settings.font_size,
        show_progress,
    };
    let font: ImportedFont = importer.import(&opts)?;
    if font.glyphs.is_empty() {
        anyhow::bail!("no glyphs found in '{}'", args.source.display());
    }

    let out = make_sprite_font(font, &settings.core)
        .with_context(|| format!("convert '{}'", args.source.display()))?;
    info!("{}", out.stats.summary());

    if let Some(png) = &args.debug_output_sprite_sheet {
        ensure_parent_dir(png)?;
        out.atlas
            .save(png)
            .with_context(|| format!("write sprite sheet {}", png.display()))?;
        info!(path = %png.display(), "wrote debug sprite sheet");
    }

    info!(path = %args.output.display(), "writing spritefont");
    ensure_parent_dir(&args.output)?;
    let bytes = out.to_bytes()?;
    fs::write(&args.output, &bytes)
        .with_context(|| format!("write {}", args.output.display()))?;

    if let Some(stats_path) = &args.export_stats {
        let mut value = serde_json::to_value(&out.stats)?;
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "texture_format".into(),
                serde_json::json!(out.file.texture.format.to_string()),
            );
            map.insert("file_bytes".into(), serde_json::json!(bytes.len()));
        }
        ensure_parent_dir(stats_path)?;
        fs::write(stats_path, serde_json::to_vec_pretty(&value)?)
            .with_context(|| format!("write stats {}", stats_path.display()))?;
    }
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.input).with_context(|| format!("read {}", args.input.display()))?;
    let font = spritefont_core::reader::from_bytes(&bytes)
        .with_context(|| format!("parse {}", args.input.display()))?;
    let tex = &font.texture;
    println!("glyphs: {}", font.glyphs.len());
    println!("line spacing: {}", font.line_spacing);
    match char::from_u32(font.default_character).filter(|_| font.default_character != 0) {
        Some(c) => println!("default character: {:?} (U+{:04X})", c, font.default_character),
        None => println!("default character: none"),
    }
    println!(
        "texture: {}x{} {} (pitch {}, rows {}, {} bytes)",
        tex.width,
        tex.height,
        tex.format,
        tex.pitch,
        tex.rows,
        tex.data.len()
    );
    if args.glyphs {
        for g in &font.glyphs {
            let label = char::from_u32(g.character)
                .filter(|c| !c.is_control())
                .map(|c| c.to_string())
                .unwrap_or_default();
            println!(
                "U+{:04X} {:>2} at ({}, {}) {}x{} offset ({}, {}) advance {}",
                g.character,
                label,
                g.subrect.x,
                g.subrect.y,
                g.subrect.w,
                g.subrect.h,
                g.x_offset,
                g.y_offset,
                g.x_advance
            );
        }
    }
    if let Some(png) = &args.dump {
        let image = decode(tex.format, &tex.data, tex.width, tex.height)?;
        ensure_parent_dir(png)?;
        image
            .save(png)
            .with_context(|| format!("write {}", png.display()))?;
        info!(path = %png.display(), "decoded texture");
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    Ok(())
}

fn parse_texture_format(s: &str) -> anyhow::Result<TextureFormat> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown texture format: {}", s))
}

fn parse_feature_level(s: &str) -> anyhow::Result<FeatureLevel> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown feature level: {}", s))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlConfig {
    character_regions: Option<Vec<String>>,
    default_character: Option<String>,
    font_size: Option<f32>,
    line_spacing: Option<f32>,
    character_spacing: Option<f32>,
    texture_format: Option<String>,
    premultiply: Option<bool>,
    feature_level: Option<String>,
    fast_pack: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn apply(self, s: &mut ConvertSettings) -> anyhow::Result<()> {
        if let Some(list) = self.character_regions {
            s.character_regions = list
                .iter()
                .map(|r| r.parse())
                .collect::<anyhow::Result<_>>()?;
        }
        if let Some(v) = self.default_character {
            s.core.default_character = parse_character(&v)?;
        }
        if let Some(v) = self.font_size {
            s.font_size = v;
        }
        if let Some(v) = self.line_spacing {
            s.core.line_spacing = v;
        }
        if let Some(v) = self.character_spacing {
            s.core.character_spacing = v;
        }
        if let Some(v) = self.texture_format {
            s.core.texture_format = parse_texture_format(&v)?;
        }
        if let Some(v) = self.premultiply {
            s.core.premultiply = v;
        }
        if let Some(v) = self.feature_level {
            s.core.feature_level = parse_feature_level(&v)?;
        }
        if let Some(v) = self.fast_pack {
            s.core.pack_mode = if v { PackMode::Fast } else { PackMode::Tight };
        }
        if let Some(v) = self.parallel {
            s.core.parallel = v;
        }
        Ok(())
    }
}
