use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use postweave::{
    AdjustmentSet, CollageSettings, Color, ComparisonLabels, ComparisonOptions, DecodedImage,
    ExportFormat, FontCatalog, FrameSequencer, LayoutRegistry, NoopEvents, PresetRegistry,
    SlideshowSpec, SplitOrientation, TemplateRegistry, TextOverlaySpec, TextPosition,
    encode_ffmpeg::{FfmpegSink, default_gif_config, default_mp4_config},
    encode_surface, parse_transition_kind, render_collage, render_comparison, render_still,
    run_slideshow,
};

#[derive(Parser, Debug)]
#[command(name = "postweave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single image onto a template canvas.
    Still(StillArgs),
    /// Render a multi-image collage.
    Collage(CollageArgs),
    /// Render a before/after comparison.
    Compare(CompareArgs),
    /// Render a slideshow to MP4 or GIF (requires `ffmpeg` on PATH).
    Slideshow(SlideshowArgs),
}

#[derive(Parser, Debug)]
struct StillArgs {
    /// Input image path.
    image: PathBuf,

    /// Template id (see the builtin registry).
    #[arg(long, default_value = "instagram-post")]
    template: String,

    /// Filter preset name.
    #[arg(long)]
    preset: Option<String>,

    /// Caption text baked into the export.
    #[arg(long)]
    caption: Option<String>,

    /// Font file for the caption (required with --caption).
    #[arg(long)]
    caption_font: Option<PathBuf>,

    #[arg(long, default_value_t = 32.0)]
    caption_size: f32,

    #[arg(long, value_enum, default_value_t = CaptionPosition::Bottom)]
    caption_position: CaptionPosition,

    /// Canvas background as #rrggbb.
    #[arg(long, default_value = "#000000")]
    background: String,

    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Output path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CollageArgs {
    /// Input image paths, in slot order.
    images: Vec<PathBuf>,

    #[arg(long, default_value = "instagram-post")]
    template: String,

    /// Layout key (e.g. "3-grid"); defaults to the first layout
    /// registered for the image count.
    #[arg(long)]
    layout: Option<String>,

    #[arg(long, default_value_t = 10.0)]
    spacing: f64,

    #[arg(long, default_value_t = 0.0)]
    border_width: f64,

    #[arg(long, default_value = "#ffffff")]
    border_color: String,

    #[arg(long, default_value = "#000000")]
    background: String,

    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    before: PathBuf,
    after: PathBuf,

    #[arg(long, default_value = "instagram-post")]
    template: String,

    #[arg(long, value_enum, default_value_t = Orientation::Vertical)]
    orientation: Orientation,

    /// Font file for the BEFORE/AFTER labels; omit for no labels.
    #[arg(long)]
    label_font: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SlideshowArgs {
    /// Input image paths, in playback order.
    images: Vec<PathBuf>,

    #[arg(long, default_value = "instagram-post")]
    template: String,

    /// fade | slide | zoom | dissolve | wipe | none
    #[arg(long, default_value = "fade")]
    transition: String,

    #[arg(long, default_value_t = 3000)]
    image_duration_ms: u64,

    #[arg(long, default_value_t = 500)]
    transition_duration_ms: u64,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output path; the extension picks the container (.mp4 or .gif).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Png,
    Jpeg,
    Webp,
}

impl From<Format> for ExportFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Png => ExportFormat::Png,
            Format::Jpeg => ExportFormat::Jpeg,
            Format::Webp => ExportFormat::Webp,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CaptionPosition {
    Top,
    Center,
    Bottom,
}

impl From<CaptionPosition> for TextPosition {
    fn from(value: CaptionPosition) -> Self {
        match value {
            CaptionPosition::Top => TextPosition::Top,
            CaptionPosition::Center => TextPosition::Center,
            CaptionPosition::Bottom => TextPosition::Bottom,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Orientation {
    Vertical,
    Horizontal,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Still(args) => cmd_still(args),
        Command::Collage(args) => cmd_collage(args),
        Command::Compare(args) => cmd_compare(args),
        Command::Slideshow(args) => cmd_slideshow(args),
    }
}

fn load_image(path: &Path) -> anyhow::Result<DecodedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok(postweave::decode_image(&bytes)?)
}

fn load_font(catalog: &mut FontCatalog, family: &str, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    catalog.register(family, bytes)?;
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("write output '{}'", path.display()))
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let templates = TemplateRegistry::builtin();
    let template = templates.get(&args.template)?;
    let image = load_image(&args.image)?;

    let adjustments = match &args.preset {
        Some(name) => AdjustmentSet::from_preset(PresetRegistry::builtin().get(name)?),
        None => AdjustmentSet::default(),
    };

    let mut fonts = FontCatalog::new();
    let text = match &args.caption {
        None => None,
        Some(caption) => {
            let font_path = args
                .caption_font
                .as_deref()
                .context("--caption requires --caption-font")?;
            load_font(&mut fonts, "caption", font_path)?;
            Some(TextOverlaySpec {
                text: caption.clone(),
                font_family: "caption".to_string(),
                size_px: args.caption_size,
                color: Color::WHITE,
                position: args.caption_position.into(),
            })
        }
    };

    let background = Color::from_hex(&args.background)?;
    let surface = render_still(
        &image,
        template,
        &adjustments,
        text.as_ref(),
        &fonts,
        background,
        &mut NoopEvents,
    )?;

    let bytes = encode_surface(&surface, args.format.into(), &mut NoopEvents)?;
    write_output(&args.out, &bytes)
}

fn cmd_collage(args: CollageArgs) -> anyhow::Result<()> {
    anyhow::ensure!(!args.images.is_empty(), "collage needs at least one image");

    let templates = TemplateRegistry::builtin();
    let template = templates.get(&args.template)?;

    let layouts = LayoutRegistry::builtin();
    let layout = match &args.layout {
        Some(key) => layouts.get(key)?,
        None => *layouts
            .layouts_for_slot_count(args.images.len())
            .first()
            .with_context(|| {
                format!("no builtin layout accepts {} images", args.images.len())
            })?,
    };

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        images.push(load_image(path)?);
    }
    let slots: Vec<Option<&DecodedImage>> =
        (0..layout.slot_count()).map(|i| images.get(i)).collect();

    let settings = CollageSettings {
        spacing: args.spacing,
        border_width: args.border_width,
        border_color: Color::from_hex(&args.border_color)?,
        background_color: Color::from_hex(&args.background)?,
    };

    let surface = render_collage(&slots, layout, template, &settings)?;
    let bytes = encode_surface(&surface, args.format.into(), &mut NoopEvents)?;
    write_output(&args.out, &bytes)
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let templates = TemplateRegistry::builtin();
    let template = templates.get(&args.template)?;

    let before = load_image(&args.before)?;
    let after = load_image(&args.after)?;

    let mut fonts = FontCatalog::new();
    let labels = match &args.label_font {
        None => None,
        Some(path) => {
            load_font(&mut fonts, "labels", path)?;
            Some(ComparisonLabels {
                font_family: "labels".to_string(),
                ..ComparisonLabels::default()
            })
        }
    };

    let options = ComparisonOptions {
        orientation: match args.orientation {
            Orientation::Vertical => SplitOrientation::Vertical,
            Orientation::Horizontal => SplitOrientation::Horizontal,
        },
        labels,
        ..ComparisonOptions::default()
    };

    let surface = render_comparison(&before, &after, template, &options, &fonts)?;
    let bytes = encode_surface(&surface, args.format.into(), &mut NoopEvents)?;
    write_output(&args.out, &bytes)
}

fn cmd_slideshow(args: SlideshowArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        !args.images.is_empty(),
        "slideshow needs at least one image"
    );

    let templates = TemplateRegistry::builtin();
    let template = templates.get(&args.template)?;

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        images.push(load_image(path)?);
    }
    let refs: Vec<&DecodedImage> = images.iter().collect();

    let spec = SlideshowSpec {
        image_duration_ms: args.image_duration_ms,
        transition_duration_ms: args.transition_duration_ms,
        fps: args.fps,
        transition: parse_transition_kind(&args.transition)?,
        seed: args.seed,
    };

    let ext = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let cfg = match ext.as_deref() {
        Some("mp4") => default_mp4_config(&args.out, template.width, template.height, spec.fps),
        Some("gif") => default_gif_config(&args.out, template.width, template.height, spec.fps),
        other => anyhow::bail!(
            "output extension must be .mp4 or .gif, got {:?}",
            other.unwrap_or("none")
        ),
    };

    let (sequencer, _cancel) = FrameSequencer::new(refs, template, spec)?;
    let mut sink = FfmpegSink::new(cfg, Color::BLACK)?;
    let frames = run_slideshow(sequencer, &mut sink, &mut NoopEvents)?;
    eprintln!("wrote {} frames to {}", frames, args.out.display());
    Ok(())
}
