use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use galleria::{
    AspectCrop, AspectPreset, Compositor, CompositorOpts, CropProvider, CropRect, EditSession,
    FilterSpec, FreeformCrop, Quality, SourceImage, WatermarkSpec,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "galleria", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crop, filter, watermark and encode a photo as JPEG.
    Export(ExportArgs),
    /// Print the crop rectangle an aspect preset would use, as JSON.
    Fit(FitArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Source image (PNG, JPEG, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JPEG path, or an existing directory to use the suggested file name.
    #[arg(long)]
    out: PathBuf,

    /// Edit session JSON. Flags below override its fields.
    #[arg(long)]
    session: Option<PathBuf>,

    /// Free-form crop `x,y,w,h` in source pixels.
    #[arg(long, conflicts_with = "aspect")]
    crop: Option<String>,

    /// Aspect preset: original, square, portrait, landscape, story.
    #[arg(long)]
    aspect: Option<AspectPreset>,

    /// Zoom for `--aspect` (1.0 to 3.0).
    #[arg(long, requires = "aspect")]
    zoom: Option<f64>,

    /// Pan `x,y` for `--aspect`, each in [-1, 1].
    #[arg(long, requires = "aspect")]
    pan: Option<String>,

    /// CSS filter (`"grayscale(100%) contrast(1.2)"`) or a preset name.
    #[arg(long)]
    filter: Option<String>,

    /// Watermark text.
    #[arg(long)]
    watermark: Option<String>,

    /// Watermark font family.
    #[arg(long)]
    font: Option<String>,

    /// Quality in (0, 1].
    #[arg(long, conflicts_with = "smart")]
    quality: Option<f32>,

    /// Use smart compression (quality 0.8).
    #[arg(long, default_value_t = false)]
    smart: bool,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Aspect preset.
    #[arg(long, default_value = "original")]
    aspect: AspectPreset,

    /// Zoom (1.0 to 3.0).
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Pan `x,y`, each in [-1, 1].
    #[arg(long)]
    pan: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Fit(args) => cmd_fit(args),
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let source = SourceImage::open(&args.in_path)?;
    let size = source.decode()?;

    let mut session = match &args.session {
        Some(path) => EditSession::from_path(path)?,
        None => EditSession::crop_only(CropRect::full(size)),
    };

    if let Some(spec) = &args.crop {
        let v = parse_floats::<4>(spec).context("parse --crop")?;
        let provider = FreeformCrop::new(CropRect::new(v[0], v[1], v[2], v[3]));
        session = session.with_crop(provider.crop_rect(size)?);
    } else if let Some(preset) = args.aspect {
        let zoom = args.zoom.unwrap_or(AspectCrop::MIN_ZOOM);
        let crop = aspect_crop(preset, zoom, args.pan.as_deref())?;
        session = session.with_crop(crop.crop_rect(size)?);
    }

    if let Some(filter) = &args.filter {
        session = session.with_filter(Some(FilterSpec::parse(filter)?));
    }

    if let Some(text) = &args.watermark {
        let family = args.font.clone().unwrap_or_else(|| "sans-serif".to_string());
        session = session.with_watermark(Some(WatermarkSpec::new(text.clone(), family)));
    } else if let (Some(font), Some(wm)) = (&args.font, session.watermark()) {
        let wm = WatermarkSpec::new(wm.text.clone(), font.clone());
        session = session.with_watermark(Some(wm));
    }

    if args.smart {
        session = session.with_quality(Quality::SMART);
    } else if let Some(q) = args.quality {
        session = session.with_quality(Quality::new(q)?);
    }

    let mut opts = CompositorOpts::from_env()?;
    opts.font_dirs.extend(args.font_dirs);
    if session.watermark().is_none() {
        opts.system_fonts = false;
        opts.font_dirs.clear();
    }
    let compositor = Compositor::new(opts)?;

    let encoded = compositor.compose(&source, &session)?;
    let written = encoded.write_to(&args.out)?;

    eprintln!(
        "wrote {} ({}x{}, {} bytes)",
        written.display(),
        encoded.size().width,
        encoded.size().height,
        encoded.bytes().len()
    );
    Ok(())
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    let source = SourceImage::open(&args.in_path)?;
    let size = source.decode()?;
    let crop = aspect_crop(args.aspect, args.zoom, args.pan.as_deref())?.crop_rect(size)?;
    println!("{}", serde_json::to_string_pretty(&crop)?);
    Ok(())
}

fn aspect_crop(
    preset: AspectPreset,
    zoom: f64,
    pan: Option<&str>,
) -> anyhow::Result<AspectCrop> {
    let (px, py) = match pan {
        Some(s) => {
            let v = parse_floats::<2>(s).context("parse --pan")?;
            (v[0], v[1])
        }
        None => (0.0, 0.0),
    };
    Ok(AspectCrop::preset(preset).with_zoom(zoom).with_pan(px, py))
}

fn parse_floats<const N: usize>(s: &str) -> anyhow::Result<[f64; N]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        anyhow::bail!("expected {N} comma-separated numbers, got '{s}'");
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .with_context(|| format!("'{part}' is not a number"))?;
    }
    Ok(out)
}
