use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stillreel::timeline::{archive, ingest};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stillreel", version)]
struct Cli {
    /// JSON engine config; environment variables still override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Encoder binary, overriding config and environment.
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Locate the encoder and print what this build can export, as JSON.
    Probe,
    /// Turn image files into a project directory.
    Ingest(IngestArgs),
    /// Render the preview frame at one play head position as a PNG.
    Frame(FrameArgs),
    /// Export a project directory to a video file.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct IngestArgs {
    /// Output project directory.
    #[arg(long)]
    out: PathBuf,

    /// Editing frame rate, `30` or `30000/1001`.
    #[arg(long, default_value = "30")]
    fps: String,

    /// Duration of every clip; defaults to the configured clip duration.
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Images in playback order.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Play head position in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    t_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Project directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output file path.
    #[arg(long)]
    out: PathBuf,

    /// `mp4`, `webm` or `gif`; defaults to the output file extension.
    #[arg(long)]
    format: Option<String>,

    /// Export frame rate; defaults to the timeline's editing rate.
    #[arg(long)]
    fps: Option<String>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// `auto`, `concat`, `xfade` or `segmented`.
    #[arg(long, default_value = "auto")]
    strategy: String,

    /// Constant rate factor (ignored for gif).
    #[arg(long, conflicts_with = "bitrate_kbps")]
    crf: Option<u8>,

    /// Target bitrate in kbit/s (ignored for gif).
    #[arg(long)]
    bitrate_kbps: Option<u32>,

    /// Encoder speed preset.
    #[arg(long, default_value = "medium")]
    preset: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = stillreel::EngineConfig::load(cli.config.as_deref())?;
    if let Some(ffmpeg) = cli.ffmpeg {
        config.ffmpeg_path = Some(ffmpeg);
    }

    match cli.cmd {
        Command::Probe => cmd_probe(&config),
        Command::Ingest(args) => cmd_ingest(&config, args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(config, args),
    }
}

fn parse_fps(s: &str) -> anyhow::Result<stillreel::Fps> {
    let (num, den) = match s.split_once('/') {
        Some((n, d)) => (n.trim().parse()?, d.trim().parse()?),
        None => (s.trim().parse()?, 1),
    };
    Ok(stillreel::Fps::new(num, den)?)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_probe(config: &stillreel::EngineConfig) -> anyhow::Result<()> {
    let caps = stillreel::capabilities(config)?;
    println!("{}", serde_json::to_string_pretty(&caps)?);
    Ok(())
}

fn cmd_ingest(config: &stillreel::EngineConfig, args: IngestArgs) -> anyhow::Result<()> {
    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let img = ingest::IngestImage::from_bytes(bytes)
            .with_context(|| format!("ingest '{}'", path.display()))?;
        images.push(img);
    }
    let project = ingest::ingest(
        images,
        ingest::IngestOpts {
            default_duration_ms: args
                .duration_ms
                .unwrap_or(config.default_clip_duration_ms),
            fps: parse_fps(&args.fps)?,
        },
    )?;
    archive::write_project(&project, &args.out)?;
    eprintln!(
        "wrote {} ({} clips)",
        args.out.display(),
        project.timeline.len()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = archive::read_project(&args.in_path)?;
    let cache = stillreel::ImageCache::prepare(&project)?;
    let canvas = stillreel::Canvas::new(args.width, args.height)?;
    let compositor = stillreel::PreviewCompositor::new(&project.timeline, &cache, canvas)?;
    let frame = compositor.render_at(args.t_ms);

    // Frames are premultiplied; PNG wants straight alpha.
    let mut data = frame.data;
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a != 0 && a != 255 {
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(config: stillreel::EngineConfig, args: ExportArgs) -> anyhow::Result<()> {
    let project = archive::read_project(&args.in_path)?;

    let format: stillreel::OutputFormat = match &args.format {
        Some(f) => f.parse()?,
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .context("no --format given and the output path has no extension")?
            .parse()?,
    };
    let fps = match &args.fps {
        Some(s) => parse_fps(s)?,
        None => project.timeline.fps,
    };
    let canvas = stillreel::Canvas::new(args.width, args.height)?;

    let mut req = stillreel::ExportRequest::new(project, format, fps, canvas);
    req.strategy = args.strategy.parse()?;
    req.quality = stillreel::Quality {
        rate: match (args.crf, args.bitrate_kbps) {
            (_, Some(kbps)) => stillreel::RateControl::BitrateKbps(kbps),
            (Some(crf), None) => stillreel::RateControl::Crf(crf),
            (None, None) => stillreel::Quality::default().rate,
        },
        preset: args.preset,
    };

    let exporter = stillreel::Exporter::new(config);
    let artifact = exporter.export(&req, &mut stillreel::NoProgress, None)?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &artifact.bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({:?}, {} frames, {:.3}s)",
        args.out.display(),
        artifact.strategy,
        artifact.frames,
        artifact.duration_secs
    );
    Ok(())
}
