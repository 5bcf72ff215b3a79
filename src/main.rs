use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dithercast::models::{AppConfig, Frame, VideoMetadata};
use dithercast::pipeline::{DitherFilter, FlipDirection, FlipFilter, PipelineBuilder};
use dithercast::services::{FramePlayer, RepeatCount, RepeatingFrameSource};
use index_dither::IndexedImage;

#[derive(Parser)]
#[command(name = "dithercast")]
#[command(about = "Palette quantization and dithering for frame streams")]
struct Cli {
    /// Configuration file (overrides CONFIG_FILE)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dither a PNG image and write the palette-snapped result
    Dither {
        /// Input PNG file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Algorithm override (e.g. "atkinson", "ordered")
        #[arg(short, long)]
        algorithm: Option<String>,
    },
    /// Play a synthetic animation through the configured pipeline
    Play {
        /// How long to play, in seconds
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,

        /// Source frame rate
        #[arg(long, default_value_t = 30.0)]
        fps: f32,

        /// Frame width
        #[arg(long, default_value_t = 128)]
        width: usize,

        /// Frame height
        #[arg(long, default_value_t = 72)]
        height: usize,

        /// Mirror frames horizontally before dithering
        #[arg(long)]
        flip: bool,
    },
    /// Build the configured palette and report how long it took
    Palette,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dithercast=info,index_dither=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_file = cli
        .config
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));
    let config = match config_file {
        Some(path) => AppConfig::load(path),
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Dither {
            input,
            output,
            algorithm,
        } => run_dither_command(config, &input, &output, algorithm),
        Commands::Play {
            seconds,
            fps,
            width,
            height,
            flip,
        } => run_play_command(config, seconds, fps, width, height, flip).await,
        Commands::Palette => run_palette_command(&config),
    }
}

/// Dither a single PNG file (no player needed)
fn run_dither_command(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
    algorithm: Option<String>,
) -> anyhow::Result<()> {
    if let Some(algorithm) = algorithm {
        config.algorithm = algorithm;
    }
    let pool = config.build_dither_pool()?;
    let palette = config.build_palette(pool.as_ref())?;
    let dither = config.build_dither(palette)?;

    let frame = read_png(input)?;
    let started = Instant::now();
    let image = IndexedImage::dither(dither.as_ref(), frame.pixels(), frame.width());
    tracing::info!(
        algorithm = %dither.algorithm(),
        width = image.width(),
        height = image.height(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dithered image"
    );

    write_png(output, image.width(), image.height(), &image.to_rgb_bytes())?;
    println!("Wrote {}", output.display());
    Ok(())
}

async fn run_play_command(
    config: AppConfig,
    seconds: u64,
    fps: f32,
    width: usize,
    height: usize,
    flip: bool,
) -> anyhow::Result<()> {
    let pool = config.build_dither_pool()?;
    let palette = config.build_palette(pool.as_ref())?;
    let dither = config.build_dither(palette)?;

    let delivered = Arc::new(AtomicU64::new(0));
    let sink = {
        let delivered = Arc::clone(&delivered);
        move |indices: Vec<u8>, metadata: &VideoMetadata| {
            let n = delivered.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(frame = n, bytes = indices.len(), width = metadata.width, "Frame dithered");
        }
    };
    let mut dither_filter = DitherFilter::new(dither, sink);
    if let Some(pool) = pool {
        dither_filter = dither_filter.with_pool(pool);
    }

    let mut builder = PipelineBuilder::video();
    if flip {
        builder = builder.then(FlipFilter::new(FlipDirection::Horizontal));
    }
    let chain = builder.then(dither_filter).build();

    let source = RepeatingFrameSource::new(sweep_frames(width, height, 24), fps, RepeatCount::Forever)?;
    let player = FramePlayer::new(config.player_options());
    player.video_callback().attach(chain);
    player.start(source)?;

    tokio::time::sleep(Duration::from_secs(seconds)).await;
    tokio::task::spawn_blocking(move || {
        player.release();
        player.stats()
    })
    .await
    .map(|stats| {
        println!(
            "Played {} frames ({} delivered, {} rejected, {} empty polls)",
            stats.frames_processed,
            delivered.load(Ordering::Relaxed),
            stats.frames_rejected,
            stats.empty_polls
        );
    })?;
    Ok(())
}

fn run_palette_command(config: &AppConfig) -> anyhow::Result<()> {
    let pool = config.build_dither_pool()?;
    let started = Instant::now();
    let palette = config.build_palette(pool.as_ref())?;
    println!(
        "Palette: {} colors, transparent slot {}, built in {:?}",
        palette.len(),
        if palette.reserves_transparent() { "reserved" } else { "unused" },
        started.elapsed()
    );
    for (index, color) in palette.colors().iter().enumerate() {
        println!("  {index:3}  #{:06X}", color & 0x00FF_FFFF);
    }
    Ok(())
}

/// Horizontal color sweep, shifted a little on every frame.
fn sweep_frames(width: usize, height: usize, count: usize) -> Vec<Frame> {
    (0..count)
        .map(|t| {
            let mut frame = Frame::blank(width, height);
            for (i, pixel) in frame.pixels_mut().iter_mut().enumerate() {
                let (x, y) = (i % width, i / width);
                let r = ((x + t * width / count) * 255 / width.max(1)) as u32 & 0xFF;
                let g = (y * 255 / height.max(1)) as u32 & 0xFF;
                let b = (255 - r) & 0xFF;
                *pixel = 0xFF00_0000 | r << 16 | g << 8 | b;
            }
            frame
        })
        .collect()
}

fn read_png(path: &Path) -> anyhow::Result<Frame> {
    let mut decoder = png::Decoder::new(File::open(path)?);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];
    let (width, height) = (info.width as usize, info.height as usize);

    let frame = match info.color_type {
        png::ColorType::Rgb => Frame::from_rgb_bytes(bytes, width, height)?,
        png::ColorType::Rgba => Frame::from_rgba_bytes(bytes, width, height)?,
        png::ColorType::Grayscale => {
            let rgb: Vec<u8> = bytes.iter().flat_map(|&v| [v, v, v]).collect();
            Frame::from_rgb_bytes(&rgb, width, height)?
        }
        png::ColorType::GrayscaleAlpha => {
            let rgba: Vec<u8> = bytes
                .chunks_exact(2)
                .flat_map(|c| [c[0], c[0], c[0], c[1]])
                .collect();
            Frame::from_rgba_bytes(&rgba, width, height)?
        }
        png::ColorType::Indexed => anyhow::bail!("indexed PNG was not expanded"),
    };
    Ok(frame)
}

fn write_png(path: &Path, width: usize, height: usize, rgb: &[u8]) -> anyhow::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(writer, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    Ok(())
}
