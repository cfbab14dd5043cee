use anyhow::{Context, Result, bail};
use clap::Parser;
use fovstat::export::write_csv_tables;
use fovstat::frames::FrameWriter;
use fovstat::input::{ImageConfigs, collect_images, image_files};
use fovstat::sampling::{
    BatchRunner, ContourRetrieval, DEFAULT_MAX_ATTEMPTS, DEFAULT_RUN_COUNT, ImageConfig, MaskSource,
    NoopObserver, SamplingConfig, WindowObserver,
};
use std::path::PathBuf;

/// Scale used for images without `--scale` or `--scale-for`.
const FALLBACK_SCALE: f64 = 1.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder of segmented images (searched recursively)
    input: PathBuf,

    /// Folder for the per-image CSV tables
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Windows sampled per image
    #[arg(short, long, default_value_t = DEFAULT_RUN_COUNT)]
    runs: usize,

    /// Default scale in pixels per micron (1.0 with a warning when omitted)
    #[arg(short, long)]
    scale: Option<f64>,

    /// Scale for one image, as NAME=SCALE (NAME without extension)
    #[arg(long = "scale-for", value_name = "NAME=SCALE", value_parser = parse_scale_for)]
    scale_for: Vec<(String, f64)>,

    /// Invert every image before binarizing
    #[arg(long)]
    invert: bool,

    /// Invert one image, by NAME without extension
    #[arg(long = "invert-for", value_name = "NAME")]
    invert_for: Vec<String>,

    /// Write an overlay TIFF per window under this folder
    #[arg(long, value_name = "DIR")]
    overlays: Option<PathBuf>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Generated windows per image before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u64,

    /// Keep window base points this far from the image edges
    #[arg(long, default_value_t = 0.0)]
    safety_margin: f64,

    /// Count only outer borders, not holes
    #[arg(long)]
    external_only: bool,

    /// Process images in parallel
    #[arg(long)]
    parallel: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn parse_scale_for(s: &str) -> Result<(String, f64), String> {
    let (name, scale) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=SCALE, got '{}'", s))?;
    let scale: f64 = scale
        .parse()
        .map_err(|e| format!("invalid scale '{}': {}", scale, e))?;
    Ok((name.to_string(), scale))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut configs = ImageConfigs::new(ImageConfig {
        invert: args.invert,
        scale: args.scale.unwrap_or(FALLBACK_SCALE),
    });
    for (name, scale) in &args.scale_for {
        configs.set_scale(name.clone(), *scale);
    }
    for name in &args.invert_for {
        configs.set_invert(name.clone());
    }

    let paths = collect_images(&args.input)
        .with_context(|| format!("Failed to read input folder {}", args.input.display()))?;
    if paths.is_empty() {
        bail!("no TIFF or PNG images found under {}", args.input.display());
    }
    tracing::info!("Found {} images under {}", paths.len(), args.input.display());
    let sources = image_files(&paths, &configs);
    if args.scale.is_none() {
        for source in sources.iter().filter(|s| !configs.has_scale(s.id())) {
            tracing::warn!(
                "{}: no scale given, using {} pixels per micron",
                source.id(),
                FALLBACK_SCALE
            );
        }
    }

    let runner = BatchRunner::new(SamplingConfig {
        run_count: args.runs,
        max_attempts: args.max_attempts,
        safety_margin: args.safety_margin,
        retrieval: if args.external_only {
            ContourRetrieval::External
        } else {
            ContourRetrieval::Tree
        },
        seed: args.seed,
    });

    let frames = args.overlays.as_ref().map(FrameWriter::new);
    let observer: &dyn WindowObserver = match &frames {
        Some(writer) => writer,
        None => &NoopObserver,
    };

    let report = if args.parallel {
        runner.run_batch_parallel(&sources, observer)
    } else {
        runner.run_batch(&sources, observer)
    };
    tracing::info!("Batch seed: {}", report.seed);

    for (id, table) in report.results.iter() {
        if let Some(s) = table.summary() {
            tracing::info!(
                "{}: {} windows, number {:.2} ± {:.2}, area fraction {:.4} ± {:.4}",
                id,
                s.rows,
                s.number.mean,
                s.number.std_dev,
                s.area_fraction.mean,
                s.area_fraction.std_dev
            );
        }
    }

    let written = write_csv_tables(&report.results, &args.output)
        .with_context(|| format!("Failed to write tables to {}", args.output.display()))?;
    tracing::info!("Wrote {} tables to {}", written.len(), args.output.display());

    if !report.failures.is_empty() {
        for failure in &report.failures {
            tracing::error!("{}: {}", failure.id, failure.error);
        }
        bail!("{} of {} images failed", report.failures.len(), sources.len());
    }
    Ok(())
}
