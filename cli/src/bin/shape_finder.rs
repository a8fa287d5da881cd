use clap::{Parser, Subcommand};
use cli::{ConfigOverrides, DetectionReport, config_from_file};
use color_eyre::eyre::Result;
use shape_finder::{
    Detector, DetectorConfig, RenderOptions, algorithms::DEFAULT_STRATEGIES, crop_all, load_image,
    render_debug, save_debug_image,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find hand-drawn circles and ellipses in a scanned image
    Detect {
        /// Path to the input image
        input: PathBuf,
        /// Detector configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Smallest contour area as a fraction of the image area
        #[arg(long)]
        min_area_ratio: Option<f64>,
        /// Largest contour area as a fraction of the image area
        #[arg(long)]
        max_area_ratio: Option<f64>,
        /// Smallest contour area in pixels
        #[arg(long)]
        min_absolute_area: Option<u32>,
        /// Log every rejected contour
        #[arg(long)]
        debug: bool,
        /// Save an overlay of the detected regions
        #[arg(long)]
        debug_image: Option<PathBuf>,
        /// Font for the overlay labels (a system font is tried otherwise)
        #[arg(long)]
        font: Option<PathBuf>,
        /// Save each region as a separate PNG in this directory
        #[arg(long)]
        crops_dir: Option<PathBuf>,
        /// Evaluate binarization candidates in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Print the JSON schema of the detector configuration
    Schema,
    /// List the binarization strategies in evaluation order
    Strategies,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            input,
            config,
            output,
            min_area_ratio,
            max_area_ratio,
            min_absolute_area,
            debug,
            debug_image,
            font,
            crops_dir,
            parallel,
        } => {
            let base = match &config {
                Some(path) => config_from_file(path)?,
                None => DetectorConfig::default(),
            };
            let overrides = ConfigOverrides {
                min_area_ratio,
                max_area_ratio,
                min_absolute_area,
                debug,
            };
            let config = overrides.apply(base)?;

            let render_options = match (&debug_image, &font) {
                (None, _) => RenderOptions::default(),
                (Some(_), Some(font)) => RenderOptions::with_font_path(font)?,
                (Some(_), None) => RenderOptions::with_system_font(),
            };

            let detector = Detector::builder()
                .parallel(parallel)
                .render_options(render_options)
                .build();

            detect(
                &detector,
                &config,
                &input,
                output.as_deref(),
                debug_image.as_deref(),
                crops_dir.as_deref(),
            )?;
        }
        Commands::Schema => {
            let schema = DetectorConfig::schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Strategies => {
            for strategy in DEFAULT_STRATEGIES {
                println!("{}", strategy.name());
            }
        }
    }

    Ok(())
}

fn detect(
    detector: &Detector,
    config: &DetectorConfig,
    input: &Path,
    output: Option<&Path>,
    debug_image: Option<&Path>,
    crops_dir: Option<&Path>,
) -> Result<()> {
    info!("🔍 Detecting shapes in {:?}", input);
    let image = load_image(input)?;
    let mut detection = detector.detect(&image, config)?;

    for warning in &detection.warnings {
        warn!("{}", warning);
    }

    let report = DetectionReport::new(input.display().to_string(), &detection);
    let json = report.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Report written to {:?}", path);
        }
        None => println!("{}", json),
    }

    // Overlay failures are reported but never fail the run
    if let Some(path) = debug_image {
        let overlay = detection
            .debug_image
            .take()
            .unwrap_or_else(|| render_debug(&image.to_rgb8(), &detection.regions, detector.render_options()));
        match save_debug_image(&overlay, path) {
            Ok(()) => info!("🎯 Debug image saved to {:?}", path),
            Err(e) => error!("{}", e),
        }
    }

    if let Some(dir) = crops_dir {
        std::fs::create_dir_all(dir)?;
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("region");

        for (index, crop) in crop_all(&image, &detection.regions)?.iter().enumerate() {
            let path = dir.join(format!("{}_shape_{:02}.png", stem, index + 1));
            crop.save(&path)?;
        }
        info!("Saved {} region crops to {:?}", detection.regions.len(), dir);
    }

    info!("✅ Detected {} shapes using {}", detection.regions.len(), detection.strategy);
    Ok(())
}
