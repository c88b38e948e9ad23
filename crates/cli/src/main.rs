//! Poromet CLI - pore-size analysis of micrographs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use poromet_algorithms::calibration::CalibrationTable;
use poromet_algorithms::morphology::BorderMode;
use poromet_algorithms::porosimetry::{
    compute_thickness_with, OpeningStrategy, PorosimetryParams, RadiusSet,
};
use poromet_algorithms::segmentation::segment;
use poromet_algorithms::CancelToken;
use poromet_core::io::{read_image, write_mask, write_raster};
use poromet_core::GrayImage;
use poromet_pipeline::{AnalysisConfig, AnalysisReport, AnalysisRequest, Analyzer, CacheConfig};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "poromet")]
#[command(author, version, about = "Pore-size analysis of segmented micrographs", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Calibration table (JSON list of width/height/magnification/pixels_per_nm)
    #[arg(long, global = true)]
    calibration: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show size and intensity statistics of an image
    Info {
        /// Input image (TIFF, PNG or JPEG)
        input: PathBuf,
    },
    /// Full analysis: segmentation, local thickness and pore-size distribution
    Analyze {
        /// Input micrograph (TIFF, PNG or JPEG)
        input: PathBuf,
        /// Microscope magnification
        #[arg(short, long)]
        magnification: u32,
        /// Largest pore diameter to test, in nm
        #[arg(short = 'd', long)]
        max_diameter: f64,
        /// Factor applied to the Otsu threshold
        #[arg(short, long, default_value = "1.0")]
        threshold_multiplier: f64,
        /// Number of histogram bins
        #[arg(short, long, default_value = "100")]
        bins: usize,
        /// Directory receiving the report files
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Threshold an image into a pore mask
    Segment {
        /// Input micrograph (TIFF, PNG or JPEG)
        input: PathBuf,
        /// Output mask (pore = 255)
        output: PathBuf,
        /// Factor applied to the Otsu threshold
        #[arg(short, long, default_value = "1.0")]
        threshold_multiplier: f64,
    },
    /// Local-thickness map in pixel radii
    Thickness {
        /// Input micrograph (TIFF, PNG or JPEG)
        input: PathBuf,
        /// Output thickness raster
        output: PathBuf,
        /// Largest radius to test, in pixels
        #[arg(short = 'r', long)]
        max_radius: u32,
        /// Factor applied to the Otsu threshold
        #[arg(short, long, default_value = "1.0")]
        threshold_multiplier: f64,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// List the supported resolution and magnification combinations
    Calibrations {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct EngineArgs {
    /// How pixels outside the image are treated
    #[arg(long, value_enum, default_value = "open")]
    border: Border,
    /// How openings are computed
    #[arg(long, value_enum, default_value = "distance")]
    strategy: Strategy,
    /// Abort after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Border {
    Open,
    Solid,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Distance,
    Element,
}

impl EngineArgs {
    fn params(&self) -> PorosimetryParams {
        PorosimetryParams {
            strategy: match self.strategy {
                Strategy::Distance => OpeningStrategy::DistanceTransform,
                Strategy::Element => OpeningStrategy::StructuringElement,
            },
            border: match self.border {
                Border::Open => BorderMode::Open,
                Border::Solid => BorderMode::Solid,
            },
            ..Default::default()
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_input(path: &Path) -> Result<GrayImage> {
    let pb = spinner("Reading image...");
    let image = read_image(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", image.width(), image.height());
    Ok(image)
}

fn load_table(path: Option<&Path>) -> Result<CalibrationTable> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read calibration table {}", path.display()))?;
            CalibrationTable::from_json(&text).context("Invalid calibration table")
        }
        None => Ok(CalibrationTable::default()),
    }
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn print_report(report: &AnalysisReport) {
    let (w, h) = report.resolution;
    println!("Analysis {}", report.id);
    println!("  Image: {} x {} px at {}x", w, h, report.magnification);
    println!("  Pixel size: {:.4} nm", report.pixel_size_nm);
    println!(
        "  Threshold: {:.4}  Porosity: {:.2}%",
        report.threshold,
        100.0 * report.porosity
    );
    println!("  Radii tested: 1..={} px", report.max_radius_px);
    println!("  Mean diameter: {:.3} nm", report.summary.mean_diameter);
    println!("  Mode diameter: {:.3} nm", report.summary.mode_diameter);
    println!(
        "  D10 / D50 / D90: {:.3} / {:.3} / {:.3} nm",
        report.summary.d10, report.summary.d50, report.summary.d90
    );
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let calibration = cli.calibration.as_deref();

    match cli.command {
        Commands::Info { input } => {
            let image = read_input(&input)?;
            let stats = image.statistics();
            println!("File: {}", input.display());
            println!(
                "Dimensions: {} x {} ({} pixels)",
                image.width(),
                image.height(),
                image.len()
            );
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            if stats.invalid_count > 0 {
                println!("  Non-finite pixels: {}", stats.invalid_count);
            }
            let table = load_table(calibration)?;
            let supported = table.supported();
            let mags = supported.get(&(image.width(), image.height()));
            match mags {
                Some(mags) => println!("\nCalibrated magnifications: {:?}", mags),
                None => println!("\nNo calibration for this resolution"),
            }
        }

        Commands::Analyze {
            input,
            magnification,
            max_diameter,
            threshold_multiplier,
            bins,
            output,
            json,
            engine,
        } => {
            let table = load_table(calibration)?;
            let config = AnalysisConfig {
                porosimetry: engine.params(),
                timeout: engine.timeout(),
            };
            let mut analyzer = Analyzer::new(table, config, CacheConfig::default());
            if let Some(root) = &output {
                analyzer = analyzer.with_output_root(root);
            }

            let image = read_input(&input)?;
            let request = AnalysisRequest::new(image, magnification, max_diameter)
                .with_threshold_multiplier(threshold_multiplier)
                .with_bin_count(bins);

            let pb = spinner("Analyzing pores...");
            let start = Instant::now();
            let result = analyzer.analyze(&request);
            pb.finish_and_clear();
            let report = result.context("Analysis failed")?;
            let elapsed = start.elapsed();

            if json {
                let text = serde_json::to_string_pretty(&*report)
                    .context("Failed to serialize report")?;
                println!("{}", text);
            } else {
                print_report(&report);
                println!("  Processing time: {:.2?}", elapsed);
            }

            if output.is_some() {
                match analyzer.output_dir(&report.id)? {
                    Some(dir) => info!("Reports written to {}", dir.display()),
                    None => warn!("Report files could not be written"),
                }
            }
        }

        Commands::Segment {
            input,
            output,
            threshold_multiplier,
        } => {
            let image = read_input(&input)?;
            let start = Instant::now();
            let seg = segment(&image, threshold_multiplier).context("Failed to segment image")?;
            let elapsed = start.elapsed();
            println!(
                "Threshold: {:.4}  Porosity: {:.2}%",
                seg.threshold,
                100.0 * seg.porosity
            );
            let pb = spinner("Writing output...");
            write_mask(&seg.mask, &output).context("Failed to write output")?;
            pb.finish_and_clear();
            done("Pore mask", &output, elapsed);
        }

        Commands::Thickness {
            input,
            output,
            max_radius,
            threshold_multiplier,
            engine,
        } => {
            let image = read_input(&input)?;
            let radii = RadiusSet::up_to(max_radius).context("Invalid maximum radius")?;
            let cancel = match engine.timeout() {
                Some(timeout) => CancelToken::with_timeout(timeout),
                None => CancelToken::new(),
            };

            let start = Instant::now();
            let seg = segment(&image, threshold_multiplier).context("Failed to segment image")?;
            let pb = spinner("Computing local thickness...");
            let result = compute_thickness_with(&seg.mask, &radii, &engine.params(), &cancel);
            pb.finish_and_clear();
            let thickness = result.context("Failed to compute local thickness")?;
            let elapsed = start.elapsed();

            let pb = spinner("Writing output...");
            write_raster(&thickness, &output).context("Failed to write output")?;
            pb.finish_and_clear();
            done("Local thickness", &output, elapsed);
        }

        Commands::Calibrations { json } => {
            let table = load_table(calibration)?;
            if table.is_empty() {
                bail!("Calibration table is empty");
            }
            if json {
                let text =
                    serde_json::to_string_pretty(&table).context("Failed to serialize table")?;
                println!("{}", text);
            } else {
                println!("{:>12}  {:>6}  {:>12}  {:>12}", "resolution", "mag", "px / nm", "nm / px");
                for entry in table.entries() {
                    println!(
                        "{:>12}  {:>5}x  {:>12.6}  {:>12.4}",
                        format!("{}x{}", entry.width, entry.height),
                        entry.magnification,
                        entry.pixels_per_nm,
                        1.0 / entry.pixels_per_nm
                    );
                }
            }
        }
    }

    Ok(())
}
