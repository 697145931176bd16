//! rrim CLI - Red Relief Image Maps from DEMs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rrim::{rrim, RrimParams};
use rrim_core::io::read_geotiff;
use rrim_core::Raster;

#[derive(Parser)]
#[command(name = "rrim")]
#[command(author, version, about = "Red Relief Image Map generation", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Red Relief Image Map from a DEM
    Run {
        /// Input DEM file (GeoTIFF)
        input: PathBuf,

        /// No-data value of the input DEM
        #[arg(long, default_value = "-9999", allow_hyphen_values = true)]
        nodata: f64,

        /// Fill depressions before computing terrain metrics
        #[arg(long)]
        fill: bool,

        /// Number of azimuth directions for openness
        #[arg(short, long, default_value = "8")]
        directions: usize,

        /// Openness search radius in cells
        #[arg(short, long, default_value = "10")]
        radius: usize,

        /// Openness noise suppression level (0-3)
        #[arg(short, long, default_value = "0")]
        noise: u8,

        /// Red saturation scaling for the slope channel
        #[arg(short, long, default_value = "90")]
        saturation: f64,

        /// Brightness scaling for the openness channel
        #[arg(short, long, default_value = "150")]
        brightness: f64,

        /// Skip writing slope and openness rasters next to the DEM
        #[arg(long)]
        no_save: bool,

        /// Reuse slope and differential openness rasters from a previous run
        #[arg(short, long)]
        keep: bool,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.red} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            nodata,
            fill,
            directions,
            radius,
            noise,
            saturation,
            brightness,
            no_save,
            keep,
        } => {
            let params = RrimParams {
                nodata,
                fill_depressions: fill,
                directions,
                radius,
                noise,
                saturation,
                brightness,
                save_intermediates: !no_save,
                reuse_cached: keep,
            };

            let pb = spinner("Generating RRIM...");
            let start = Instant::now();
            let output = rrim(&input, &params).context("Failed to generate RRIM")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            println!("RRIM saved to: {}", output.display());
            println!("  Processing time: {:.2?}", elapsed);
        }

        Commands::Info { input } => {
            let pb = spinner("Reading raster...");
            let raster: Raster<f64> =
                read_geotiff(&input, None).context("Failed to read raster")?;
            pb.finish_and_clear();

            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            if let Some((min, max)) = raster.value_range() {
                println!("Range: {:.4} - {:.4}", min, max);
            }
            println!(
                "Valid cells: {} ({:.1}%)",
                raster.valid_count(),
                100.0 * raster.valid_count() as f64 / raster.len() as f64
            );
        }
    }

    Ok(())
}
