//! Network service areas from the command line.
//!
//! ```bash
//! servicearea --network roads.geojson --points schools.geojson \
//!     --network-distance 800 --buffer-distance 50 --output areas.geojson
//! ```
//!
//! Logging is controlled through `RUST_LOG`.

mod config;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use servicearea_core::loading::geojson::{read_line_features, read_point_features};
use servicearea_core::prelude::*;
use tracing::{info, warn};
use wkt::ToWkt;

use crate::config::{FileConfig, Overrides, resolve};

/// Compute network service areas for a set of points
#[derive(Parser, Debug)]
#[command(name = "servicearea", version)]
struct Cli {
    /// GeoJSON file with the network lines
    #[arg(long)]
    network: PathBuf,

    /// GeoJSON file with the points of interest
    #[arg(long)]
    points: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum travel distance along the network
    #[arg(long)]
    network_distance: Option<f64>,

    /// Buffer width around reached edges
    #[arg(long)]
    buffer_distance: Option<f64>,

    /// Points per parallel batch task
    #[arg(long)]
    points_per_chunk: Option<usize>,

    /// Worker threads, all cores by default
    #[arg(long)]
    threads: Option<usize>,

    /// Output file for the service-area polygons
    #[arg(long)]
    output: PathBuf,

    /// Optional output file for the reached edges
    #[arg(long)]
    edges_output: Option<PathBuf>,

    /// Write polygons as tab separated id and WKT instead of GeoJSON
    #[arg(long)]
    wkt: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = resolve(
        file.service_area,
        Overrides {
            network_distance: cli.network_distance,
            buffer_distance: cli.buffer_distance,
            points_per_chunk: cli.points_per_chunk,
        },
    )?;
    validate_config(&config)?;

    if let Some(threads) = cli.threads.or(file.threads) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring the thread pool")?;
    }

    let lines = read_line_features(&cli.network)
        .with_context(|| format!("reading network {}", cli.network.display()))?;
    let points = read_point_features(&cli.points)
        .with_context(|| format!("reading points {}", cli.points.display()))?;
    info!(
        lines = lines.len(),
        points = points.len(),
        network_distance = config.network_distance,
        buffer_distance = config.buffer_distance,
        "Inputs loaded"
    );

    let network = InMemoryNetwork::new(lines);
    let report = BatchCoordinator::new(&network, &config).run(&points);

    if cli.wkt {
        write_wkt(&cli.output, &report)?;
    } else {
        write_text(&cli.output, &report.areas_to_geojson_string()?)?;
    }
    if let Some(path) = &cli.edges_output {
        write_text(path, &report.edges_to_geojson_string()?)?;
    }

    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            "Some points have no service area"
        );
    }
    info!(areas = report.results.len(), output = %cli.output.display(), "Done");

    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_wkt(path: &Path, report: &BatchReport) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for area in report.areas() {
        writeln!(writer, "{}\t{}", area.id, area.geometry.wkt_string())?;
    }
    writer.flush()?;

    Ok(())
}
