//! voronoi-density - Dichte- und Attributkarten als SVG
//!
//! Lädt Punkte und Grenzpolygon (JSON), berechnet Voronoi-Zellen oder eine
//! Rasterfläche und schreibt die Karte als SVG.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voronoi_density::{
    io::{load_boundary, load_points},
    math::{
        algorithms::PointSampler,
        surface::{Bandwidth, IdwInterpolator, KernelDensity},
        tessellation::voronoi::{DuplicatePolicy, EngineConfig, VoronoiDensityEngine},
        types::{PointSet, Region},
    },
    visualization::{ColorTransform, RenderOptions, render_density_map, render_surface, save},
};

#[derive(Parser, Debug)]
#[command(name = "voronoi-density")]
#[command(about = "Voronoi density and attribute maps for planar point datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Voronoi-Zellen, geclippt auf die Grenze, mit Dichte oder Attributwert
    Voronoi(VoronoiCommand),
    /// Rasterfläche per IDW oder Kerndichteschätzung
    Surface(SurfaceCommand),
}

/// Gemeinsame Eingaben beider Befehle
#[derive(Args, Debug)]
struct InputArgs {
    /// Point dataset (JSON)
    #[arg(long)]
    points: PathBuf,

    /// Boundary polygon (JSON)
    #[arg(long)]
    boundary: PathBuf,

    /// Subsample the points to at most N before processing
    #[arg(long)]
    sample: Option<usize>,

    /// Seed for --sample
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Use a square-root colour scale
    #[arg(long)]
    sqrt: bool,

    /// Map title
    #[arg(long)]
    title: Option<String>,

    /// Output SVG file
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct VoronoiCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Transfer this attribute instead of computing area density
    #[arg(long)]
    attribute: Option<String>,

    /// Clamp displayed densities (per km²) to this value
    #[arg(long)]
    cap: Option<f64>,

    /// Envelope padding as a fraction of the boundary's longer side
    #[arg(long, default_value = "0.15")]
    padding: f64,

    /// Drop later coincident points instead of failing
    #[arg(long)]
    keep_first: bool,
}

#[derive(Args, Debug)]
struct SurfaceCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Interpolate this attribute with inverse distance weighting
    #[arg(long, conflicts_with = "kde", required_unless_present = "kde")]
    idw: Option<String>,

    /// IDW distance exponent
    #[arg(long, default_value = "2.0")]
    power: f64,

    /// Only use IDW samples within this radius (m)
    #[arg(long)]
    radius: Option<f64>,

    /// Gaussian kernel density estimate of the point intensity
    #[arg(long)]
    kde: bool,

    /// Fixed KDE bandwidth (m); Scott's rule when omitted
    #[arg(long)]
    bandwidth: Option<f64>,

    /// Grid cell size (m)
    #[arg(long, default_value = "1000.0")]
    cell_size: f64,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Voronoi(cmd) => run_voronoi(cmd),
        Commands::Surface(cmd) => run_surface(cmd),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_inputs(input: &InputArgs) -> Result<(PointSet, Region)> {
    let mut points = load_points(&input.points)
        .with_context(|| format!("loading points from {}", input.points.display()))?;
    let boundary = load_boundary(&input.boundary)
        .with_context(|| format!("loading boundary from {}", input.boundary.display()))?;

    if let Some(count) = input.sample {
        if count < points.len() {
            points = PointSampler::from_seed(input.seed).sample(&points, count);
            info!("Subsampled to {} points (seed {})", points.len(), input.seed);
        } else {
            warn!(
                "--sample {} is not below the point count {}; using all points",
                count,
                points.len()
            );
        }
    }
    Ok((points, boundary))
}

fn options(input: &InputArgs) -> RenderOptions {
    let mut options = RenderOptions::default();
    if input.sqrt {
        options = options.with_transform(ColorTransform::Sqrt);
    }
    if let Some(title) = &input.title {
        options = options.with_title(title.clone());
    }
    options
}

fn run_voronoi(cmd: VoronoiCommand) -> Result<()> {
    let (points, boundary) = load_inputs(&cmd.input)?;

    let mut config = match &cmd.attribute {
        Some(attribute) => EngineConfig::attribute_transfer(attribute.clone()),
        None => EngineConfig::density(),
    };
    if let Some(cap) = cmd.cap {
        config = config.with_cap(cap);
    }
    if cmd.keep_first {
        config = config.with_duplicate_policy(DuplicatePolicy::KeepFirst);
    }

    let engine = VoronoiDensityEngine::new(config)?;
    let envelope = boundary.bounding_envelope(cmd.padding)?;
    let map = engine.compute(&points, &envelope, &boundary)?;
    if map.is_empty() {
        bail!("no Voronoi cell intersects the boundary");
    }
    if let Some((lo, hi)) = map.value_range() {
        info!(
            "{} cells, {} dropped, values {:.4}..{:.4} {}",
            map.len(),
            map.dropped_sites.len(),
            lo,
            hi,
            map.unit_label()
        );
    }

    let document = render_density_map(&map, &boundary, &options(&cmd.input))?;
    save(&document, &cmd.input.out)?;
    Ok(())
}

fn run_surface(cmd: SurfaceCommand) -> Result<()> {
    let (points, boundary) = load_inputs(&cmd.input)?;

    let (grid, unit) = match (&cmd.idw, cmd.kde) {
        (Some(attribute), false) => {
            let mut idw = IdwInterpolator::new().with_power(cmd.power);
            if let Some(radius) = cmd.radius {
                idw = idw.with_search_radius(radius);
            }
            let grid = idw.surface(&points, attribute, &boundary, cmd.cell_size)?;
            (grid, attribute.clone())
        }
        (None, true) => {
            let bandwidth = cmd.bandwidth.map_or(Bandwidth::Scott, Bandwidth::Fixed);
            let grid = KernelDensity::new()
                .with_bandwidth(bandwidth)
                .surface(&points, &boundary, cmd.cell_size)?;
            (grid, "per km²".to_string())
        }
        _ => bail!("choose exactly one of --idw <ATTRIBUTE> or --kde"),
    };

    let document = render_surface(&grid, &boundary, &unit, &options(&cmd.input))?;
    save(&document, &cmd.input.out)?;
    Ok(())
}
