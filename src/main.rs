//! strata-grid - borehole lithology to 2D property grids
//!
//! Command-line front end over the library pipeline. Every subcommand prints
//! a JSON document on stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Density grid with the configured default method and size
//! strata-grid --data-dir ./data field density
//!
//! # Leave-one-out comparison of methods
//! strata-grid recommend elastic_modulus --methods idw,linear,nearest
//!
//! # Composite index with custom weights
//! strata-grid index --weight elastic_modulus=0.5 --weight density=0.5
//!
//! # Grid as x,y,value text
//! strata-grid export --field density --output density.csv
//!
//! # Lithology averages, and the first rows of one borehole
//! strata-grid lithology
//! strata-grid preview ZK1.csv --limit 10
//! ```
//!
//! # Environment Variables
//!
//! - `STRATA_DATA_DIR`: data directory (default: `data`)
//! - `STRATA_CONFIG`: path to a `strata_config.toml`
//! - `RUST_LOG`: logging level (default: info)
//! - `STRATA_LOG_JSON`: emit logs as JSON lines

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use strata_grid::config::StrataConfig;
use strata_grid::export::grid_to_csv;
use strata_grid::pipeline::{self, Dataset, Outcome};
use strata_grid::types::GridBounds;
use tracing::info;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "strata-grid")]
#[command(about = "Interpolate borehole lithology properties onto 2D grids")]
#[command(version)]
struct CliArgs {
    /// Directory holding the coordinates table and one CSV per borehole
    #[arg(long, global = true, env = "STRATA_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// TOML config file (otherwise $STRATA_CONFIG, ./strata_config.toml, defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "STRATA_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct GridArgs {
    /// Interpolation method: idw, linear or nearest
    #[arg(long)]
    method: Option<String>,

    /// Nodes per axis
    #[arg(long)]
    grid_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interpolate the thickness-weighted mean of one property
    Field {
        field: String,
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Interpolate one property with several methods
    Compare {
        field: String,
        /// Comma-separated methods (default: configured evaluation methods)
        #[arg(long, value_delimiter = ',')]
        methods: Vec<String>,
        #[arg(long)]
        grid_size: Option<usize>,
    },

    /// Score methods by leave-one-out RMSE and pick the best
    Recommend {
        field: String,
        /// Comma-separated methods (default: configured evaluation methods)
        #[arg(long, value_delimiter = ',')]
        methods: Vec<String>,
    },

    /// Composite index per borehole
    Index {
        /// Property weight as LABEL=WEIGHT, repeatable
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
    },

    /// Interpolate the composite index
    IndexGrid {
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Statistics over a property grid, or the composite-index grid
    Summary {
        /// Property to summarize; omit for the composite index
        #[arg(long)]
        field: Option<String>,
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Write a grid as x,y,value rows
    Export {
        /// Property to export; omit for the composite index
        #[arg(long)]
        field: Option<String>,
        #[command(flatten)]
        grid: GridArgs,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Per-lithology property means over every borehole
    Lithology,

    /// First rows of one borehole file, normalized, with depths
    Preview {
        /// File name inside the data directory, or a path
        file: PathBuf,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Field grid, its summary, and the composite index in one report
    Run {
        field: String,
        #[command(flatten)]
        grid: GridArgs,
    },
}

fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (label, weight) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=WEIGHT, got '{raw}'"))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight '{weight}': {e}"))?;
    Ok((label.trim().to_string(), weight))
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<StrataConfig> {
    match path {
        Some(p) => StrataConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(StrataConfig::load()),
    }
}

fn open_dataset(data_dir: &Path, config: &StrataConfig) -> Result<Dataset> {
    Dataset::open(data_dir, config)
        .with_context(|| format!("Failed to load data directory {}", data_dir.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{text}");
    Ok(())
}

fn resolve(grid: &GridArgs, config: &StrataConfig) -> (String, usize) {
    (
        grid.method
            .clone()
            .unwrap_or_else(|| config.interpolation.default_method.clone()),
        grid.grid_size
            .unwrap_or(config.interpolation.default_grid_size),
    )
}

fn methods_or_default(methods: Vec<String>, config: &StrataConfig) -> Vec<String> {
    if methods.is_empty() {
        config.evaluation.methods.clone()
    } else {
        methods
    }
}

/// Grid for a property, or for the composite index when `field` is `None`.
fn grid_values(
    dataset: &Dataset,
    field: Option<&str>,
    grid: &GridArgs,
    config: &StrataConfig,
) -> Outcome<(Vec<Vec<f64>>, GridBounds)> {
    let (method, grid_size) = resolve(grid, config);
    match field {
        Some(field) => match pipeline::interpolate_field(
            &dataset.corpus,
            &dataset.coords,
            field,
            &method,
            grid_size,
            config,
        ) {
            Outcome::Ready(g) => Outcome::Ready((g.values, g.bounds)),
            Outcome::Failed(e) => Outcome::Failed(e),
        },
        None => {
            let index = pipeline::borehole_index(&dataset.corpus, &dataset.coords, &BTreeMap::new(), config);
            match pipeline::interpolate_index(&index.aggregates.items, &method, grid_size, config) {
                Outcome::Ready(g) => Outcome::Ready((g.values, g.bounds)),
                Outcome::Failed(e) => Outcome::Failed(e),
            }
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(args.config.as_deref())?;
    let data_dir = args.data_dir.as_path();
    info!(data_dir = %data_dir.display(), "strata-grid starting");

    match args.command {
        Command::Field { field, grid } => {
            let dataset = open_dataset(data_dir, &config)?;
            let (method, grid_size) = resolve(&grid, &config);
            print_json(&pipeline::interpolate_field(
                &dataset.corpus,
                &dataset.coords,
                &field,
                &method,
                grid_size,
                &config,
            ))
        }
        Command::Compare {
            field,
            methods,
            grid_size,
        } => {
            let dataset = open_dataset(data_dir, &config)?;
            let methods = methods_or_default(methods, &config);
            let grid_size = grid_size.unwrap_or(config.interpolation.default_grid_size);
            print_json(&pipeline::compare_methods(
                &dataset.corpus,
                &dataset.coords,
                &field,
                &methods,
                grid_size,
                &config,
            ))
        }
        Command::Recommend { field, methods } => {
            let dataset = open_dataset(data_dir, &config)?;
            let methods = methods_or_default(methods, &config);
            print_json(&pipeline::recommend_method(
                &dataset.corpus,
                &dataset.coords,
                &field,
                &methods,
                &config,
            ))
        }
        Command::Index { weights } => {
            let dataset = open_dataset(data_dir, &config)?;
            let weights: BTreeMap<String, f64> = weights.into_iter().collect();
            print_json(&pipeline::borehole_index(&dataset.corpus, &dataset.coords, &weights, &config))
        }
        Command::IndexGrid { weights, grid } => {
            let dataset = open_dataset(data_dir, &config)?;
            let weights: BTreeMap<String, f64> = weights.into_iter().collect();
            let (method, grid_size) = resolve(&grid, &config);
            let index = pipeline::borehole_index(&dataset.corpus, &dataset.coords, &weights, &config);
            print_json(&pipeline::interpolate_index(&index.aggregates.items, &method, grid_size, &config))
        }
        Command::Summary { field, grid } => {
            let dataset = open_dataset(data_dir, &config)?;
            let summary = match grid_values(&dataset, field.as_deref(), &grid, &config) {
                Outcome::Ready((values, _)) => pipeline::summarize(&values),
                Outcome::Failed(e) => Outcome::Failed(e),
            };
            print_json(&summary)
        }
        Command::Export {
            field,
            grid,
            output,
        } => {
            let dataset = open_dataset(data_dir, &config)?;
            let (values, bounds) = match grid_values(&dataset, field.as_deref(), &grid, &config) {
                Outcome::Ready(v) => v,
                Outcome::Failed(e) => bail!("No grid to export ({}): {}", e.kind, e.error),
            };
            let bytes = grid_to_csv(&values, &bounds).context("Failed to format grid")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), rows = values.len(), "Grid exported");
                }
                None => std::io::stdout()
                    .write_all(&bytes)
                    .context("Failed to write grid to stdout")?,
            }
            Ok(())
        }
        Command::Lithology => {
            let dataset = open_dataset(data_dir, &config)?;
            print_json(&pipeline::lithology_averages(&dataset.corpus))
        }
        Command::Preview { file, limit } => {
            let path = data_dir.join(&file);
            let preview = pipeline::preview_borehole(&path, limit)
                .with_context(|| format!("Failed to preview {}", path.display()))?;
            print_json(&preview)
        }
        Command::Run { field, grid } => {
            let (method, grid_size) = resolve(&grid, &config);
            let report = pipeline::run_pipeline(data_dir, &field, &method, grid_size, &config)
                .context("Pipeline run failed")?;
            print_json(&report)
        }
    }
}
