//! Interpolation Pipeline
//!
//! ```text
//! data dir ──► coordinates table ──► CoordinateMap ───────────┐
//!     │                                                      ▼
//!     └──► borehole files ──► Corpus ──► prepared tables ──► aggregates
//!                                                            │
//!                                      interpolate / evaluate ◄┘
//! ```
//!
//! Only a missing or malformed coordinates table aborts a request. Every
//! other failure (too few points, unknown method, missing backend, bad grid
//! size) comes back inside the result as an [`ErrorPayload`] so batch callers
//! keep their partial results.

use crate::acquisition::{load_coordinates, ConfigurationError, ReadError};
use crate::aggregate::{aggregate_field, aggregate_index, AggregateItem, BoreholeAggregates, IndexWeights};
use crate::borehole::{derive_depth, load_borehole, load_corpus, Corpus, LithologyAverages, SkippedFile};
use crate::config::StrataConfig;
use crate::evaluation::{evaluate_methods, MethodScores};
use crate::interpolation::{interpolate_points, InterpolationError, InterpolationGrid, Method};
use crate::summary::{summarize_grid, Summary, SummaryError};
use crate::types::{CoordinateMap, GridBounds, LayerRecord, SamplePoint};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Fewest located boreholes a grid or an evaluation is built from.
pub const MIN_POINTS: usize = 3;

// ============================================================================
// Errors & Outcomes
// ============================================================================

/// Hard failures: the request cannot proceed at all.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("cannot list data directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A reported (non-fatal) failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_coords: Vec<String>,
}

impl ErrorPayload {
    pub fn new(kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            error: error.into(),
            missing_coords: Vec::new(),
        }
    }

    pub fn with_missing(mut self, missing: &[String]) -> Self {
        self.missing_coords = missing.to_vec();
        self
    }
}

impl From<&InterpolationError> for ErrorPayload {
    fn from(e: &InterpolationError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<&SummaryError> for ErrorPayload {
    fn from(e: &SummaryError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

/// Either a result or the payload explaining why there is none.
///
/// Serializes as the bare inner value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Ready(T),
    Failed(ErrorPayload),
}

impl<T> Outcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failed(&self) -> Option<&ErrorPayload> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Failed(e) => Some(e),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// Borehole files in `data_dir`: matching extension, coordinates table
/// excluded, sorted by path.
pub fn dataset_files(data_dir: &Path, config: &StrataConfig) -> Result<Vec<PathBuf>, PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: data_dir.to_path_buf(),
        source,
    };
    let ext = config.data.extension.trim_start_matches('.');

    let mut files = Vec::new();
    for entry in std::fs::read_dir(data_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let matches_ext = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext));
        let is_coords = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy() == config.data.coordinates_file);
        if path.is_file() && matches_ext && !is_coords {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Coordinates plus every borehole table in one data directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub coords: CoordinateMap,
    pub corpus: Corpus,
}

impl Dataset {
    /// Load the coordinates table first, then each borehole file once.
    pub fn open(data_dir: &Path, config: &StrataConfig) -> Result<Self, PipelineError> {
        let coords = load_coordinates(&data_dir.join(&config.data.coordinates_file))?;
        let files = dataset_files(data_dir, config)?;
        let corpus = load_corpus(&files);
        info!(
            boreholes = corpus.tables.len(),
            skipped = corpus.skipped.len(),
            located = coords.len(),
            "Dataset loaded"
        );
        Ok(Self { coords, corpus })
    }
}

// ============================================================================
// Lithology & Preview
// ============================================================================

/// Per-lithology means over the whole corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LithologyReport {
    pub averages: LithologyAverages,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

pub fn lithology_averages(corpus: &Corpus) -> LithologyReport {
    let averages = corpus.lithology_averages();
    info!(lithologies = averages.len(), tables = corpus.tables.len(), "Lithology averages computed");
    LithologyReport {
        averages,
        skipped: corpus.skipped.clone(),
    }
}

/// Leading rows of one borehole, normalized and with depth derived.
/// Nothing is imputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoreholePreview {
    pub borehole: String,
    pub file: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<LayerRecord>,
    pub row_count: usize,
}

pub fn preview_borehole(path: &Path, limit: usize) -> Result<BoreholePreview, ReadError> {
    let table = derive_depth(load_borehole(path)?);
    let row_count = table.len();
    debug!(borehole = %table.name, row_count, limit, "Borehole preview");
    Ok(BoreholePreview {
        borehole: table.name,
        file: path.to_path_buf(),
        columns: table.columns,
        rows: table.layers.into_iter().take(limit).collect(),
        row_count,
    })
}

// ============================================================================
// Field Interpolation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInterpolation {
    pub field: String,
    pub method: Method,
    pub grid_size: usize,
    pub bounds: GridBounds,
    pub values: Vec<Vec<f64>>,
    pub missing_coords: Vec<String>,
    pub point_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

/// Grid from aggregated points, applying the pipeline's policies: grid size
/// within the configured range and at least [`MIN_POINTS`] points.
fn grid_from_points(
    points: &[SamplePoint],
    method: &str,
    grid_size: usize,
    config: &StrataConfig,
) -> Result<InterpolationGrid, InterpolationError> {
    config.check_grid_size(grid_size)?;
    if points.len() < MIN_POINTS {
        return Err(InterpolationError::InsufficientData {
            available: points.len(),
            required: MIN_POINTS,
        });
    }
    let method: Method = method.parse()?;
    interpolate_points(points, method, grid_size, &config.interpolation_params())
}

fn field_outcome(
    field: &str,
    aggregates: &BoreholeAggregates,
    method: &str,
    grid_size: usize,
    config: &StrataConfig,
) -> Outcome<FieldInterpolation> {
    let points = aggregates.points();
    match grid_from_points(&points, method, grid_size, config) {
        Ok(grid) => Outcome::Ready(FieldInterpolation {
            field: field.to_string(),
            method: grid.method,
            grid_size: grid.grid_size,
            bounds: grid.bounds,
            values: grid.values,
            missing_coords: aggregates.missing_coords.clone(),
            point_count: points.len(),
            skipped: aggregates.skipped.clone(),
        }),
        Err(e) => {
            debug!(field, method, error = %e, "Field interpolation not produced");
            Outcome::Failed(ErrorPayload::from(&e).with_missing(&aggregates.missing_coords))
        }
    }
}

/// Thickness-weighted `field` per borehole, interpolated onto a grid.
pub fn interpolate_field(
    corpus: &Corpus,
    coords: &CoordinateMap,
    field: &str,
    method: &str,
    grid_size: usize,
    config: &StrataConfig,
) -> Outcome<FieldInterpolation> {
    let field = field.trim();
    let aggregates = aggregate_field(corpus, coords, field);
    field_outcome(field, &aggregates, method, grid_size, config)
}

/// One field interpolated with several methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodComparison {
    pub field: String,
    pub grid_size: usize,
    pub results: BTreeMap<String, Outcome<FieldInterpolation>>,
}

/// Interpolate `field` with every method. Each method fails independently.
pub fn compare_methods<S: AsRef<str>>(
    corpus: &Corpus,
    coords: &CoordinateMap,
    field: &str,
    methods: &[S],
    grid_size: usize,
    config: &StrataConfig,
) -> MethodComparison {
    let field = field.trim();
    let aggregates = aggregate_field(corpus, coords, field);
    let results = methods
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
        .map(|m| (m.to_string(), field_outcome(field, &aggregates, m, grid_size, config)))
        .collect();

    MethodComparison {
        field: field.to_string(),
        grid_size,
        results,
    }
}

// ============================================================================
// Method Recommendation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub field: String,
    pub scores: MethodScores,
    pub recommended: Option<String>,
}

/// Leave-one-out scores for `methods`, and the lowest-RMSE method.
///
/// Ties keep the method listed first.
pub fn recommend_method<S: AsRef<str>>(
    corpus: &Corpus,
    coords: &CoordinateMap,
    field: &str,
    methods: &[S],
    config: &StrataConfig,
) -> Outcome<Recommendation> {
    let field = field.trim();
    let aggregates = aggregate_field(corpus, coords, field);
    let points = aggregates.points();
    if points.len() < MIN_POINTS {
        return Outcome::Failed(
            ErrorPayload::new(
                "insufficient_data",
                format!(
                    "not enough points for evaluation ({} available, {MIN_POINTS} required)",
                    points.len()
                ),
            )
            .with_missing(&aggregates.missing_coords),
        );
    }

    let scores = evaluate_methods(
        &points,
        methods,
        config.evaluation.grid_size,
        &config.interpolation_params(),
    );
    let recommended = scores.recommend().map(str::to_string);
    info!(field, recommended = ?recommended, "Evaluation complete");
    Outcome::Ready(Recommendation {
        field: field.to_string(),
        scores,
        recommended,
    })
}

// ============================================================================
// Composite Index
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    /// Weights actually applied, after normalization
    pub weights: IndexWeights,
    #[serde(flatten)]
    pub aggregates: BoreholeAggregates,
}

/// Composite index per located borehole.
///
/// `raw_weights` is normalized; an empty or degenerate map means the
/// configured default weighting.
pub fn borehole_index(
    corpus: &Corpus,
    coords: &CoordinateMap,
    raw_weights: &BTreeMap<String, f64>,
    config: &StrataConfig,
) -> IndexReport {
    let weights = config.index_weights(raw_weights);
    let aggregates = aggregate_index(corpus, coords, &weights);
    IndexReport { weights, aggregates }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInterpolation {
    pub method: Method,
    pub grid_size: usize,
    pub bounds: GridBounds,
    pub values: Vec<Vec<f64>>,
    pub point_count: usize,
}

/// Interpolate composite-index items onto a grid.
pub fn interpolate_index(
    items: &[AggregateItem],
    method: &str,
    grid_size: usize,
    config: &StrataConfig,
) -> Outcome<IndexInterpolation> {
    let points: Vec<SamplePoint> = items.iter().map(AggregateItem::sample).collect();
    match grid_from_points(&points, method, grid_size, config) {
        Ok(grid) => Outcome::Ready(IndexInterpolation {
            method: grid.method,
            grid_size: grid.grid_size,
            bounds: grid.bounds,
            values: grid.values,
            point_count: points.len(),
        }),
        Err(e) => Outcome::Failed(ErrorPayload::from(&e)),
    }
}

/// Summarize a grid, reporting an empty grid as a payload.
pub fn summarize(values: &[Vec<f64>]) -> Outcome<Summary> {
    match summarize_grid(values) {
        Ok(s) => Outcome::Ready(s),
        Err(e) => Outcome::Failed(ErrorPayload::from(&e)),
    }
}

// ============================================================================
// Full Run
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub field: String,
    pub interpolation: Outcome<FieldInterpolation>,
    pub summary: Outcome<Summary>,
    pub index: IndexReport,
    pub index_grid: Outcome<IndexInterpolation>,
}

/// Load a data directory and produce the field grid, its summary, and the
/// composite index (default weights) with its grid.
///
/// Fails only when the coordinates table is missing or lacks a required
/// column, or the directory cannot be listed.
pub fn run_pipeline(
    data_dir: &Path,
    field: &str,
    method: &str,
    grid_size: usize,
    config: &StrataConfig,
) -> Result<PipelineReport, PipelineError> {
    let Dataset { coords, corpus } = Dataset::open(data_dir, config)?;

    let interpolation = interpolate_field(&corpus, &coords, field, method, grid_size, config);
    let summary = match &interpolation {
        Outcome::Ready(grid) => summarize(&grid.values),
        Outcome::Failed(e) => Outcome::Failed(e.clone()),
    };
    let index = borehole_index(&corpus, &coords, &BTreeMap::new(), config);
    let index_grid = interpolate_index(&index.aggregates.items, method, grid_size, config);

    Ok(PipelineReport {
        field: field.trim().to_string(),
        interpolation,
        summary,
        index,
        index_grid,
    })
}
