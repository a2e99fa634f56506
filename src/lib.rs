//! strata-grid: borehole lithology to continuous 2D property grids
//!
//! Turns sparse, heterogeneous borehole layer tables into gridded property
//! fields and composite mechanical indices.
//!
//! ## Architecture
//!
//! - **Acquisition**: tolerant CSV decoding, header normalization, coordinates
//! - **Borehole**: depth derivation, lithology averages, missing-value imputation
//! - **Aggregate**: thickness-weighted means and composite indices per borehole
//! - **Interpolation**: IDW, linear and nearest grids over scattered points
//! - **Summary / Evaluation**: grid statistics and leave-one-out method scoring
//! - **Pipeline**: data-directory entry points returning serializable results

pub mod acquisition;
pub mod aggregate;
pub mod borehole;
pub mod config;
pub mod evaluation;
pub mod export;
pub mod interpolation;
pub mod pipeline;
pub mod summary;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, StrataConfig};

// Re-export commonly used types
pub use types::{
    BoreholeTable, Coordinate, CoordinateMap, DepthInterval, Field, GridBounds, LayerRecord,
    SamplePoint,
};

pub use acquisition::{load_coordinates, read_table, ConfigurationError, RawFrame, ReadError};
pub use aggregate::{composite_index, thickness_weighted_mean, AggregateItem, IndexWeights, Measure};
pub use borehole::{derive_depth, impute_missing, load_corpus, Corpus, LithologyAverages};
pub use evaluation::{evaluate_methods, MethodScore, MethodScores};
pub use export::grid_to_csv;
pub use interpolation::{interpolate_points, InterpolationError, InterpolationGrid, InterpolationParams, Method};
pub use pipeline::{run_pipeline, ErrorPayload, Outcome, PipelineError, PipelineReport};
pub use summary::{summarize_grid, summarize_values, Summary, SummaryError};
