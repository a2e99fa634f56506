//! Grid / Point Summarizer
//!
//! Descriptive statistics over an interpolated grid or a flat list of values.
//! Moments come from `statrs`; percentiles interpolate linearly between
//! closest ranks (the usual `(n - 1)·p` convention).

use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("empty grid")]
    EmptyGrid,
    #[error("empty values")]
    EmptyValues,
}

impl SummaryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyGrid => "empty_grid",
            Self::EmptyValues => "empty_values",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Summarize a flat value list. Non-finite entries are ignored.
pub fn summarize_values(values: &[f64]) -> Result<Summary, SummaryError> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(SummaryError::EmptyValues);
    }

    let min = Statistics::min(finite.iter());
    let max = Statistics::max(finite.iter());
    let mean = Statistics::mean(finite.iter());
    let std = Statistics::population_std_dev(finite.iter());

    finite.sort_by(f64::total_cmp);
    Ok(Summary {
        min,
        max,
        mean,
        std,
        p10: percentile_sorted(&finite, 10.0),
        p50: percentile_sorted(&finite, 50.0),
        p90: percentile_sorted(&finite, 90.0),
    })
}

/// Summarize every node of a grid.
pub fn summarize_grid(grid: &[Vec<f64>]) -> Result<Summary, SummaryError> {
    if grid.first().map_or(true, Vec::is_empty) {
        return Err(SummaryError::EmptyGrid);
    }
    let flat: Vec<f64> = grid.iter().flatten().copied().collect();
    summarize_values(&flat).map_err(|_| SummaryError::EmptyGrid)
}

/// Percentile of ascending `sorted`, `pct` in `[0, 100]`.
fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (n - 1) as f64 * pct / 100.0;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
