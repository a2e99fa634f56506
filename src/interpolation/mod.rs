//! Spatial Interpolator
//!
//! Builds a regular `grid_size × grid_size` grid of estimates from scattered
//! `(x, y, value)` samples. The grid spans the samples' bounding box padded
//! on each side by a fraction of the axis span; axes are evenly spaced and
//! rows run along y.
//!
//! | method    | backend                    | undefined nodes      |
//! |-----------|----------------------------|----------------------|
//! | `idw`     | built in, `1/d^p` weights  | none                 |
//! | `linear`  | Delaunay, barycentric      | filled with the mean |
//! | `nearest` | Delaunay, nearest vertex   | none                 |
//!
//! Failures are values: every problem comes back as an
//! [`InterpolationError`], never a panic.

pub mod idw;
pub mod triangulation;

pub use idw::IdwParams;

use crate::types::{GridBounds, SamplePoint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hard ceiling on grid resolution for direct callers.
pub const GRID_SIZE_LIMIT: usize = 2048;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("not enough points for interpolation ({available} available, {required} required)")]
    InsufficientData { available: usize, required: usize },

    #[error("unknown method: {0}")]
    UnsupportedMethod(String),

    #[error("triangulation backend is not available for `{method}` interpolation; use `idw` instead")]
    BackendUnavailable { method: String },

    #[error("grid size {requested} is outside the supported range {min}..={max}")]
    InvalidGridSize {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("sample coordinates and values must be finite")]
    NonFinite,
}

impl InterpolationError {
    /// Stable machine-readable tag for payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::UnsupportedMethod(_) => "unsupported_method",
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::InvalidGridSize { .. } => "invalid_grid_size",
            Self::NonFinite => "non_finite",
        }
    }
}

// ============================================================================
// Method
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Idw,
    Linear,
    Nearest,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Idw, Method::Linear, Method::Nearest];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Idw => "idw",
            Method::Linear => "linear",
            Method::Nearest => "nearest",
        }
    }

    /// Fewest samples the method can work from.
    pub fn min_points(self) -> usize {
        match self {
            Method::Linear => 3,
            Method::Idw | Method::Nearest => 1,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = InterpolationError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| InterpolationError::UnsupportedMethod(s.trim().to_string()))
    }
}

// ============================================================================
// Grid
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationParams {
    /// Fraction of each axis span added on both sides of the bounding box
    pub padding_fraction: f64,
    pub idw: IdwParams,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            padding_fraction: 0.05,
            idw: IdwParams::default(),
        }
    }
}

/// A fully populated estimate grid. `values[row][col]`, row along y.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolationGrid {
    pub method: Method,
    pub grid_size: usize,
    pub bounds: GridBounds,
    pub values: Vec<Vec<f64>>,
}

impl InterpolationGrid {
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    pub fn cols(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Value of the node nearest `(x, y)`.
    ///
    /// The normalized coordinate `(c - min) / step` is rounded half-to-even
    /// and clamped into the grid. A degenerate axis uses a step of 1. This is
    /// a nearest-node lookup, not bilinear interpolation, so it carries a
    /// discretization bias proportional to the node spacing.
    pub fn nearest_cell(&self, x: f64, y: f64) -> Option<f64> {
        let rows = self.rows();
        let cols = self.cols();
        if rows == 0 || cols == 0 {
            return None;
        }

        let b = &self.bounds;
        let col = nearest_index(x, b.min_x, b.max_x, cols);
        let row = nearest_index(y, b.min_y, b.max_y, rows);
        self.values.get(row)?.get(col).copied()
    }
}

fn nearest_index(coord: f64, min: f64, max: f64, count: usize) -> usize {
    let step = if count > 1 {
        (max - min) / (count - 1) as f64
    } else {
        1.0
    };
    let raw = if step != 0.0 {
        ((coord - min) / step).round_ties_even()
    } else {
        0.0
    };
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(count - 1)
    }
}

/// Interpolate `points` onto a square grid.
///
/// Accepts any `grid_size` in `1..=GRID_SIZE_LIMIT`; callers enforce their own
/// tighter range.
pub fn interpolate_points(
    points: &[SamplePoint],
    method: Method,
    grid_size: usize,
    params: &InterpolationParams,
) -> Result<InterpolationGrid, InterpolationError> {
    if grid_size == 0 || grid_size > GRID_SIZE_LIMIT {
        return Err(InterpolationError::InvalidGridSize {
            requested: grid_size,
            min: 1,
            max: GRID_SIZE_LIMIT,
        });
    }
    if points.len() < method.min_points() {
        return Err(InterpolationError::InsufficientData {
            available: points.len(),
            required: method.min_points(),
        });
    }
    if !points.iter().all(SamplePoint::is_finite) {
        return Err(InterpolationError::NonFinite);
    }

    let bounds = GridBounds::padded(points, params.padding_fraction).ok_or(
        InterpolationError::InsufficientData {
            available: 0,
            required: 1,
        },
    )?;

    let values = match method {
        Method::Idw => idw::interpolate_grid(points, &bounds, grid_size, &params.idw),
        Method::Linear | Method::Nearest => {
            triangulation::interpolate_grid(points, &bounds, grid_size, method)?
        }
    };

    Ok(InterpolationGrid {
        method,
        grid_size,
        bounds,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Vec<SamplePoint> {
        vec![
            SamplePoint::new(0.0, 0.0, 10.0),
            SamplePoint::new(10.0, 0.0, 20.0),
            SamplePoint::new(0.0, 10.0, 10.0),
            SamplePoint::new(10.0, 10.0, 20.0),
        ]
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(" IDW ".parse::<Method>(), Ok(Method::Idw));
        assert_eq!("nearest".parse::<Method>(), Ok(Method::Nearest));
        assert_eq!(
            "kriging".parse::<Method>(),
            Err(InterpolationError::UnsupportedMethod("kriging".into()))
        );
    }

    #[test]
    fn test_idw_corner_gradient() {
        let grid = interpolate_points(&corners(), Method::Idw, 5, &InterpolationParams::default()).unwrap();
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), 5);
        assert!((grid.values[0][0] - 10.0).abs() < (grid.values[0][0] - 20.0).abs());
        assert!((grid.values[4][4] - 20.0).abs() < (grid.values[4][4] - 10.0).abs());
        for row in &grid.values {
            assert!(row.windows(2).all(|w| w[0] <= w[1] + 1e-12), "monotonic in x");
        }
    }

    #[test]
    fn test_grid_shape_matches_request() {
        for g in [1, 2, 10, 37] {
            let grid = interpolate_points(&corners(), Method::Idw, g, &InterpolationParams::default()).unwrap();
            assert_eq!(grid.values.len(), g);
            assert!(grid.values.iter().all(|r| r.len() == g));
        }
    }

    #[test]
    fn test_reported_failures() {
        let params = InterpolationParams::default();
        assert!(matches!(
            interpolate_points(&[], Method::Idw, 5, &params),
            Err(InterpolationError::InsufficientData { available: 0, .. })
        ));
        assert!(matches!(
            interpolate_points(&corners(), Method::Idw, 0, &params),
            Err(InterpolationError::InvalidGridSize { requested: 0, .. })
        ));
        let bad = [SamplePoint::new(f64::NAN, 0.0, 1.0)];
        assert_eq!(
            interpolate_points(&bad, Method::Idw, 5, &params),
            Err(InterpolationError::NonFinite)
        );
    }

    #[test]
    fn test_nearest_cell_rounds_and_clamps() {
        let grid = InterpolationGrid {
            method: Method::Idw,
            grid_size: 3,
            bounds: GridBounds {
                min_x: 0.0,
                max_x: 2.0,
                min_y: 0.0,
                max_y: 2.0,
            },
            values: vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0], vec![6.0, 7.0, 8.0]],
        };
        assert_eq!(grid.nearest_cell(1.2, 0.1), Some(1.0));
        assert_eq!(grid.nearest_cell(0.5, 0.0), Some(0.0), "half rounds to even");
        assert_eq!(grid.nearest_cell(1.5, 0.0), Some(2.0), "half rounds to even");
        assert_eq!(grid.nearest_cell(-5.0, 99.0), Some(6.0), "clamped");
    }

    #[cfg(not(feature = "triangulation"))]
    #[test]
    fn test_triangulation_methods_unavailable() {
        let err = interpolate_points(&corners(), Method::Linear, 5, &InterpolationParams::default()).unwrap_err();
        assert_eq!(err.kind(), "backend_unavailable");
    }

    #[cfg(feature = "triangulation")]
    #[test]
    fn test_linear_requires_three_points() {
        let err = interpolate_points(&corners()[..2], Method::Linear, 5, &InterpolationParams::default()).unwrap_err();
        assert_eq!(err, InterpolationError::InsufficientData { available: 2, required: 3 });
    }
}
