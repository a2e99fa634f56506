//! Inverse distance weighting.
//!
//! `z(x) = Σ wᵢ·zᵢ / Σ wᵢ` with `wᵢ = 1 / dᵢ^p`. Every sample contributes to
//! every node, so a grid costs O(g²·N); acceptable for the bounded grid
//! sizes accepted by the pipeline.

use crate::types::{linspace, GridBounds, SamplePoint};
use serde::{Deserialize, Serialize};

/// IDW tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdwParams {
    /// Distance exponent
    pub power: f64,
    /// Distances are floored to this so a node on a sample stays finite
    pub min_distance: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            min_distance: 1e-12,
        }
    }
}

/// Estimate at one location. `None` for an empty sample set.
pub fn estimate(points: &[SamplePoint], x: f64, y: f64, params: &IdwParams) -> Option<f64> {
    if points.is_empty() {
        return None;
    }

    let mut weighted = 0.0;
    let mut total = 0.0;
    for p in points {
        let d = p.dist(x, y).max(params.min_distance);
        let w = 1.0 / d.powf(params.power);
        weighted += w * p.value;
        total += w;
    }
    Some(weighted / total)
}

/// Fill a `grid_size × grid_size` grid. Rows follow y, columns follow x.
pub fn interpolate_grid(
    points: &[SamplePoint],
    bounds: &GridBounds,
    grid_size: usize,
    params: &IdwParams,
) -> Vec<Vec<f64>> {
    let xs = linspace(bounds.min_x, bounds.max_x, grid_size);
    let ys = linspace(bounds.min_y, bounds.max_y, grid_size);

    ys.iter()
        .map(|&y| {
            xs.iter()
                .map(|&x| estimate(points, x, y, params).unwrap_or(f64::NAN))
                .collect()
        })
        .collect()
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
    fn test_exact_at_sample_location() {
        let pts = corners();
        let v = estimate(&pts, 10.0, 0.0, &IdwParams::default()).unwrap();
        assert!((v - 20.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn test_symmetric_midpoint_is_average() {
        let v = estimate(&corners(), 5.0, 5.0, &IdwParams::default()).unwrap();
        assert!((v - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_points() {
        assert!(estimate(&[], 0.0, 0.0, &IdwParams::default()).is_none());
    }

    #[test]
    fn test_grid_rows_follow_y() {
        let bounds = GridBounds {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 10.0,
        };
        let grid = interpolate_grid(&corners(), &bounds, 3, &IdwParams::default());
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|row| row.len() == 3));
        // value depends on x only, so each column is constant down the rows
        for col in 0..3 {
            assert!((grid[0][col] - grid[2][col]).abs() < 1e-9);
        }
        assert!(grid[1][0] < grid[1][2]);
    }
}
