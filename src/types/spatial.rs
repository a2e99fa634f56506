//! Spatial types: borehole coordinates, sample points, grids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plan-view position of a borehole collar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// Borehole name to collar position. Immutable once loaded.
pub type CoordinateMap = BTreeMap<String, Coordinate>;

/// A scattered (x, y, value) sample fed to the interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Euclidean distance to a location
    #[inline]
    pub fn dist(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }
}

/// Rectangular extent of an interpolation grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl GridBounds {
    /// Bounding box of the points, widened on each side by `padding` times
    /// the axis span. Returns `None` for an empty point set.
    pub fn padded(points: &[SamplePoint], padding: f64) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }

        let dx = bounds.max_x - bounds.min_x;
        let dy = bounds.max_y - bounds.min_y;
        bounds.min_x -= dx * padding;
        bounds.max_x += dx * padding;
        bounds.min_y -= dy * padding;
        bounds.max_y += dy * padding;
        Some(bounds)
    }

    /// Spacing between adjacent nodes for an axis with `count` nodes.
    /// Zero when there is a single node.
    pub fn step(min: f64, max: f64, count: usize) -> f64 {
        if count > 1 {
            (max - min) / (count - 1) as f64
        } else {
            0.0
        }
    }
}

/// Evenly spaced values from `start` to `end` inclusive.
///
/// A single sample yields `[start]`; the final sample is exactly `end`.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut axis: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            axis[count - 1] = end;
            axis
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bounds_add_five_percent() {
        let points = [
            SamplePoint::new(0.0, 0.0, 1.0),
            SamplePoint::new(100.0, 20.0, 1.0),
        ];
        let b = GridBounds::padded(&points, 0.05).unwrap();
        assert!((b.min_x + 5.0).abs() < 1e-9);
        assert!((b.max_x - 105.0).abs() < 1e-9);
        assert!((b.min_y + 1.0).abs() < 1e-9);
        assert!((b.max_y - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_padded_bounds_empty() {
        assert!(GridBounds::padded(&[], 0.05).is_none());
    }

    #[test]
    fn test_linspace_endpoints() {
        let axis = linspace(-1.0, 1.0, 5);
        assert_eq!(axis.len(), 5);
        assert_eq!(axis[0], -1.0);
        assert_eq!(axis[4], 1.0);
        assert!((axis[2]).abs() < 1e-12);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
