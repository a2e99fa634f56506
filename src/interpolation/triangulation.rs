//! Triangulation-backed `linear` and `nearest` interpolation.
//!
//! Built on a Delaunay triangulation of the samples. `linear` is barycentric
//! interpolation inside the convex hull; `nearest` takes the closest sample.
//! Nodes left undefined (outside the hull) are back-filled with the sample
//! mean so the grid is always fully populated.
//!
//! The backend sits behind the `triangulation` cargo feature. Without it both
//! methods report [`InterpolationError::BackendUnavailable`].

use super::{InterpolationError, Method};
use crate::types::{GridBounds, SamplePoint};

/// Replace undefined nodes with `fill`.
#[cfg(feature = "triangulation")]
fn backfill(grid: &mut [Vec<f64>], fill: f64) {
    for v in grid.iter_mut().flatten() {
        if !v.is_finite() {
            *v = fill;
        }
    }
}

#[cfg(feature = "triangulation")]
fn sample_mean(points: &[SamplePoint]) -> f64 {
    points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64
}

#[cfg(feature = "triangulation")]
mod backend {
    use super::super::{InterpolationError, Method};
    use crate::types::{linspace, GridBounds, SamplePoint};
    use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};

    struct Vertex(SamplePoint);

    impl HasPosition for Vertex {
        type Scalar = f64;

        fn position(&self) -> Point2<f64> {
            Point2::new(self.0.x, self.0.y)
        }
    }

    pub(super) fn interpolate_grid(
        points: &[SamplePoint],
        bounds: &GridBounds,
        grid_size: usize,
        method: Method,
    ) -> Result<Vec<Vec<f64>>, InterpolationError> {
        let mut tri: DelaunayTriangulation<Vertex> = DelaunayTriangulation::new();
        for p in points {
            tri.insert(Vertex(*p))
                .map_err(|_| InterpolationError::NonFinite)?;
        }

        let xs = linspace(bounds.min_x, bounds.max_x, grid_size);
        let ys = linspace(bounds.min_y, bounds.max_y, grid_size);
        let barycentric = tri.barycentric();

        let grid = ys
            .iter()
            .map(|&y| {
                xs.iter()
                    .map(|&x| {
                        let q = Point2::new(x, y);
                        let v = match method {
                            Method::Linear => barycentric.interpolate(|v| v.data().0.value, q),
                            _ => tri.nearest_neighbor(q).map(|v| v.data().0.value),
                        };
                        v.unwrap_or(f64::NAN)
                    })
                    .collect()
            })
            .collect();
        Ok(grid)
    }
}

/// Interpolate with the triangulation backend.
#[cfg_attr(not(feature = "triangulation"), allow(unused_variables))]
pub fn interpolate_grid(
    points: &[SamplePoint],
    bounds: &GridBounds,
    grid_size: usize,
    method: Method,
) -> Result<Vec<Vec<f64>>, InterpolationError> {
    #[cfg(feature = "triangulation")]
    {
        let mut grid = backend::interpolate_grid(points, bounds, grid_size, method)?;
        backfill(&mut grid, sample_mean(points));
        Ok(grid)
    }
    #[cfg(not(feature = "triangulation"))]
    {
        Err(InterpolationError::BackendUnavailable {
            method: method.as_str().to_string(),
        })
    }
}
