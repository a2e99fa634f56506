//! Accuracy Evaluator: leave-one-out cross-validation of interpolation methods.
//!
//! For each held-out sample a coarse grid is built from the rest and the
//! estimate at the node nearest the held-out location is compared to its true
//! value. The nearest-node lookup is an approximation: residuals include a
//! discretization error that shrinks with the evaluation grid spacing.

use crate::interpolation::{interpolate_points, InterpolationParams, Method};
use crate::types::SamplePoint;
use serde::{Serialize, Serializer};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

/// RMSE over the folds that produced a residual.
///
/// `rmse` is infinite (serialized as `null`) when `count` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MethodScore {
    pub rmse: f64,
    pub count: usize,
}

impl MethodScore {
    pub fn failed() -> Self {
        Self {
            rmse: f64::INFINITY,
            count: 0,
        }
    }

    fn from_residuals(residuals: &[f64]) -> Self {
        if residuals.is_empty() {
            return Self::failed();
        }
        Self {
            rmse: Statistics::quadratic_mean(residuals.iter()),
            count: residuals.len(),
        }
    }
}

/// Scores in the order the methods were requested. Serializes as a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodScores(pub Vec<(String, MethodScore)>);

impl MethodScores {
    pub fn get(&self, method: &str) -> Option<&MethodScore> {
        self.0.iter().find(|(m, _)| m == method).map(|(_, s)| s)
    }

    /// Method with the lowest RMSE; ties keep the one listed first.
    pub fn recommend(&self) -> Option<&str> {
        let mut best: Option<&(String, MethodScore)> = None;
        for entry in &self.0 {
            if best.map_or(true, |b| entry.1.rmse < b.1.rmse) {
                best = Some(entry);
            }
        }
        best.map(|(m, _)| m.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MethodScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(m, s)| (m, s)))
    }
}

/// Leave-one-out score for one method.
///
/// If any fold fails the method scores zero folds.
pub fn leave_one_out(
    points: &[SamplePoint],
    method: Method,
    grid_size: usize,
    params: &InterpolationParams,
) -> MethodScore {
    let mut residuals = Vec::with_capacity(points.len());

    for (i, held_out) in points.iter().enumerate() {
        let train: Vec<SamplePoint> = points
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| *p)
            .collect();

        let grid = match interpolate_points(&train, method, grid_size, params) {
            Ok(grid) => grid,
            Err(e) => {
                warn!(%method, fold = i, error = %e, "Interpolation failed during evaluation");
                return MethodScore::failed();
            }
        };
        let Some(estimate) = grid.nearest_cell(held_out.x, held_out.y) else {
            return MethodScore::failed();
        };
        residuals.push(estimate - held_out.value);
    }

    MethodScore::from_residuals(&residuals)
}

/// Score every named method. Unknown names score zero folds.
pub fn evaluate_methods<S: AsRef<str>>(
    points: &[SamplePoint],
    methods: &[S],
    grid_size: usize,
    params: &InterpolationParams,
) -> MethodScores {
    let mut scores = MethodScores::default();
    for name in methods {
        let name = name.as_ref().trim();
        if name.is_empty() || scores.get(name).is_some() {
            continue;
        }
        let score = match name.parse::<Method>() {
            Ok(method) => leave_one_out(points, method, grid_size, params),
            Err(e) => {
                warn!(method = name, error = %e, "Skipping evaluation");
                MethodScore::failed()
            }
        };
        debug!(method = name, rmse = score.rmse, folds = score.count, "Method evaluated");
        scores.0.push((name.to_string(), score));
    }
    scores
}
