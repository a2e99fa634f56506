//! Borehole Aggregator
//!
//! Reduces a prepared borehole table to one scalar: a thickness-weighted mean
//! of a single property, or a composite index blending several of them.
//! Every scalar borehole feature funnels through [`thickness_weighted_mean`].

pub mod weights;

pub use weights::{default_weight_map, IndexWeights, DEFAULT_INDEX_WEIGHTS};

use crate::borehole::{Corpus, SkippedFile};
use crate::types::{BoreholeTable, CoordinateMap, Field, SamplePoint};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// Primitives
// ============================================================================

/// `Σ(value·thickness) / Σ thickness` over layers where both are present and
/// thickness is positive.
///
/// `None` when the table lacks the property or thickness column, or when no
/// layer qualifies.
pub fn thickness_weighted_mean(table: &BoreholeTable, property: &str) -> Option<f64> {
    if !table.has_column(property) || !table.has_column(Field::Thickness.as_str()) {
        return None;
    }

    let (weighted, total) = table
        .layers
        .iter()
        .filter_map(|layer| {
            let thickness = layer.thickness.filter(|t| *t > 0.0)?;
            let value = layer.property(property)?;
            Some((value * thickness, thickness))
        })
        .fold((0.0, 0.0), |(ws, ts), (w, t)| (ws + w, ts + t));

    (total > 0.0).then(|| weighted / total)
}

/// Weighted blend of thickness-weighted means.
///
/// Properties without a defined mean are skipped and the weight sum is
/// renormalized over the ones actually used. `None` when nothing was usable.
pub fn composite_index(table: &BoreholeTable, weights: &IndexWeights) -> Option<f64> {
    let (blended, used) = weights
        .iter()
        .filter_map(|(label, w)| thickness_weighted_mean(table, label).map(|v| (w * v, w)))
        .fold((0.0, 0.0), |(bs, us), (b, u)| (bs + b, us + u));

    (used > 0.0).then(|| blended / used)
}

// ============================================================================
// Per-borehole Items
// ============================================================================

/// The scalar attached to an aggregate item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Value(f64),
    Index(f64),
}

impl Measure {
    pub fn get(self) -> f64 {
        match self {
            Measure::Value(v) | Measure::Index(v) => v,
        }
    }
}

/// One borehole reduced to a located scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateItem {
    pub borehole: String,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub measure: Measure,
}

impl AggregateItem {
    pub fn sample(&self) -> SamplePoint {
        SamplePoint::new(self.x, self.y, self.measure.get())
    }
}

/// Aggregation result over a corpus.
///
/// Boreholes without coordinates are listed in `missing_coords`; boreholes
/// with no defined or a non-finite scalar are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoreholeAggregates {
    pub items: Vec<AggregateItem>,
    pub missing_coords: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

impl BoreholeAggregates {
    pub fn points(&self) -> Vec<SamplePoint> {
        self.items.iter().map(AggregateItem::sample).collect()
    }
}

fn aggregate_with<F>(corpus: &Corpus, coords: &CoordinateMap, reduce: F) -> BoreholeAggregates
where
    F: Fn(&BoreholeTable) -> Option<Measure>,
{
    let mut out = BoreholeAggregates {
        skipped: corpus.skipped.clone(),
        ..Default::default()
    };

    for table in corpus.prepared() {
        let Some(coord) = coords.get(&table.name) else {
            out.missing_coords.push(table.name);
            continue;
        };
        match reduce(&table).filter(|m| m.get().is_finite()) {
            Some(measure) => out.items.push(AggregateItem {
                borehole: table.name,
                x: coord.x,
                y: coord.y,
                measure,
            }),
            None => debug!(borehole = %table.name, "No defined aggregate, dropping"),
        }
    }
    out
}

/// Thickness-weighted mean of `property` for every located borehole.
pub fn aggregate_field(corpus: &Corpus, coords: &CoordinateMap, property: &str) -> BoreholeAggregates {
    aggregate_with(corpus, coords, |t| {
        thickness_weighted_mean(t, property).map(Measure::Value)
    })
}

/// Composite index for every located borehole.
pub fn aggregate_index(corpus: &Corpus, coords: &CoordinateMap, weights: &IndexWeights) -> BoreholeAggregates {
    aggregate_with(corpus, coords, |t| composite_index(t, weights).map(Measure::Index))
}
