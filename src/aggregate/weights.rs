//! Composite-index weights.

use serde::Serialize;
use std::collections::BTreeMap;

/// Built-in weighting used when a caller supplies nothing usable.
pub const DEFAULT_INDEX_WEIGHTS: [(&str, f64); 3] = [
    ("elastic_modulus", 0.4),
    ("density", 0.3),
    ("tensile_strength", 0.3),
];

/// Property label to weight, normalized to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexWeights {
    weights: BTreeMap<String, f64>,
}

impl IndexWeights {
    /// Normalize `raw` to sum to 1.
    ///
    /// Negative and non-finite entries are dropped. An empty map, or one whose
    /// remaining sum is not positive, falls back to `defaults` (normalized the
    /// same way). Returns an empty weighting only when `defaults` is itself
    /// degenerate.
    pub fn normalized(raw: &BTreeMap<String, f64>, defaults: &BTreeMap<String, f64>) -> Self {
        Self::normalize(raw)
            .or_else(|| Self::normalize(defaults))
            .unwrap_or_else(|| Self {
                weights: BTreeMap::new(),
            })
    }

    fn normalize(raw: &BTreeMap<String, f64>) -> Option<Self> {
        let cleaned: BTreeMap<String, f64> = raw
            .iter()
            .filter(|(_, w)| w.is_finite() && **w >= 0.0)
            .map(|(k, w)| (k.trim().to_string(), *w))
            .collect();
        let total: f64 = cleaned.values().sum();
        if cleaned.is_empty() || total <= 0.0 {
            return None;
        }
        let weights = cleaned.into_iter().map(|(k, w)| (k, w / total)).collect();
        Some(Self { weights })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.weights.get(label).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for IndexWeights {
    fn default() -> Self {
        Self::normalized(&BTreeMap::new(), &default_weight_map())
    }
}

/// [`DEFAULT_INDEX_WEIGHTS`] as an owned map.
pub fn default_weight_map() -> BTreeMap<String, f64> {
    DEFAULT_INDEX_WEIGHTS
        .iter()
        .map(|(k, w)| ((*k).to_string(), *w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = IndexWeights::normalized(&map(&[("density", 2.0), ("thickness", 6.0)]), &default_weight_map());
        assert!((w.total() - 1.0).abs() < 1e-12);
        assert_eq!(w.get("density"), Some(0.25));
        assert_eq!(w.get("thickness"), Some(0.75));
    }

    #[test]
    fn test_empty_and_zero_sum_fall_back_to_defaults() {
        let defaults = default_weight_map();
        let empty = IndexWeights::normalized(&BTreeMap::new(), &defaults);
        let zero = IndexWeights::normalized(&map(&[("density", 0.0)]), &defaults);
        assert_eq!(empty, IndexWeights::default());
        assert_eq!(zero, IndexWeights::default());
        assert_eq!(empty.get("elastic_modulus"), Some(0.4));
    }

    #[test]
    fn test_negative_and_nan_entries_dropped() {
        let w = IndexWeights::normalized(
            &map(&[("density", -1.0), ("elastic_modulus", f64::NAN), ("tensile_strength", 3.0)]),
            &default_weight_map(),
        );
        assert_eq!(w.iter().count(), 1);
        assert_eq!(w.get("tensile_strength"), Some(1.0));
    }
}
