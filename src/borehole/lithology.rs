//! Lithology Averager
//!
//! Per-rock-name mean of every numeric field across the whole corpus of one
//! request. Computed before any imputation so a borehole never feeds its own
//! filled-in values back into the averages. Missing cells are excluded from
//! the mean; a group with no values for a field that exists in the corpus
//! gets 0.

use crate::types::{BoreholeTable, Field};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Rock name -> field -> mean. Request-scoped; never cached across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LithologyAverages {
    by_name: BTreeMap<String, BTreeMap<Field, f64>>,
}

impl LithologyAverages {
    /// Average every canonical field, grouped by layer name, over `tables`.
    ///
    /// A field gets an entry only if some table in the corpus carries its
    /// column; layers without a name are ignored.
    pub fn compute<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a BoreholeTable>,
    {
        let mut present: BTreeSet<Field> = BTreeSet::new();
        let mut sums: BTreeMap<String, BTreeMap<Field, (f64, usize)>> = BTreeMap::new();

        for table in tables {
            let fields = table.present_fields();
            present.extend(fields.iter().copied());

            for layer in &table.layers {
                let Some(name) = layer.name.as_deref() else {
                    continue;
                };
                let group = sums.entry(name.to_string()).or_default();
                for &field in &fields {
                    if let Some(v) = layer.field(field) {
                        let (sum, count) = group.entry(field).or_insert((0.0, 0));
                        *sum += v;
                        *count += 1;
                    }
                }
            }
        }

        let by_name = sums
            .into_iter()
            .map(|(name, group)| {
                let means = present
                    .iter()
                    .map(|field| {
                        let mean = match group.get(field) {
                            Some(&(sum, count)) if count > 0 => sum / count as f64,
                            _ => 0.0,
                        };
                        (*field, mean)
                    })
                    .collect();
                (name, means)
            })
            .collect();

        Self { by_name }
    }

    /// All field means for one rock name.
    pub fn get(&self, name: &str) -> Option<&BTreeMap<Field, f64>> {
        self.by_name.get(name)
    }

    pub fn average(&self, name: &str, field: Field) -> Option<f64> {
        self.get(name)?.get(&field).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
