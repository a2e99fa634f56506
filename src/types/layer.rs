//! Layer-level records: one rock layer per row, ordered top to bottom.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Canonical Fields
// ============================================================================

/// Numeric rock properties carried by every layer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Thickness,
    ElasticModulus,
    Density,
    TensileStrength,
    ShearStrength,
}

impl Field {
    /// All numeric fields, in canonical column order.
    pub const ALL: [Field; 5] = [
        Field::Thickness,
        Field::ElasticModulus,
        Field::Density,
        Field::TensileStrength,
        Field::ShearStrength,
    ];

    /// Canonical column label for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Thickness => "thickness",
            Field::ElasticModulus => "elastic_modulus",
            Field::Density => "density",
            Field::TensileStrength => "tensile_strength",
            Field::ShearStrength => "shear_strength",
        }
    }

    /// Look up a field by its canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical label of the lithology name column.
pub const NAME_COLUMN: &str = "name";
/// Derived depth to the top of a layer.
pub const Z_TOP_COLUMN: &str = "z_top";
/// Derived depth to the bottom of a layer.
pub const Z_BOTTOM_COLUMN: &str = "z_bottom";

/// Lenient numeric coercion for raw cells.
///
/// Blank, non-numeric and non-finite cells (`NaN`, `inf`) are missing.
/// Whitespace is ignored.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// Layer Record
// ============================================================================

/// Cumulative depth interval measured from the top of the borehole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthInterval {
    pub z_top: f64,
    pub z_bottom: f64,
}

/// One rock layer inside a borehole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Zero-based position in the source table (top to bottom)
    pub sequence_index: usize,
    /// Lithology label, trimmed; `None` when the cell is blank
    pub name: Option<String>,
    pub thickness: Option<f64>,
    pub elastic_modulus: Option<f64>,
    pub density: Option<f64>,
    pub tensile_strength: Option<f64>,
    pub shear_strength: Option<f64>,
    /// Derived from thickness; never read from input
    pub depth: Option<DepthInterval>,
    /// Pass-through columns keyed by normalized label, raw cell text
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl LayerRecord {
    pub fn new(sequence_index: usize) -> Self {
        Self {
            sequence_index,
            ..Default::default()
        }
    }

    pub fn field(&self, field: Field) -> Option<f64> {
        match field {
            Field::Thickness => self.thickness,
            Field::ElasticModulus => self.elastic_modulus,
            Field::Density => self.density,
            Field::TensileStrength => self.tensile_strength,
            Field::ShearStrength => self.shear_strength,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut Option<f64> {
        match field {
            Field::Thickness => &mut self.thickness,
            Field::ElasticModulus => &mut self.elastic_modulus,
            Field::Density => &mut self.density,
            Field::TensileStrength => &mut self.tensile_strength,
            Field::ShearStrength => &mut self.shear_strength,
        }
    }

    /// Numeric value of any property by label.
    ///
    /// Resolves canonical fields, the derived depth columns, and finally
    /// pass-through columns (coerced with [`parse_numeric`]).
    pub fn property(&self, label: &str) -> Option<f64> {
        if let Some(field) = Field::from_label(label) {
            return self.field(field);
        }
        let derived = match label {
            Z_TOP_COLUMN => self.depth.map(|d| d.z_top),
            Z_BOTTOM_COLUMN => self.depth.map(|d| d.z_bottom),
            _ => None,
        };
        derived.or_else(|| self.extra.get(label).and_then(|raw| parse_numeric(raw)))
    }
}

// ============================================================================
// Borehole Table
// ============================================================================

/// Ordered layer sequence for one named borehole (name = source file stem).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoreholeTable {
    pub name: String,
    /// Normalized column labels, source order, derived columns appended
    pub columns: Vec<String>,
    pub layers: Vec<LayerRecord>,
}

impl BoreholeTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>, layers: Vec<LayerRecord>) -> Self {
        Self {
            name: name.into(),
            columns,
            layers,
        }
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.columns.iter().any(|c| c == label)
    }

    /// Canonical numeric fields whose column exists in this table.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.has_column(f.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
