//! Borehole tables: construction, depth derivation, lithology averages and
//! imputation.
//!
//! ## Flow
//!
//! ```text
//!  borehole CSV ──► read_table ──► normalize headers ──► BoreholeTable
//!                                                           │
//!         corpus of tables ──► LithologyAverages ───────────┤
//!                                                           ▼
//!                                  derive_depth ──► impute_missing
//! ```
//!
//! Every borehole file is read exactly once per request. A file that cannot
//! be read is recorded as skipped and excluded; it never aborts the batch.

pub mod depth;
pub mod impute;
pub mod lithology;

pub use depth::derive_depth;
pub use impute::impute_missing;
pub use lithology::LithologyAverages;

use crate::acquisition::{normalize_labels, read_table, RawFrame, ReadError};
use crate::types::{parse_numeric, BoreholeTable, Field, LayerRecord, NAME_COLUMN};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A borehole file excluded from the request, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub borehole: String,
    pub file: PathBuf,
    pub reason: String,
}

/// All borehole tables for one request, as read (normalized, not imputed).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Corpus {
    pub tables: Vec<BoreholeTable>,
    pub skipped: Vec<SkippedFile>,
}

impl Corpus {
    pub fn from_tables(tables: Vec<BoreholeTable>) -> Self {
        Self {
            tables,
            skipped: Vec::new(),
        }
    }

    /// Lithology averages over every table in the corpus.
    pub fn lithology_averages(&self) -> LithologyAverages {
        LithologyAverages::compute(&self.tables)
    }

    /// Tables with depth derived and missing values imputed.
    ///
    /// Averages are computed from this corpus on every call.
    pub fn prepared(&self) -> Vec<BoreholeTable> {
        let averages = self.lithology_averages();
        self.tables
            .iter()
            .cloned()
            .map(|t| impute_missing(derive_depth(t), &averages))
            .collect()
    }
}

/// Borehole name for a file: its stem.
pub fn borehole_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build a typed table from a raw frame, normalizing headers.
///
/// When two headers normalize to the same canonical label the first wins.
/// Non-canonical columns ride along in [`LayerRecord::extra`].
pub fn table_from_frame(name: &str, frame: &RawFrame) -> BoreholeTable {
    let columns = normalize_labels(&frame.headers);
    let first_index = |label: &str| columns.iter().position(|c| c == label);

    let name_col = first_index(NAME_COLUMN);
    let field_cols: Vec<(Field, usize)> = Field::ALL
        .into_iter()
        .filter_map(|f| first_index(f.as_str()).map(|i| (f, i)))
        .collect();

    let layers = (0..frame.len())
        .map(|row| {
            let mut layer = LayerRecord::new(row);
            layer.name = name_col
                .and_then(|c| frame.cell(row, c))
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            for &(field, col) in &field_cols {
                *layer.field_mut(field) = frame.cell(row, col).and_then(parse_numeric);
            }
            for (col, label) in columns.iter().enumerate() {
                if Some(col) == name_col || field_cols.iter().any(|(_, c)| *c == col) {
                    continue;
                }
                if let Some(raw) = frame.cell(row, col) {
                    layer.extra.entry(label.clone()).or_insert_with(|| raw.to_string());
                }
            }
            layer
        })
        .collect();

    BoreholeTable::new(name, columns, layers)
}

/// Read and normalize one borehole file.
pub fn load_borehole(path: &Path) -> Result<BoreholeTable, ReadError> {
    let frame = read_table(path)?;
    Ok(table_from_frame(&borehole_name(path), &frame))
}

/// Read every file once. Unreadable files land in [`Corpus::skipped`].
pub fn load_corpus(files: &[PathBuf]) -> Corpus {
    let mut corpus = Corpus::default();
    for path in files {
        match load_borehole(path) {
            Ok(table) => {
                debug!(borehole = %table.name, layers = table.len(), "Loaded borehole");
                corpus.tables.push(table);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable borehole file");
                corpus.skipped.push(SkippedFile {
                    borehole: borehole_name(path),
                    file: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::parse_text;

    const ZK1: &str = "序号,名称,厚度/m,弹性模量/Gpa,容重/kN*m-3,抗拉强度/MPa,备注\n\
                       1,黄土,12.5,,18,,表土\n\
                       2,泥岩,3,8,24.5,1.2,\n\
                       3,细砂岩,abc,20,25,3.1,\n";

    #[test]
    fn test_table_from_frame_normalizes_and_types_cells() {
        let frame = parse_text(ZK1).unwrap();
        let table = table_from_frame("ZK1", &frame);
        assert_eq!(table.name, "ZK1");
        assert_eq!(
            table.columns,
            vec!["index", "name", "thickness", "elastic_modulus", "density", "tensile_strength", "备注"]
        );
        assert_eq!(table.len(), 3);

        let loess = &table.layers[0];
        assert_eq!(loess.name.as_deref(), Some("黄土"));
        assert_eq!(loess.thickness, Some(12.5));
        assert_eq!(loess.elastic_modulus, None);
        assert_eq!(loess.extra.get("备注").map(String::as_str), Some("表土"));
        assert_eq!(loess.extra.get("index").map(String::as_str), Some("1"));

        assert_eq!(table.layers[2].thickness, None, "non-numeric thickness is missing");
        assert_eq!(table.layers[2].sequence_index, 2);
    }

    #[test]
    fn test_prepared_derives_depth_then_imputes() {
        let frame = parse_text(ZK1).unwrap();
        let corpus = Corpus::from_tables(vec![table_from_frame("ZK1", &frame)]);
        let prepared = corpus.prepared();
        let sandstone = &prepared[0].layers[2];
        // depth uses the raw (missing = 0) thickness, imputation fills afterwards
        assert_eq!(sandstone.depth.unwrap().z_top, 15.5);
        assert_eq!(sandstone.depth.unwrap().z_bottom, 15.5);
        assert_eq!(sandstone.thickness, Some(0.0), "细砂岩 has no thickness anywhere, so its group mean is 0");
    }

    #[test]
    fn test_borehole_name_is_file_stem() {
        assert_eq!(borehole_name(Path::new("/data/ZK-12.csv")), "ZK-12");
    }

    #[test]
    fn test_load_corpus_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("ZK1.csv");
        std::fs::write(&good, ZK1).unwrap();
        let missing = dir.path().join("ZK2.csv");

        let corpus = load_corpus(&[good, missing.clone()]);
        assert_eq!(corpus.tables.len(), 1);
        assert_eq!(corpus.skipped.len(), 1);
        assert_eq!(corpus.skipped[0].borehole, "ZK2");
        assert_eq!(corpus.skipped[0].file, missing);
    }
}
