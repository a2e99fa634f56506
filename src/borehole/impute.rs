//! Missing-Value Imputer: fill blank numeric cells from the lithology average.

use super::lithology::LithologyAverages;
use crate::types::{BoreholeTable, NAME_COLUMN};

/// Fill missing numeric fields with the average for the layer's rock name.
///
/// Layers whose name has no average entry are left untouched, as are fields
/// whose column the table does not carry. Name and depth are never imputed.
pub fn impute_missing(mut table: BoreholeTable, averages: &LithologyAverages) -> BoreholeTable {
    if !table.has_column(NAME_COLUMN) {
        return table;
    }
    let fields = table.present_fields();

    for layer in &mut table.layers {
        let Some(group) = layer.name.as_deref().and_then(|n| averages.get(n)) else {
            continue;
        };
        for &field in &fields {
            let slot = layer.field_mut(field);
            if slot.is_none() {
                *slot = group.get(&field).copied();
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DepthInterval, Field, LayerRecord};

    fn corpus_table() -> BoreholeTable {
        let layers = vec![
            LayerRecord {
                name: Some("mudstone".into()),
                thickness: Some(2.0),
                elastic_modulus: Some(8.0),
                density: Some(24.0),
                ..LayerRecord::new(0)
            },
            LayerRecord {
                name: Some("mudstone".into()),
                thickness: Some(4.0),
                elastic_modulus: Some(10.0),
                density: None,
                ..LayerRecord::new(1)
            },
        ];
        BoreholeTable::new(
            "A",
            vec!["name".into(), "thickness".into(), "elastic_modulus".into(), "density".into()],
            layers,
        )
    }

    #[test]
    fn test_fills_from_lithology_average() {
        let source = corpus_table();
        let avgs = LithologyAverages::compute([&source]);
        let filled = impute_missing(source, &avgs);
        assert_eq!(filled.layers[1].density, Some(24.0));
        assert_eq!(filled.layers[1].elastic_modulus, Some(10.0), "present values untouched");
    }

    #[test]
    fn test_unknown_lithology_left_unmodified() {
        let avgs = LithologyAverages::compute([&corpus_table()]);
        let target = BoreholeTable::new(
            "B",
            vec!["name".into(), "thickness".into(), "density".into()],
            vec![LayerRecord {
                name: Some("granite".into()),
                ..LayerRecord::new(0)
            }],
        );
        let filled = impute_missing(target.clone(), &avgs);
        assert_eq!(filled, target);
    }

    #[test]
    fn test_depth_and_absent_columns_not_imputed() {
        let avgs = LithologyAverages::compute([&corpus_table()]);
        let target = BoreholeTable::new(
            "B",
            vec!["name".into(), "thickness".into()],
            vec![LayerRecord {
                name: Some("mudstone".into()),
                depth: Some(DepthInterval { z_top: 0.0, z_bottom: 0.0 }),
                ..LayerRecord::new(0)
            }],
        );
        let filled = impute_missing(target, &avgs);
        let layer = &filled.layers[0];
        assert_eq!(layer.thickness, Some(3.0));
        assert_eq!(layer.field(Field::Density), None, "table has no density column");
        assert_eq!(layer.depth, Some(DepthInterval { z_top: 0.0, z_bottom: 0.0 }));
    }

    #[test]
    fn test_table_without_name_column_is_unchanged() {
        let avgs = LithologyAverages::compute([&corpus_table()]);
        let mut target = corpus_table();
        target.columns.retain(|c| c != "name");
        target.layers[1].density = None;
        let filled = impute_missing(target.clone(), &avgs);
        assert_eq!(filled, target);
    }
}
