//! Depth Deriver: cumulative top/bottom depth per layer from thickness.

use crate::types::{BoreholeTable, DepthInterval, Field, Z_BOTTOM_COLUMN, Z_TOP_COLUMN};

/// Attach `z_top`/`z_bottom` to every layer.
///
/// Missing thickness counts as 0 for the running sum only; the layer's
/// thickness itself stays missing. Tables without a thickness column are
/// returned unchanged.
pub fn derive_depth(mut table: BoreholeTable) -> BoreholeTable {
    if !table.has_column(Field::Thickness.as_str()) {
        return table;
    }

    let mut cumulative = 0.0;
    for layer in &mut table.layers {
        let z_top = cumulative;
        cumulative += layer.thickness.unwrap_or(0.0);
        layer.depth = Some(DepthInterval {
            z_top,
            z_bottom: cumulative,
        });
    }

    for label in [Z_TOP_COLUMN, Z_BOTTOM_COLUMN] {
        if !table.has_column(label) {
            table.columns.push(label.to_string());
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LayerRecord;

    fn table(thicknesses: &[Option<f64>]) -> BoreholeTable {
        let layers = thicknesses
            .iter()
            .enumerate()
            .map(|(i, t)| LayerRecord {
                thickness: *t,
                ..LayerRecord::new(i)
            })
            .collect();
        BoreholeTable::new("ZK1", vec!["name".into(), "thickness".into()], layers)
    }

    #[test]
    fn test_cumulative_depths() {
        let t = derive_depth(table(&[Some(2.0), Some(3.5), Some(1.0)]));
        let depths: Vec<_> = t.layers.iter().map(|l| l.depth.unwrap()).collect();
        assert_eq!(depths[0], DepthInterval { z_top: 0.0, z_bottom: 2.0 });
        assert_eq!(depths[1], DepthInterval { z_top: 2.0, z_bottom: 5.5 });
        assert_eq!(depths[2], DepthInterval { z_top: 5.5, z_bottom: 6.5 });
        assert!(t.has_column("z_top") && t.has_column("z_bottom"));
    }

    #[test]
    fn test_interval_equals_thickness() {
        let t = derive_depth(table(&[Some(0.7), Some(12.25), Some(3.3), Some(0.0)]));
        for layer in &t.layers {
            let d = layer.depth.unwrap();
            assert!((d.z_bottom - d.z_top - layer.thickness.unwrap()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_thickness_counts_as_zero_but_stays_missing() {
        let t = derive_depth(table(&[Some(2.0), None, Some(1.0)]));
        assert_eq!(t.layers[1].thickness, None);
        assert_eq!(t.layers[1].depth, Some(DepthInterval { z_top: 2.0, z_bottom: 2.0 }));
        assert_eq!(t.layers[2].depth.unwrap().z_bottom, 3.0);
    }

    #[test]
    fn test_no_thickness_column_is_unchanged() {
        let mut original = table(&[Some(2.0)]);
        original.columns = vec!["name".into()];
        let derived = derive_depth(original.clone());
        assert_eq!(derived, original);
    }
}
