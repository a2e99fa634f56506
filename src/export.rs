//! Grid exporter: `x,y,value` rows, row-major, reconstructed from the bounds
//! and the grid shape.

use crate::types::GridBounds;

/// Delimited text for a grid. An empty grid yields empty output.
pub fn grid_to_csv(values: &[Vec<f64>], bounds: &GridBounds) -> Result<Vec<u8>, csv::Error> {
    let rows = values.len();
    let cols = values.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Ok(Vec::new());
    }

    let dx = GridBounds::step(bounds.min_x, bounds.max_x, cols);
    let dy = GridBounds::step(bounds.min_y, bounds.max_y, rows);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["x", "y", "value"])?;
    for (i, row) in values.iter().enumerate() {
        let y = bounds.min_y + i as f64 * dy;
        for (j, value) in row.iter().enumerate() {
            let x = bounds.min_x + j as f64 * dx;
            writer.serialize((x, y, *value))?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_row_major_triples() {
        let bounds = GridBounds {
            min_x: 0.0,
            max_x: 2.0,
            min_y: 10.0,
            max_y: 12.0,
        };
        let values = vec![vec![1.0, 2.0], vec![3.0, 4.5]];
        let text = String::from_utf8(grid_to_csv(&values, &bounds).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["x,y,value", "0.0,10.0,1.0", "2.0,10.0,2.0", "0.0,12.0,3.0", "2.0,12.0,4.5"]);
    }

    #[test]
    fn test_empty_grid_is_empty_output() {
        let bounds = GridBounds {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        };
        assert!(grid_to_csv(&[], &bounds).unwrap().is_empty());
        assert!(grid_to_csv(&[vec![]], &bounds).unwrap().is_empty());
    }
}
