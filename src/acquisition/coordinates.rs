//! Coordinate Loader
//!
//! Reads the dedicated borehole coordinates table (name, x, y) into a
//! [`CoordinateMap`]. A missing required column is a configuration problem
//! for the whole request, so it surfaces as [`ConfigurationError`] rather
//! than being skipped like a bad borehole file.

use super::csv_reader::{read_table, RawFrame, ReadError};
use crate::types::{parse_numeric, Coordinate, CoordinateMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Accepted header labels for the borehole-name column.
const NAME_LABELS: &[&str] = &["钻孔名", "钻孔", "钻孔编号", "孔号", "borehole", "name", "hole_id"];
/// Accepted header labels for the x column.
const X_LABELS: &[&str] = &["坐标x", "x坐标", "x", "easting"];
/// Accepted header labels for the y column.
const Y_LABELS: &[&str] = &["坐标y", "y坐标", "y", "northing"];

/// Fatal problems with the coordinates table.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("coordinates table {} could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("coordinates table {} has no {role} column (accepted labels: {accepted})", path.display())]
    MissingColumn {
        path: PathBuf,
        role: &'static str,
        accepted: String,
    },
}

/// Load the coordinates table at `path`.
pub fn load_coordinates(path: &Path) -> Result<CoordinateMap, ConfigurationError> {
    let frame = read_table(path).map_err(|source| ConfigurationError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    coordinates_from_frame(&frame, path)
}

/// Build the coordinate map from an already-read frame.
///
/// Rows with a blank name are skipped. Rows whose x or y is not numeric are
/// skipped with a warning; that borehole then reports as missing coordinates.
/// A repeated name keeps the last row.
pub fn coordinates_from_frame(
    frame: &RawFrame,
    path: &Path,
) -> Result<CoordinateMap, ConfigurationError> {
    let name_col = find_column(frame, NAME_LABELS, "borehole name", path)?;
    let x_col = find_column(frame, X_LABELS, "x", path)?;
    let y_col = find_column(frame, Y_LABELS, "y", path)?;

    let mut coords = CoordinateMap::new();
    for row in 0..frame.len() {
        let Some(name) = frame.cell(row, name_col).map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };

        let x = frame.cell(row, x_col).and_then(parse_numeric);
        let y = frame.cell(row, y_col).and_then(parse_numeric);
        match (x, y) {
            (Some(x), Some(y)) => {
                coords.insert(name.to_string(), Coordinate { x, y });
            }
            _ => {
                warn!(borehole = name, row, "Skipping coordinates row with non-numeric x/y");
            }
        }
    }

    debug!(file = %path.display(), boreholes = coords.len(), "Loaded borehole coordinates");
    Ok(coords)
}

fn find_column(
    frame: &RawFrame,
    accepted: &[&str],
    role: &'static str,
    path: &Path,
) -> Result<usize, ConfigurationError> {
    frame
        .headers
        .iter()
        .position(|h| {
            let label = h.trim().to_lowercase();
            accepted.iter().any(|a| a.to_lowercase() == label)
        })
        .ok_or_else(|| ConfigurationError::MissingColumn {
            path: path.to_path_buf(),
            role,
            accepted: accepted.join(", "),
        })
}
