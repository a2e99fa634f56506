//! Data acquisition module
//!
//! Handles ingestion of borehole CSV exports and the coordinates table:
//! tolerant decoding, header normalization, and coordinate loading.

pub mod columns;
pub mod coordinates;
pub mod csv_reader;

pub use columns::{normalize_label, normalize_labels};
pub use coordinates::{coordinates_from_frame, load_coordinates, ConfigurationError};
pub use csv_reader::{parse_text, read_table, RawFrame, ReadError};
