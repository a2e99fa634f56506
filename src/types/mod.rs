//! Shared data structures for the borehole-to-grid pipeline
//!
//! - `layer`: `LayerRecord`, `BoreholeTable`, canonical `Field`s
//! - `spatial`: coordinates, sample points, grid bounds

mod layer;
mod spatial;

pub use layer::*;
pub use spatial::*;
