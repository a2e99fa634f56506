//! Strata Configuration Module
//!
//! Operator-tunable pipeline constants loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `STRATA_CONFIG` environment variable (path to TOML file)
//! 2. `strata_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Load once in the binary and pass by reference into every pipeline call.
//! There is no process-wide configuration: two requests with different
//! configs never interfere.
//!
//! ```ignore
//! let config = StrataConfig::load();
//! let report = pipeline::run_pipeline(&data_dir, "density", "idw", 50, &config)?;
//! ```

mod strata_config;
pub mod validation;

pub use strata_config::*;
