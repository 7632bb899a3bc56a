//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the weighting strata (`Category`) and receivers (`Station`)
//! - per-station weight records (`WeightRecord`, `WeightSet`)
//! - run configuration (`RunConfig`, `ScanParams`, `NormalizationMode`)

pub mod types;

pub use types::*;
