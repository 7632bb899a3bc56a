//! `window-weights` library crate.
//!
//! The binary (`ww`) is a thin wrapper around this library so that:
//!
//! - the weighting pipeline is testable without spawning processes
//! - engines (declustering, normalization) are reusable on their own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod decluster;
pub mod domain;
pub mod error;
pub mod geo;
pub mod io;
pub mod logging;
pub mod report;
pub mod weights;
