//! Spherical geometry helpers.

pub mod distance;

pub use distance::*;
