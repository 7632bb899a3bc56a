//! Weight computation.
//!
//! Responsibilities:
//!
//! - build the per-category station catalog
//! - receiver (declustering) and category weights
//! - normalization passes for each mode
//! - combination into final weights and the overall-sum check

pub mod catalog;
pub mod category;
pub mod combine;
pub mod normalize;
pub mod receiver;

pub use catalog::*;
pub use category::*;
pub use combine::*;
pub use normalize::*;
pub use receiver::*;
