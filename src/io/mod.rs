//! Input/output helpers.
//!
//! - file layout of a run (`paths`)
//! - station coordinate and window tables (`stations`, `windows`)
//! - optional category ratio maps (`ratios`)
//! - per-period weight files (`weights`)
//! - CSV export of the final weights (`export`)

pub mod export;
pub mod paths;
pub mod ratios;
pub mod stations;
pub mod weights;
pub mod windows;

pub use export::*;
pub use paths::*;
pub use ratios::*;
pub use stations::*;
pub use weights::*;
pub use windows::*;
