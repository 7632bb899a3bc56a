//! Geographic declustering.
//!
//! A declusterer assigns each point of a set a weight such that points in
//! dense clusters are down-weighted relative to isolated ones. The receiver
//! engine only depends on the `Declusterer` trait, so any conforming algorithm
//! can be plugged in:
//!
//! - `SphereScan`: Gaussian kernel on great-circle distances with a scanned
//!   reference distance (the default)
//! - `Uniform`: no declustering, every weight is 1

use crate::domain::{DeclusterKind, ScanParams, SpherePoint};
use crate::error::WeightError;

pub mod scan;

pub use scan::SphereScan;

/// One evaluated reference distance of a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanStep {
    pub ref_distance: f64,
    pub cond_number: f64,
}

/// Result of declustering one point set.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclusterOutput {
    /// One weight per input point, in input order.
    pub weights: Vec<f64>,
    /// Selected reference distance (degrees), if the algorithm uses one.
    pub ref_distance: Option<f64>,
    /// `max(weight) / min(weight)` at the selected distance.
    pub cond_number: f64,
    /// Every distance evaluated while scanning (diagnostics only).
    pub scan: Vec<ScanStep>,
}

impl DeclusterOutput {
    pub fn uniform(n: usize) -> Self {
        Self {
            weights: vec![1.0; n],
            ref_distance: None,
            cond_number: 1.0,
            scan: Vec::new(),
        }
    }
}

/// Assign weights to a point set relative to a center.
///
/// Implementations must be order independent: permuting `points` permutes
/// the returned weights the same way.
pub trait Declusterer: Send + Sync {
    fn decluster(&self, points: &[SpherePoint], center: &SpherePoint) -> Result<DeclusterOutput, WeightError>;
}

/// Every point gets weight 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl Declusterer for Uniform {
    fn decluster(&self, points: &[SpherePoint], _center: &SpherePoint) -> Result<DeclusterOutput, WeightError> {
        Ok(DeclusterOutput::uniform(points.len()))
    }
}

/// Build the declusterer selected on the command line.
pub fn build_declusterer(kind: DeclusterKind, params: ScanParams) -> Result<Box<dyn Declusterer>, WeightError> {
    match kind {
        DeclusterKind::Scan => Ok(Box::new(SphereScan::new(params)?)),
        DeclusterKind::None => Ok(Box::new(Uniform)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_weights_everything_equally() {
        let pts = vec![SpherePoint::new(0.0, 0.0), SpherePoint::new(0.0, 0.1)];
        let out = Uniform.decluster(&pts, &SpherePoint::origin()).unwrap();
        assert_eq!(out.weights, vec![1.0, 1.0]);
        assert_eq!(out.ref_distance, None);
    }

    #[test]
    fn factory_rejects_invalid_scan() {
        let params = ScanParams {
            max_ratio: 0.0,
            ..ScanParams::default()
        };
        assert!(build_declusterer(DeclusterKind::Scan, params).is_err());
        assert!(build_declusterer(DeclusterKind::None, params).is_ok());
    }
}
