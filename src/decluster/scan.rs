//! Scan-based spherical declustering.
//!
//! For a reference distance `d` (degrees), each point gets
//!
//! ```text
//! w_i = 1 / Σ_j exp(-(D_ij / d)^2)
//! ```
//!
//! where `D` is the great-circle distance matrix; weights are then scaled to
//! mean 1. The quality of a distance is summarized by the condition number
//! `κ(d) = max(w) / min(w)`: tiny `d` sees every point as isolated (κ ≈ 1), huge
//! `d` sees one big cluster (κ ≈ 1 again), and the useful scales sit in between.
//!
//! The smart scan walks `d = start, start + gap, ...` until κ falls below
//! `drop_ratio × peak` (or `d` passes `max_distance`), then selects the smallest
//! scanned `d` whose excess `κ - 1` reaches `max_ratio` of the peak excess.

use nalgebra::DMatrix;
use tracing::{debug, trace};

use crate::decluster::{DeclusterOutput, Declusterer, ScanStep};
use crate::domain::{ScanParams, SpherePoint};
use crate::error::WeightError;
use crate::geo::{distance_matrix, great_circle_deg};

/// Gaussian-kernel declustering with a scanned reference distance.
#[derive(Debug, Clone)]
pub struct SphereScan {
    params: ScanParams,
}

/// The scan trace plus the selected step.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub selected: ScanStep,
    pub steps: Vec<ScanStep>,
}

impl SphereScan {
    pub fn new(params: ScanParams) -> Result<Self, WeightError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Scan reference distances over a precomputed distance matrix.
    pub fn smart_scan(&self, dist: &DMatrix<f64>) -> ScanOutcome {
        let p = &self.params;
        let mut steps = Vec::new();
        let mut peak = 0.0_f64;

        let mut k = 0usize;
        loop {
            let ref_distance = p.start + k as f64 * p.gap;
            if ref_distance > p.max_distance {
                break;
            }
            let cond_number = cond_number(&kernel_weights(dist, ref_distance));
            trace!(ref_distance, cond_number, "scan step");
            steps.push(ScanStep {
                ref_distance,
                cond_number,
            });

            peak = peak.max(cond_number);
            if cond_number < p.drop_ratio * peak {
                break;
            }
            k += 1;
        }

        let threshold = 1.0 + p.max_ratio * (peak - 1.0);
        // `start <= max_distance` is validated, so there is at least one step,
        // and the peak step always clears the threshold.
        let selected = steps
            .iter()
            .copied()
            .find(|s| s.cond_number >= threshold)
            .unwrap_or(steps[0]);

        ScanOutcome { selected, steps }
    }
}

impl Declusterer for SphereScan {
    fn decluster(&self, points: &[SpherePoint], center: &SpherePoint) -> Result<DeclusterOutput, WeightError> {
        match points.len() {
            0 => return Ok(DeclusterOutput::uniform(0)),
            1 => return Ok(DeclusterOutput::uniform(1)),
            _ => {}
        }

        // The kernel only looks at relative distances; the center is logged so
        // runs against different epicenters can be told apart.
        let mean_offset =
            points.iter().map(|p| great_circle_deg(center, p)).sum::<f64>() / points.len() as f64;

        let dist = distance_matrix(points);
        let outcome = self.smart_scan(&dist);
        let weights = kernel_weights(&dist, outcome.selected.ref_distance);

        debug!(
            n_points = points.len(),
            mean_offset_deg = mean_offset,
            ref_distance = outcome.selected.ref_distance,
            cond_number = outcome.selected.cond_number,
            n_steps = outcome.steps.len(),
            "declustered point set"
        );

        Ok(DeclusterOutput {
            weights,
            ref_distance: Some(outcome.selected.ref_distance),
            cond_number: outcome.selected.cond_number,
            scan: outcome.steps,
        })
    }
}

/// Kernel weights at one reference distance, scaled to mean 1.
pub fn kernel_weights(dist: &DMatrix<f64>, ref_distance: f64) -> Vec<f64> {
    let n = dist.nrows();
    if n == 0 {
        return Vec::new();
    }

    let kernel = dist.map(|d| {
        let x = d / ref_distance;
        (-x * x).exp()
    });
    // Symmetric, so column sums are the row sums. The diagonal contributes 1,
    // which keeps every sum >= 1.
    let sums = kernel.row_sum();

    let raw: Vec<f64> = sums.iter().map(|s| 1.0 / s).collect();
    let mean = raw.iter().sum::<f64>() / n as f64;
    raw.into_iter().map(|w| w / mean).collect()
}

/// `max / min` of a weight vector (1 for empty input).
pub fn cond_number(weights: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &w in weights {
        min = min.min(w);
        max = max.max(w);
    }
    if weights.is_empty() || min <= 0.0 {
        return 1.0;
    }
    max / min
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn clustered_set() -> Vec<SpherePoint> {
        // Five stations within a degree of each other plus two isolated ones.
        vec![
            SpherePoint::new(35.0, -118.0),
            SpherePoint::new(35.3, -118.2),
            SpherePoint::new(34.8, -117.7),
            SpherePoint::new(35.5, -118.6),
            SpherePoint::new(34.6, -118.3),
            SpherePoint::new(-20.0, 30.0),
            SpherePoint::new(60.0, 100.0),
        ]
    }

    fn scanner() -> SphereScan {
        SphereScan::new(ScanParams::default()).unwrap()
    }

    #[test]
    fn kernel_weights_have_mean_one() {
        let dist = distance_matrix(&clustered_set());
        let w = kernel_weights(&dist, 5.0);
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        assert!((mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn isolated_stations_outweigh_clustered_ones() {
        let pts = clustered_set();
        let out = scanner().decluster(&pts, &SpherePoint::origin()).unwrap();
        assert_eq!(out.weights.len(), pts.len());
        for clustered in 0..5 {
            assert!(out.weights[5] > out.weights[clustered]);
            assert!(out.weights[6] > out.weights[clustered]);
        }
        assert!(out.cond_number > 1.0);
        assert!(out.ref_distance.is_some());
    }

    #[test]
    fn weights_follow_points_under_permutation() {
        let pts = clustered_set();
        let base = scanner().decluster(&pts, &SpherePoint::origin()).unwrap();

        let mut order: Vec<usize> = (0..pts.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(7));
        let shuffled: Vec<SpherePoint> = order.iter().map(|&i| pts[i]).collect();
        let out = scanner().decluster(&shuffled, &SpherePoint::origin()).unwrap();

        assert_eq!(out.ref_distance, base.ref_distance);
        for (pos, &orig) in order.iter().enumerate() {
            assert!((out.weights[pos] - base.weights[orig]).abs() < 1e-12);
        }
    }

    #[test]
    fn single_point_gets_unit_weight() {
        let out = scanner()
            .decluster(&[SpherePoint::new(10.0, 10.0)], &SpherePoint::origin())
            .unwrap();
        assert_eq!(out.weights, vec![1.0]);
    }

    #[test]
    fn colocated_points_share_weight() {
        let p = SpherePoint::new(-33.0, 151.0);
        let out = scanner().decluster(&[p, p, p], &SpherePoint::origin()).unwrap();
        for w in out.weights {
            assert!((w - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn scan_stops_after_the_peak() {
        let dist = distance_matrix(&clustered_set());
        let outcome = scanner().smart_scan(&dist);
        let peak = outcome
            .steps
            .iter()
            .map(|s| s.cond_number)
            .fold(f64::NEG_INFINITY, f64::max);
        let last = outcome.steps.last().unwrap();
        assert!(last.cond_number < 0.95 * peak || last.ref_distance + 0.5 > 180.0);
        assert!(outcome.selected.ref_distance <= outcome.steps.last().unwrap().ref_distance);
    }

    #[test]
    fn cond_number_of_uniform_is_one() {
        assert_eq!(cond_number(&[2.0, 2.0, 2.0]), 1.0);
        assert_eq!(cond_number(&[]), 1.0);
        assert!((cond_number(&[1.0, 4.0]) - 4.0).abs() < 1e-12);
    }
}
