//! Great-circle distances on the unit sphere.
//!
//! Distances are returned in **degrees** of arc, which is the unit the
//! declustering reference distance is scanned in.

use nalgebra::DMatrix;

use crate::domain::SpherePoint;

/// Angular distance between two points (degrees), via the haversine formula.
pub fn great_circle_deg(a: &SpherePoint, b: &SpherePoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `h` a hair above 1 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    c.to_degrees()
}

/// Symmetric pairwise distance matrix (degrees) with a zero diagonal.
pub fn distance_matrix(points: &[SpherePoint]) -> DMatrix<f64> {
    let n = points.len();
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = great_circle_deg(&points[i], &points[j]);
            m[(i, j)] = d;
            m[(j, i)] = d;
        }
    }
    m
}
