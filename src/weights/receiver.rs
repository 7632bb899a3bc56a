//! Receiver (geographic declustering) weights.
//!
//! Each category is declustered on its own: the weights only depend on where
//! that category's stations are. Categories share nothing, so they are
//! evaluated in parallel and merged back in category order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::info;

use crate::decluster::{DeclusterOutput, Declusterer, ScanStep};
use crate::domain::{Category, SpherePoint, Station, WeightRecord, WeightSet};
use crate::error::WeightError;
use crate::weights::catalog::StationCatalog;

/// Per-category declustering diagnostics (not used by later stages).
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverDiagnostics {
    pub n_stations: usize,
    pub ref_distance: Option<f64>,
    pub cond_number: f64,
    pub scan: Vec<ScanStep>,
}

pub type ReceiverDiagnosticsMap = BTreeMap<Category, ReceiverDiagnostics>;

/// Decluster the stations of one category.
///
/// A lone station gets weight 1 without consulting the declusterer.
pub fn receiver_weights(
    category: &Category,
    stations: &[Station],
    declusterer: &dyn Declusterer,
    center: &SpherePoint,
) -> Result<DeclusterOutput, WeightError> {
    match stations.len() {
        0 => {
            return Err(WeightError::EmptyCategory {
                category: category.to_string(),
            });
        }
        1 => return Ok(DeclusterOutput::uniform(1)),
        _ => {}
    }

    let points: Vec<SpherePoint> = stations.iter().map(|s| s.location).collect();
    let out = declusterer.decluster(&points, center)?;
    if out.weights.len() != stations.len() {
        return Err(WeightError::DeclusterMismatch {
            category: category.to_string(),
            expected: stations.len(),
            actual: out.weights.len(),
        });
    }
    Ok(out)
}

/// Set `receiver` (and `n_measurements`) on every record of `weights`.
///
/// Records missing from `weights` are created from the catalog.
pub fn calc_receiver_weights(
    catalog: &StationCatalog,
    declusterer: &dyn Declusterer,
    center: &SpherePoint,
    mut weights: WeightSet,
) -> Result<(WeightSet, ReceiverDiagnosticsMap), WeightError> {
    let entries: Vec<(&Category, &Vec<Station>)> = catalog.iter().collect();
    let results: Vec<Result<DeclusterOutput, WeightError>> = entries
        .par_iter()
        .map(|(cat, stations)| receiver_weights(cat, stations, declusterer, center))
        .collect();

    let mut diagnostics = ReceiverDiagnosticsMap::new();
    for ((category, stations), result) in entries.into_iter().zip(results) {
        let out = result?;

        if weights.get(category).is_none() {
            let fresh = stations
                .iter()
                .map(|s| WeightRecord::new(s.key(), s.window_count))
                .collect();
            weights.insert(category.clone(), fresh);
        }
        if let Some(records) = weights.get_mut(category) {
            for ((rec, station), &w) in records.iter_mut().zip(stations.iter()).zip(&out.weights) {
                rec.receiver = w;
                rec.n_measurements = station.window_count;
            }
        }

        info!(
            %category,
            n_stations = stations.len(),
            ref_distance = out.ref_distance.unwrap_or(f64::NAN),
            cond_number = out.cond_number,
            "receiver weights"
        );
        diagnostics.insert(
            category.clone(),
            ReceiverDiagnostics {
                n_stations: stations.len(),
                ref_distance: out.ref_distance,
                cond_number: out.cond_number,
                scan: out.scan,
            },
        );
    }

    Ok((weights, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decluster::{SphereScan, Uniform};
    use crate::domain::ScanParams;

    fn station(name: &str, lat: f64, lon: f64, windows: u64) -> Station {
        Station {
            network: "XX".into(),
            name: name.into(),
            channel: "BHZ".into(),
            location: SpherePoint::new(lat, lon),
            window_count: windows,
        }
    }

    #[test]
    fn single_station_gets_unit_weight() {
        let cat = Category::new("17_40", 'Z');
        let scan = SphereScan::new(ScanParams::default()).unwrap();
        let out = receiver_weights(&cat, &[station("A", 10.0, 10.0, 5)], &scan, &SpherePoint::origin()).unwrap();
        assert_eq!(out.weights, vec![1.0]);
    }

    #[test]
    fn empty_category_is_an_error() {
        let cat = Category::new("17_40", 'Z');
        let err = receiver_weights(&cat, &[], &Uniform, &SpherePoint::origin()).unwrap_err();
        assert!(matches!(err, WeightError::EmptyCategory { .. }));
    }

    #[test]
    fn short_declusterer_output_is_rejected() {
        struct Broken;
        impl Declusterer for Broken {
            fn decluster(&self, _: &[SpherePoint], _: &SpherePoint) -> Result<DeclusterOutput, WeightError> {
                Ok(DeclusterOutput::uniform(1))
            }
        }
        let cat = Category::new("17_40", 'Z');
        let stations = [station("A", 0.0, 0.0, 1), station("B", 0.0, 1.0, 1)];
        let err = receiver_weights(&cat, &stations, &Broken, &SpherePoint::origin()).unwrap_err();
        assert!(matches!(err, WeightError::DeclusterMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn fills_records_for_every_category() {
        let z = Category::new("17_40", 'Z');
        let r = Category::new("17_40", 'R');
        let catalog = StationCatalog::from_stations(BTreeMap::from([
            (
                z.clone(),
                vec![
                    station("A", 35.0, -118.0, 4),
                    station("B", 35.2, -118.1, 2),
                    station("C", -30.0, 20.0, 1),
                ],
            ),
            (r.clone(), vec![station("D", 0.0, 0.0, 7)]),
        ]));
        let scan = SphereScan::new(ScanParams::default()).unwrap();

        let (weights, diag) =
            calc_receiver_weights(&catalog, &scan, &SpherePoint::origin(), WeightSet::new()).unwrap();

        let zr = weights.get(&z).unwrap();
        assert_eq!(zr.len(), 3);
        assert!(zr[2].receiver > zr[0].receiver);
        assert_eq!(zr[0].n_measurements, 4);
        assert_eq!(weights.get(&r).unwrap()[0].receiver, 1.0);
        assert_eq!(diag[&r].n_stations, 1);
        assert!(diag[&z].ref_distance.is_some());
    }
}
