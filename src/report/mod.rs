//! Reporting: weighted-sum analysis of weight files, terminal formatting and
//! the scan report.

use std::collections::BTreeMap;

use crate::domain::NormalizationMode;
use crate::io::PeriodWeights;

pub mod format;
pub mod scan;

pub use format::*;
pub use scan::*;

/// Weighted sums (`weight × n × source_weight`) of a set of weight files.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightAnalysis {
    /// Period -> component -> sum.
    pub sums: BTreeMap<String, BTreeMap<char, f64>>,
    pub overall: f64,
    pub source_weight: f64,
    pub n_stations: usize,
    pub n_measurements: u64,
}

/// Source scalar to apply when analyzing files written in `mode`.
///
/// Complex-mode files sum to the total measurement count, so their scalar is
/// `1 / Σ n_measurements`. Legacy files carry no conserved total; their scalar
/// is `1 / Σ weight × n`. Simple-mode files are already unit-sum.
pub fn analysis_source_weight(mode: NormalizationMode, files: &BTreeMap<String, PeriodWeights>) -> f64 {
    let records = || files.values().flat_map(|recs| recs.values());
    match mode {
        NormalizationMode::Complex => {
            let total: u64 = records().map(|r| r.n_measurements).sum();
            1.0 / total as f64
        }
        NormalizationMode::Legacy => 1.0 / records().map(|r| r.weighted_measurements()).sum::<f64>(),
        NormalizationMode::Simple | NormalizationMode::SimplePerCat => 1.0,
    }
}

/// Sum `weight × n × source_weight` per period and component.
///
/// The component is the last character of the station key (`NET.STA.BHZ`).
pub fn analyze_weights(files: &BTreeMap<String, PeriodWeights>, source_weight: f64) -> WeightAnalysis {
    let mut sums: BTreeMap<String, BTreeMap<char, f64>> = BTreeMap::new();
    let mut overall = 0.0;
    let mut n_stations = 0;
    let mut n_measurements = 0;

    for (period, records) in files {
        let per_period = sums.entry(period.clone()).or_default();
        for (key, rec) in records {
            let t_weight = rec.weighted_measurements() * source_weight;
            if let Some(component) = key.chars().last() {
                *per_period.entry(component).or_insert(0.0) += t_weight;
            }
            overall += t_weight;
            n_stations += 1;
            n_measurements += rec.n_measurements;
        }
    }

    WeightAnalysis {
        sums,
        overall,
        source_weight,
        n_stations,
        n_measurements,
    }
}
