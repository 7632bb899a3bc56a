//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - threaded through the weighting stages in memory
//! - written to / reloaded from the per-period weight files
//! - summarized in terminal reports

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::WeightError;

/// Default period bands, in seconds (`min_max`).
pub const DEFAULT_PERIODS: [&str; 3] = ["17_40", "40_100", "90_250"];

/// Default wave components.
pub const DEFAULT_COMPONENTS: &str = "ZRT";

/// Relative tolerance of the final overall-sum check.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// A (period band, component) stratum.
///
/// Ordering is period first, then component, so every category-keyed map
/// iterates deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category {
    pub period: String,
    pub component: char,
}

impl Category {
    pub fn new(period: impl Into<String>, component: char) -> Self {
        Self {
            period: period.into(),
            component,
        }
    }

    /// The full cross product of configured periods and components.
    pub fn all(periods: &[String], components: &[char]) -> Vec<Category> {
        let mut out = Vec::with_capacity(periods.len() * components.len());
        for period in periods {
            for &component in components {
                out.push(Category::new(period.clone(), component));
            }
        }
        out
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.period, self.component)
    }
}

/// A point on the unit sphere, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpherePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl SpherePoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// The geographic origin, used as center when weighting is event independent.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// One physical receiver channel within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub network: String,
    pub name: String,
    /// Channel code, e.g. `BHZ`. The last character is the component.
    pub channel: String,
    pub location: SpherePoint,
    /// Number of measurement windows contributed (always > 0).
    pub window_count: u64,
}

impl Station {
    /// `NET.STA.CHAN`, the key used in weight files.
    pub fn key(&self) -> String {
        format!("{}.{}.{}", self.network, self.name, self.channel)
    }
}

/// Per-station weights, accumulated stage by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    /// Station key (`NET.STA.CHAN`). On disk this is the map key.
    #[serde(skip)]
    pub station: String,
    /// Final combined weight; `None` until the combiner runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub n_measurements: u64,
    pub receiver: f64,
    pub category: f64,
}

impl WeightRecord {
    pub fn new(station: impl Into<String>, n_measurements: u64) -> Self {
        Self {
            station: station.into(),
            weight: None,
            n_measurements,
            receiver: 1.0,
            category: 1.0,
        }
    }

    /// `weight × n_measurements`, or zero before combination.
    pub fn weighted_measurements(&self) -> f64 {
        self.weight.unwrap_or(0.0) * self.n_measurements as f64
    }
}

/// Total measurement count per category.
pub type CategoryCounts = BTreeMap<Category, u64>;

/// A scalar per category (category weights, ratio overrides, sums).
pub type CategoryValues = BTreeMap<Category, f64>;

/// The weight records of a run, grouped by category.
///
/// Every stage takes a `WeightSet` by value and hands back the updated set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightSet {
    records: BTreeMap<Category, Vec<WeightRecord>>,
}

impl WeightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, records: Vec<WeightRecord>) {
        self.records.insert(category, records);
    }

    pub fn get(&self, category: &Category) -> Option<&[WeightRecord]> {
        self.records.get(category).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, category: &Category) -> Option<&mut Vec<WeightRecord>> {
        self.records.get_mut(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &Vec<WeightRecord>)> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Category, &mut Vec<WeightRecord>)> {
        self.records.iter_mut()
    }

    pub fn category_count(&self) -> usize {
        self.records.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Σ weight × n_measurements over every record.
    pub fn weighted_sum(&self) -> f64 {
        self.records
            .values()
            .flat_map(|recs| recs.iter())
            .map(WeightRecord::weighted_measurements)
            .sum()
    }

    /// Σ weight × n_measurements per category.
    pub fn weighted_sums_by_category(&self) -> CategoryValues {
        self.records
            .iter()
            .map(|(cat, recs)| {
                let sum = recs.iter().map(WeightRecord::weighted_measurements).sum();
                (cat.clone(), sum)
            })
            .collect()
    }
}

/// Normalization scheme applied after raw weights are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Receiver and category weights each conserve measurement counts; the
    /// overall scalar is folded into the source weight.
    Complex,
    /// Raw receiver × category weights, then one global scalar.
    Simple,
    /// One scalar per category so every category contributes an equal share.
    #[value(name = "simple_per_cat")]
    SimplePerCat,
    /// Receiver weights average 1 per category and category weights sum to
    /// 1; the overall scalar is folded into the source weight as in complex.
    Legacy,
}

impl NormalizationMode {
    pub fn label(self) -> &'static str {
        match self {
            NormalizationMode::Complex => "complex",
            NormalizationMode::Simple => "simple",
            NormalizationMode::SimplePerCat => "simple_per_cat",
            NormalizationMode::Legacy => "legacy",
        }
    }
}

/// Which declustering algorithm computes receiver weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeclusterKind {
    /// Scan-selected Gaussian kernel on great-circle distances.
    Scan,
    /// Every station gets receiver weight 1.
    None,
}

/// Reference-distance scan settings for spherical declustering (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Select the smallest distance whose condition number reaches this
    /// fraction of the peak.
    pub max_ratio: f64,
    /// First scanned reference distance.
    pub start: f64,
    /// Step between scanned distances.
    pub gap: f64,
    /// Stop once the condition number falls below this fraction of the peak.
    pub drop_ratio: f64,
    /// Hard upper bound on scanned distances.
    pub max_distance: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            max_ratio: 0.3,
            start: 0.5,
            gap: 0.5,
            drop_ratio: 0.95,
            max_distance: 180.0,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), WeightError> {
        let invalid = |reason: String| Err(WeightError::InvalidScanParams { reason });
        if !(self.start.is_finite() && self.start > 0.0) {
            return invalid(format!("start must be > 0 (got {})", self.start));
        }
        if !(self.gap.is_finite() && self.gap > 0.0) {
            return invalid(format!("gap must be > 0 (got {})", self.gap));
        }
        if !(self.max_ratio > 0.0 && self.max_ratio <= 1.0) {
            return invalid(format!("max_ratio must be in (0, 1] (got {})", self.max_ratio));
        }
        if !(self.drop_ratio > 0.0 && self.drop_ratio <= 1.0) {
            return invalid(format!("drop_ratio must be in (0, 1] (got {})", self.drop_ratio));
        }
        if !(self.max_distance.is_finite() && self.max_distance >= self.start) {
            return invalid(format!(
                "max_distance must be >= start (got {} < {})",
                self.max_distance, self.start
            ));
        }
        Ok(())
    }
}

/// Where a run reads its inputs and writes its outputs.
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub event: String,
    pub periods: Vec<String>,
    pub components: Vec<char>,
    pub output_dir: PathBuf,
}

impl DataLayout {
    pub fn categories(&self) -> Vec<Category> {
        Category::all(&self.periods, &self.components)
    }
}

/// A full `calculate` configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub layout: DataLayout,
    pub mode: NormalizationMode,
    pub decluster: DeclusterKind,
    pub scan: ScanParams,
    /// Reference point handed to the declustering capability.
    pub center: SpherePoint,
    /// Optional `{period: {component: ratio}}` JSON overriding category weights.
    pub category_ratio: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub scan_report: Option<PathBuf>,
}
