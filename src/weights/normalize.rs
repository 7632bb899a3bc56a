//! Normalization passes and the mode-driven weighting pipeline.
//!
//! Each pass scales a single field by a scalar and hands the set back:
//!
//! - receiver pass: per category, `Σ receiver × n == Σ n`
//! - category pass: over all categories, `Σ category × n[cat] == Σ n[cat]`
//! - simple: `Σ weight × n == 1`
//! - simple per category: `Σ weight × n == 1 / n_categories` in every category
//! - legacy: mean receiver weight 1 per category, `Σ category == 1`
//!
//! `compute_weights` strings the passes together for a `NormalizationMode`.

use tracing::{debug, info};

use crate::decluster::Declusterer;
use crate::domain::{CategoryCounts, CategoryValues, NormalizationMode, SpherePoint, WeightSet};
use crate::error::WeightError;
use crate::weights::catalog::StationCatalog;
use crate::weights::category::{apply_category_weights, category_weights};
use crate::weights::combine::{SourceWeighting, calc_final_weights, overall_scalar, validate};
use crate::weights::receiver::{ReceiverDiagnosticsMap, calc_receiver_weights};

/// Rescale receiver weights so each category conserves its measurement count.
pub fn normalize_receiver_weights(mut weights: WeightSet) -> WeightSet {
    for (category, records) in weights.iter_mut() {
        let n_meas: f64 = records.iter().map(|r| r.n_measurements as f64).sum();
        let n_weighted: f64 = records.iter().map(|r| r.receiver * r.n_measurements as f64).sum();
        let factor = n_meas / n_weighted;
        debug!(%category, n_meas, n_weighted, factor, "receiver normalization");
        for rec in records.iter_mut() {
            rec.receiver *= factor;
        }
    }
    weights
}

/// Rescale category weights so the whole dataset conserves its measurement count.
pub fn normalize_category_weights(mut weights: WeightSet, counts: &CategoryCounts) -> WeightSet {
    let mut all_windows = 0.0;
    let mut weighted = 0.0;
    for (category, records) in weights.iter() {
        let (Some(&n), Some(first)) = (counts.get(category), records.first()) else {
            continue;
        };
        all_windows += n as f64;
        weighted += first.category * n as f64;
    }

    let factor = all_windows / weighted;
    debug!(all_windows, weighted, factor, "category normalization");
    for (_, records) in weights.iter_mut() {
        for rec in records.iter_mut() {
            rec.category *= factor;
        }
    }
    weights
}

/// Rescale receiver weights so they average 1 within each category.
pub fn normalize_receiver_count(mut weights: WeightSet) -> WeightSet {
    for (category, records) in weights.iter_mut() {
        let n_recs = records.len() as f64;
        let sum: f64 = records.iter().map(|r| r.receiver).sum();
        let factor = n_recs / sum;
        debug!(%category, n_recs, sum, factor, "receiver count normalization");
        for rec in records.iter_mut() {
            rec.receiver *= factor;
        }
    }
    weights
}

/// Rescale category weights so the per-category values sum to 1.
pub fn normalize_category_unit_sum(mut weights: WeightSet) -> WeightSet {
    let sum: f64 = weights
        .iter()
        .filter_map(|(_, records)| records.first().map(|r| r.category))
        .sum();
    let factor = 1.0 / sum;
    debug!(sum, factor, "category unit-sum normalization");
    for (_, records) in weights.iter_mut() {
        for rec in records.iter_mut() {
            rec.category *= factor;
        }
    }
    weights
}

/// Scale every final weight by `1 / Σ weight × n`.
pub fn simple_normalization(mut weights: WeightSet) -> WeightSet {
    let alpha = 1.0 / weights.weighted_sum();
    debug!(alpha, "simple normalization");
    for (_, records) in weights.iter_mut() {
        for rec in records.iter_mut() {
            rec.weight = rec.weight.map(|w| w * alpha);
        }
    }
    weights
}

/// Scale each category so it contributes exactly `1 / n_categories`.
pub fn simple_per_cat_normalization(mut weights: WeightSet) -> WeightSet {
    let sums = weights.weighted_sums_by_category();
    let n_cat = weights.category_count() as f64;
    for (category, records) in weights.iter_mut() {
        let factor = 1.0 / sums[category] / n_cat;
        debug!(%category, factor, "per-category normalization");
        for rec in records.iter_mut() {
            rec.weight = rec.weight.map(|w| w * factor);
        }
    }
    weights
}

/// Everything needed to run the pipeline besides the catalog.
pub struct PipelineInputs<'a> {
    pub mode: NormalizationMode,
    pub declusterer: &'a dyn Declusterer,
    pub center: SpherePoint,
    /// Externally supplied ratio map scaling the reciprocal category weights.
    pub ratios: Option<&'a CategoryValues>,
    pub source: &'a dyn SourceWeighting,
    pub event: &'a str,
}

/// Outputs of a validated weighting run.
#[derive(Debug, Clone)]
pub struct WeightRun {
    pub mode: NormalizationMode,
    pub weights: WeightSet,
    pub counts: CategoryCounts,
    /// Category weight of each category as stored in the records.
    pub category_weights: CategoryValues,
    pub diagnostics: ReceiverDiagnosticsMap,
    /// Source weight × overall scalar, as applied by the validator.
    pub source_weight: f64,
    pub overall_sum: f64,
}

/// Run receiver weighting, category weighting, normalization, combination
/// and validation for one mode.
pub fn compute_weights(catalog: &StationCatalog, inputs: &PipelineInputs<'_>) -> Result<WeightRun, WeightError> {
    let counts = catalog.measurement_counts();
    let (mut weights, diagnostics) =
        calc_receiver_weights(catalog, inputs.declusterer, &inputs.center, catalog.initial_weights())?;

    weights = match inputs.mode {
        NormalizationMode::Complex => normalize_receiver_weights(weights),
        NormalizationMode::Legacy => normalize_receiver_count(weights),
        NormalizationMode::Simple | NormalizationMode::SimplePerCat => weights,
    };
    weights = apply_category_weights(weights, &category_weights(&counts, inputs.ratios)?);
    weights = match inputs.mode {
        NormalizationMode::Complex => normalize_category_weights(weights, &counts),
        NormalizationMode::Legacy => normalize_category_unit_sum(weights),
        NormalizationMode::Simple | NormalizationMode::SimplePerCat => weights,
    };

    weights = calc_final_weights(weights);
    weights = match inputs.mode {
        NormalizationMode::Complex | NormalizationMode::Legacy => weights,
        NormalizationMode::Simple => simple_normalization(weights),
        NormalizationMode::SimplePerCat => simple_per_cat_normalization(weights),
    };

    let source_weight = inputs.source.source_weight(inputs.event) * overall_scalar(inputs.mode, &weights);
    let overall_sum = validate(&weights, source_weight)?;
    info!(
        mode = inputs.mode.label(),
        n_categories = weights.category_count(),
        n_stations = weights.record_count(),
        source_weight,
        "weights validated"
    );

    let category_weights = weights
        .iter()
        .filter_map(|(cat, recs)| recs.first().map(|r| (cat.clone(), r.category)))
        .collect();

    Ok(WeightRun {
        mode: inputs.mode,
        weights,
        counts,
        category_weights,
        diagnostics,
        source_weight,
        overall_sum,
    })
}
