//! Final weight combination and the overall-sum validator.
//!
//! `weight = receiver × category`. The source (event) weight is not stored on
//! the record; it is applied as a scalar when the overall sum is checked.

use tracing::info;

use crate::domain::{NORMALIZATION_TOLERANCE, NormalizationMode, WeightSet};
use crate::error::WeightError;

/// Per-event weighting.
///
/// Only single-source runs exist today. A multi-source run would provide an
/// implementation that weights events against each other and store the
/// factor per record.
pub trait SourceWeighting {
    fn source_weight(&self, event: &str) -> f64;
}

/// One event, weight 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSource;

impl SourceWeighting for SingleSource {
    fn source_weight(&self, _event: &str) -> f64 {
        1.0
    }
}

/// `weight = receiver × category` on every record.
pub fn calc_final_weights(mut weights: WeightSet) -> WeightSet {
    for (_, records) in weights.iter_mut() {
        for rec in records.iter_mut() {
            rec.weight = Some(rec.receiver * rec.category);
        }
    }
    weights
}

/// Overall scalar folded into the source weight at validation time.
///
/// Complex mode leaves `Σ weight × n` equal to the total measurement count
/// and legacy mode leaves it arbitrary, so both need `1 / Σ weight × n`; the
/// simple modes are already unit-sum.
pub fn overall_scalar(mode: NormalizationMode, weights: &WeightSet) -> f64 {
    match mode {
        NormalizationMode::Complex | NormalizationMode::Legacy => 1.0 / weights.weighted_sum(),
        NormalizationMode::Simple | NormalizationMode::SimplePerCat => 1.0,
    }
}

/// Check `Σ weight × n × source_weight == 1` and return the sum.
pub fn validate(weights: &WeightSet, source_weight: f64) -> Result<f64, WeightError> {
    validate_sum(weights.weighted_sum() * source_weight)
}

/// The tolerance check on an already accumulated sum.
pub fn validate_sum(sum: f64) -> Result<f64, WeightError> {
    info!(sum, "overall weights validator sum");
    if sum.is_finite() && (sum - 1.0).abs() <= NORMALIZATION_TOLERANCE {
        Ok(sum)
    } else {
        Err(WeightError::Normalization {
            sum,
            tolerance: NORMALIZATION_TOLERANCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, WeightRecord};

    fn record(receiver: f64, category: f64, n: u64) -> WeightRecord {
        let mut r = WeightRecord::new("X", n);
        r.receiver = receiver;
        r.category = category;
        r
    }

    #[test]
    fn combines_receiver_and_category() {
        let cat = Category::new("17_40", 'Z');
        let mut set = WeightSet::new();
        set.insert(cat.clone(), vec![record(2.0, 0.25, 1), record(0.5, 0.25, 2)]);
        let set = calc_final_weights(set);
        let recs = set.get(&cat).unwrap();
        assert_eq!(recs[0].weight, Some(0.5));
        assert_eq!(recs[1].weight, Some(0.125));
    }

    #[test]
    fn validator_accepts_unit_sum_and_rejects_drift() {
        let cat = Category::new("17_40", 'Z');
        let mut set = WeightSet::new();
        set.insert(cat, vec![record(1.0, 0.1, 4), record(1.0, 0.1, 6)]);
        let set = calc_final_weights(set);

        assert!((validate(&set, 1.0).unwrap() - 1.0).abs() < 1e-12);
        let err = validate(&set, 1.01).unwrap_err();
        assert!(matches!(err, WeightError::Normalization { .. }));
        assert!(validate_sum(f64::NAN).is_err());
    }

    #[test]
    fn single_source_is_unit() {
        assert_eq!(SingleSource.source_weight("C201001122153A"), 1.0);
    }
}
