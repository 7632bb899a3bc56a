//! Category weights.
//!
//! A category's weight is the reciprocal of its total measurement count, so a
//! sparse (period, component) stratum is not drowned out by an abundant one.
//! An optional ratio map shapes that base per category (`ratio / n`); without
//! a map the plain reciprocal is returned.

use tracing::warn;

use crate::domain::{CategoryCounts, CategoryValues, WeightSet};
use crate::error::WeightError;

/// One weight per category; a pure function of `counts` and `ratios`.
pub fn category_weights(
    counts: &CategoryCounts,
    ratios: Option<&CategoryValues>,
) -> Result<CategoryValues, WeightError> {
    let mut out = CategoryValues::new();
    for (category, &n) in counts {
        if n == 0 {
            return Err(WeightError::ZeroMeasurementCategory {
                category: category.to_string(),
            });
        }

        let base = 1.0 / n as f64;
        let weight = match ratios {
            None => base,
            Some(map) => {
                let ratio = *map.get(category).ok_or_else(|| WeightError::InvalidCategoryRatio {
                    category: category.to_string(),
                    reason: "missing from ratio map".into(),
                })?;
                if !(ratio.is_finite() && ratio > 0.0) {
                    return Err(WeightError::InvalidCategoryRatio {
                        category: category.to_string(),
                        reason: format!("ratio must be finite and > 0 (got {ratio})"),
                    });
                }
                base * ratio
            }
        };
        out.insert(category.clone(), weight);
    }
    Ok(out)
}

/// Copy each category's weight onto all of its records.
pub fn apply_category_weights(mut weights: WeightSet, category_weights: &CategoryValues) -> WeightSet {
    for (category, records) in weights.iter_mut() {
        let Some(&w) = category_weights.get(category) else {
            warn!(%category, "no category weight computed; records left unchanged");
            continue;
        };
        for rec in records.iter_mut() {
            rec.category = w;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, WeightRecord};

    fn counts() -> CategoryCounts {
        CategoryCounts::from([(Category::new("17_40", 'Z'), 100), (Category::new("17_40", 'T'), 25)])
    }

    #[test]
    fn base_weights_are_reciprocal() {
        let w = category_weights(&counts(), None).unwrap();
        assert_eq!(w[&Category::new("17_40", 'Z')], 0.01);
        assert_eq!(w[&Category::new("17_40", 'T')], 0.04);
    }

    #[test]
    fn ratio_scales_the_reciprocal() {
        let z = Category::new("17_40", 'Z');
        let t = Category::new("17_40", 'T');
        let ratios = CategoryValues::from([(z.clone(), 2.0), (t.clone(), 0.5)]);
        let w = category_weights(&counts(), Some(&ratios)).unwrap();
        assert_eq!(w[&z], 0.02);
        assert_eq!(w[&t], 0.02);
    }

    #[test]
    fn unit_ratios_reproduce_the_reciprocal() {
        let ones: CategoryValues = counts().keys().map(|c| (c.clone(), 1.0)).collect();
        let via_ratio = category_weights(&counts(), Some(&ones)).unwrap();
        assert_eq!(via_ratio, category_weights(&counts(), None).unwrap());
    }

    #[test]
    fn rerun_is_bit_identical() {
        let a = category_weights(&counts(), None).unwrap();
        let b = category_weights(&counts(), None).unwrap();
        for (k, v) in &a {
            assert_eq!(v.to_bits(), b[k].to_bits());
        }
    }

    #[test]
    fn zero_measurements_are_rejected() {
        let mut c = counts();
        c.insert(Category::new("90_250", 'R'), 0);
        let err = category_weights(&c, None).unwrap_err();
        assert!(matches!(err, WeightError::ZeroMeasurementCategory { .. }));
    }

    #[test]
    fn ratio_map_must_cover_and_be_positive() {
        let partial = CategoryValues::from([(Category::new("17_40", 'Z'), 1.0)]);
        assert!(matches!(
            category_weights(&counts(), Some(&partial)),
            Err(WeightError::InvalidCategoryRatio { .. })
        ));

        let mut negative: CategoryValues = counts().keys().map(|c| (c.clone(), 1.0)).collect();
        negative.insert(Category::new("17_40", 'T'), -1.0);
        assert!(category_weights(&counts(), Some(&negative)).is_err());
    }

    #[test]
    fn apply_sets_shared_value() {
        let cat = Category::new("17_40", 'Z');
        let mut set = WeightSet::new();
        set.insert(cat.clone(), vec![WeightRecord::new("A", 1), WeightRecord::new("B", 2)]);
        let w = CategoryValues::from([(cat.clone(), 0.5)]);
        let set = apply_category_weights(set, &w);
        assert!(set.get(&cat).unwrap().iter().all(|r| r.category == 0.5));
    }
}
