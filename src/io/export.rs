//! Export final weights to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON weight files remain the authoritative output.

use std::path::Path;

use crate::domain::WeightSet;
use crate::error::AppError;

/// Write one row per station.
pub fn write_weights_csv(path: &Path, weights: &WeightSet) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record([
            "period",
            "component",
            "station",
            "n_measurements",
            "receiver",
            "category",
            "weight",
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (category, records) in weights.iter() {
        for r in records {
            writer
                .write_record([
                    category.period.clone(),
                    category.component.to_string(),
                    r.station.clone(),
                    r.n_measurements.to_string(),
                    format!("{:.10}", r.receiver),
                    format!("{:.10}", r.category),
                    r.weight.map(|w| format!("{w:.12e}")).unwrap_or_default(),
                ])
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
