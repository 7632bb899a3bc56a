//! File layout of a weighting run.
//!
//! ```text
//! {data_dir}/stations/{event}.stations.json
//! {data_dir}/windows/{event}.{period}.windows.json
//! {output_dir}/{event}.{period}/weight.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::DataLayout;
use crate::error::AppError;

/// Input and output files of one period band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodPaths {
    pub station_file: PathBuf,
    pub window_file: PathBuf,
    pub output_file: PathBuf,
}

/// Resolve the per-period file paths for a layout.
pub fn period_paths(layout: &DataLayout) -> BTreeMap<String, PeriodPaths> {
    let station_file = layout
        .data_dir
        .join("stations")
        .join(format!("{}.stations.json", layout.event));

    layout
        .periods
        .iter()
        .map(|period| {
            let paths = PeriodPaths {
                station_file: station_file.clone(),
                window_file: layout
                    .data_dir
                    .join("windows")
                    .join(format!("{}.{}.windows.json", layout.event, period)),
                output_file: layout
                    .output_dir
                    .join(format!("{}.{}", layout.event, period))
                    .join("weight.json"),
            };
            (period.clone(), paths)
        })
        .collect()
}

/// Fail early when an input file is missing.
pub fn assert_file_exists(path: &Path) -> Result<(), AppError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AppError::new(2, format!("Missing file: {}", path.display())))
    }
}

/// Check every input of every period before any work starts.
pub fn assert_inputs_exist(paths: &BTreeMap<String, PeriodPaths>) -> Result<(), AppError> {
    for p in paths.values() {
        assert_file_exists(&p.station_file)?;
        assert_file_exists(&p.window_file)?;
    }
    Ok(())
}
