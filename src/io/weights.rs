//! Per-period weight files.
//!
//! Each period band gets one JSON object keyed by `NET.STA.CHAN`:
//!
//! ```json
//! { "IU.ANMO.BHZ": { "weight": 0.0012, "n_measurements": 3, "receiver": 0.8, "category": 1.1 } }
//! ```
//!
//! Keys are written sorted. All files are serialized and staged before the
//! first one replaces its target, so a failure never leaves a partial set
//! behind.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all, remove_file, rename};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::{WeightRecord, WeightSet};
use crate::error::AppError;
use crate::io::paths::PeriodPaths;

/// Records of one period, keyed by station.
pub type PeriodWeights = BTreeMap<String, WeightRecord>;

/// Regroup a weight set by period band.
pub fn group_by_period(weights: &WeightSet) -> BTreeMap<String, PeriodWeights> {
    let mut out: BTreeMap<String, PeriodWeights> = BTreeMap::new();
    for (category, records) in weights.iter() {
        let period = out.entry(category.period.clone()).or_default();
        for rec in records {
            period.insert(rec.station.clone(), rec.clone());
        }
    }
    out
}

/// Write one weight file per configured period.
///
/// A period without records gets an empty object so a file left over from an
/// earlier run never survives. Every file is staged next to its target and
/// only renamed into place once all of them were written.
pub fn write_weight_files(paths: &BTreeMap<String, PeriodPaths>, weights: &WeightSet) -> Result<Vec<PathBuf>, AppError> {
    let mut grouped = group_by_period(weights);
    if let Some(period) = grouped.keys().find(|p| !paths.contains_key(*p)) {
        return Err(AppError::new(4, format!("No output path configured for period {period}.")));
    }

    let mut rendered = Vec::with_capacity(paths.len());
    for (period, target) in paths {
        let records = grouped.remove(period).unwrap_or_default();
        if records.is_empty() {
            warn!(period = %period, "no weighted stations; writing empty weight file");
        }
        let body = serde_json::to_string_pretty(&records)
            .map_err(|e| AppError::new(4, format!("Failed to serialize weights for {period}: {e}")))?;
        rendered.push((target.output_file.clone(), body));
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(rendered.len());
    for (path, body) in rendered {
        match stage_file(&path, &body) {
            Ok(tmp) => staged.push((tmp, path)),
            Err(e) => {
                discard_staged(&staged);
                return Err(e);
            }
        }
    }

    let mut written = Vec::with_capacity(staged.len());
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = rename(tmp, path) {
            discard_staged(&staged[i..]);
            return Err(AppError::new(2, format!("Failed to write weight file '{}': {e}", path.display())));
        }
        info!(path = %path.display(), "wrote weight file");
        written.push(path.clone());
    }
    Ok(written)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn stage_file(path: &Path, body: &str) -> Result<PathBuf, AppError> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", dir.display())))?;
    }
    let tmp = staging_path(path);
    std::fs::write(&tmp, body)
        .map_err(|e| AppError::new(2, format!("Failed to write weight file '{}': {e}", tmp.display())))?;
    Ok(tmp)
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = remove_file(tmp) {
            warn!(path = %tmp.display(), error = %e, "failed to remove staged weight file");
        }
    }
}

/// Read a weight file; each record's `station` is restored from its key.
pub fn read_weight_file(path: &Path) -> Result<PeriodWeights, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open weight file '{}': {e}", path.display())))?;
    let mut records: PeriodWeights = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid weight file '{}': {e}", path.display())))?;
    for (key, rec) in records.iter_mut() {
        rec.station = key.clone();
    }
    Ok(records)
}
