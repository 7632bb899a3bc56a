//! Station coordinate table.
//!
//! The file maps channel ids (`NET.STA.LOC.CHAN`) to metadata; only the
//! coordinates are read, any other fields are ignored.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::SpherePoint;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub latitude: f64,
    pub longitude: f64,
}

impl StationEntry {
    pub fn location(&self) -> SpherePoint {
        SpherePoint::new(self.latitude, self.longitude)
    }
}

/// Coordinates keyed by channel id, sorted so lookups are deterministic.
pub type StationTable = BTreeMap<String, StationEntry>;

pub fn read_station_table(path: &Path) -> Result<StationTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open station file '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid station file '{}': {e}", path.display())))
}
