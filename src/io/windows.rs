//! Measurement window table.
//!
//! `{ event: { "NET.STA.LOC.CHAN": [window, ...] } }`. Only the number of
//! windows per channel matters for weighting, so window bodies stay opaque.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::error::AppError;

/// Windows keyed by event, then by channel id.
pub type WindowTable = BTreeMap<String, BTreeMap<String, Vec<Value>>>;

pub fn read_window_table(path: &Path) -> Result<WindowTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open window file '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid window file '{}': {e}", path.display())))
}

/// Total number of windows in a table.
pub fn total_windows(table: &WindowTable) -> usize {
    table.values().flat_map(|chans| chans.values()).map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn counts_windows_across_events() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "EV1": {{"IU.ANMO.00.BHZ": [{{"left": 1.0}}, {{"left": 9.0}}], "IU.ANMO.00.BHR": []}},
                "EV2": {{"II.AAK.10.BHT": [{{}}]}}
            }}"#
        )
        .unwrap();

        let table = read_window_table(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["EV1"]["IU.ANMO.00.BHZ"].len(), 2);
        assert_eq!(total_windows(&table), 3);
    }
}
