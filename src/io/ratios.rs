//! Optional category ratio map: `{ period: { component: ratio } }`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::{Category, CategoryValues};
use crate::error::AppError;

pub fn read_category_ratios(path: &Path) -> Result<CategoryValues, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open ratio file '{}': {e}", path.display())))?;
    let raw: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid ratio file '{}': {e}", path.display())))?;
    ratios_from_nested(raw)
}

fn ratios_from_nested(raw: BTreeMap<String, BTreeMap<String, f64>>) -> Result<CategoryValues, AppError> {
    let mut out = CategoryValues::new();
    for (period, comps) in raw {
        for (comp, ratio) in comps {
            let mut chars = comp.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(AppError::new(
                    2,
                    format!("Ratio file: component '{comp}' under period '{period}' must be one character."),
                ));
            };
            out.insert(Category::new(period.clone(), c), ratio);
        }
    }
    Ok(out)
}
