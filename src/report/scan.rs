//! Markdown report of the reference-distance scans behind each category's
//! receiver weights.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::domain::RunConfig;
use crate::error::AppError;
use crate::weights::WeightRun;

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(2, format!("Failed to write scan report: {e}"))
}

pub fn write_scan_report(path: &Path, run: &WeightRun, config: &RunConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create report dir {}: {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create scan report {}: {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# ww scan report").map_err(write_err)?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339()).map_err(write_err)?;
    writeln!(out, "- event: {}", config.layout.event).map_err(write_err)?;
    writeln!(out, "- mode: {}", run.mode.label()).map_err(write_err)?;
    writeln!(out, "- decluster: {:?}", config.decluster).map_err(write_err)?;
    writeln!(
        out,
        "- scan: start={:.2}, gap={:.2}, max_ratio={:.2}, drop_ratio={:.2}, max_distance={:.1}",
        config.scan.start, config.scan.gap, config.scan.max_ratio, config.scan.drop_ratio, config.scan.max_distance
    )
    .map_err(write_err)?;
    writeln!(
        out,
        "- center: ({:.4}, {:.4})",
        config.center.latitude, config.center.longitude
    )
    .map_err(write_err)?;

    for (category, diag) in &run.diagnostics {
        writeln!(out, "\n## Category: {category}").map_err(write_err)?;
        let selected = diag
            .ref_distance
            .map(|d| format!("{d:.2}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "Stations: {} | selected ref_distance: {} | cond_number: {:.4}",
            diag.n_stations, selected, diag.cond_number
        )
        .map_err(write_err)?;

        if diag.scan.is_empty() {
            writeln!(out, "No scan (uniform receiver weights).").map_err(write_err)?;
            continue;
        }

        writeln!(out, "\n| ref_distance | cond_number | selected |").map_err(write_err)?;
        writeln!(out, "| - | - | - |").map_err(write_err)?;
        for step in &diag.scan {
            let mark = if diag.ref_distance == Some(step.ref_distance) { "*" } else { "" };
            writeln!(out, "| {:.2} | {:.4} | {} |", step.ref_distance, step.cond_number, mark)
                .map_err(write_err)?;
        }
    }

    out.flush().map_err(write_err)?;
    Ok(())
}
