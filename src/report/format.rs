//! Formatted terminal output.
//!
//! Formatting lives in one place so the weighting code stays free of
//! presentation concerns.

use crate::domain::RunConfig;
use crate::report::WeightAnalysis;
use crate::weights::WeightRun;

/// Format the `calculate` summary: per-category table plus the validated total.
pub fn format_run_summary(run: &WeightRun, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== ww - window weights ===\n");
    out.push_str(&format!("Event: {}\n", config.layout.event));
    out.push_str(&format!("Mode: {}\n", run.mode.label()));
    out.push_str(&format!(
        "Decluster: {:?} | center=({:.3}, {:.3})\n",
        config.decluster, config.center.latitude, config.center.longitude
    ));
    out.push('\n');

    out.push_str(
        format!(
            "{:<10} {:>4} {:>9} {:>8} {:>10} {:>8} {:>14}\n",
            "period", "comp", "stations", "n_meas", "ref_dist", "cond", "category_w"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<4} {:-<9} {:-<8} {:-<10} {:-<8} {:-<14}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (cat, &n) in &run.counts {
        let diag = run.diagnostics.get(cat);
        let n_stations = diag.map(|d| d.n_stations).unwrap_or(0);
        let ref_dist = diag
            .and_then(|d| d.ref_distance)
            .map(|d| format!("{d:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let cond = diag.map(|d| d.cond_number).unwrap_or(f64::NAN);
        let cat_w = run.category_weights.get(cat).copied().unwrap_or(f64::NAN);
        out.push_str(&format!(
            "{:<10} {:>4} {:>9} {:>8} {:>10} {:>8.3} {:>14.6e}\n",
            cat.period, cat.component, n_stations, n, ref_dist, cond, cat_w
        ));
    }

    out.push('\n');
    out.push_str(&format!("Source weight: {:.6e}\n", run.source_weight));
    out.push_str(&format!("Overall weights sum: {:.12}\n", run.overall_sum));
    out
}

/// Format the `analyze` report.
pub fn format_analysis(analysis: &WeightAnalysis) -> String {
    let mut out = String::new();

    out.push_str("The sum of weights for windows in each category:\n");
    for (period, comps) in &analysis.sums {
        let parts: Vec<String> = comps.iter().map(|(c, v)| format!("{c}={v:.6}")).collect();
        out.push_str(&format!("  {:<10} {}\n", period, parts.join("  ")));
    }
    out.push_str(&format!(
        "Stations: {} | measurements: {} | source weight: {:.6e}\n",
        analysis.n_stations, analysis.n_measurements, analysis.source_weight
    ));
    out.push_str(&format!("Overall weights sum: {:.12}\n", analysis.overall));
    out
}
