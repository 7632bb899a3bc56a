//! Shared weighting workflow behind the `calculate` and `analyze` actions.
//!
//! Input checks -> catalog -> receiver/category weights -> normalization ->
//! validation -> weight files. Presentation stays in `app`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::info;

use crate::decluster::build_declusterer;
use crate::domain::{DataLayout, NormalizationMode, RunConfig};
use crate::error::AppError;
use crate::io::{
    PeriodPaths, PeriodWeights, WindowTable, assert_file_exists, assert_inputs_exist, period_paths,
    read_category_ratios, read_station_table, read_weight_file, read_window_table, total_windows,
    write_weight_files,
};
use crate::report::{WeightAnalysis, analysis_source_weight, analyze_weights};
use crate::weights::{PipelineInputs, SingleSource, StationCatalog, WeightRun, compute_weights, validate_sum};

/// All outputs of a single `ww calculate` run.
#[derive(Debug, Clone)]
pub struct CalculateOutput {
    pub run: WeightRun,
    pub paths: BTreeMap<String, PeriodPaths>,
    pub written: Vec<PathBuf>,
}

/// Check inputs, read them and build the station catalog.
pub fn load_catalog(layout: &DataLayout, paths: &BTreeMap<String, PeriodPaths>) -> Result<StationCatalog, AppError> {
    assert_inputs_exist(paths)?;

    // Every period shares the event's station file.
    let Some(first) = paths.values().next() else {
        return Err(AppError::new(2, "No period bands configured."));
    };
    let stations = read_station_table(&first.station_file)?;

    let mut windows: BTreeMap<String, WindowTable> = BTreeMap::new();
    for (period, p) in paths {
        let table = read_window_table(&p.window_file)?;
        info!(period = %period, n_windows = total_windows(&table), "loaded window table");
        windows.insert(period.clone(), table);
    }

    let catalog = StationCatalog::build(&layout.categories(), &stations, &windows)?;
    if catalog.is_empty() {
        return Err(AppError::new(
            3,
            format!("No measurements found for event {}.", layout.event),
        ));
    }
    info!(
        n_categories = catalog.category_count(),
        n_stations = catalog.station_count(),
        "station catalog built"
    );
    Ok(catalog)
}

/// Execute the full `calculate` workflow and write the weight files.
///
/// Nothing is written unless validation passes.
pub fn run_calculate(config: &RunConfig) -> Result<CalculateOutput, AppError> {
    let paths = period_paths(&config.layout);
    let catalog = load_catalog(&config.layout, &paths)?;

    let ratios = match &config.category_ratio {
        Some(path) => Some(read_category_ratios(path)?),
        None => None,
    };

    let declusterer = build_declusterer(config.decluster, config.scan)?;
    let source = SingleSource;
    let inputs = PipelineInputs {
        mode: config.mode,
        declusterer: declusterer.as_ref(),
        center: config.center,
        ratios: ratios.as_ref(),
        source: &source,
        event: &config.layout.event,
    };
    let run = compute_weights(&catalog, &inputs)?;

    let written = write_weight_files(&paths, &run.weights)?;

    Ok(CalculateOutput { run, paths, written })
}

/// Reload the weight files of `layout` keyed by period.
pub fn load_weight_files(layout: &DataLayout) -> Result<BTreeMap<String, PeriodWeights>, AppError> {
    let paths = period_paths(layout);
    for p in paths.values() {
        assert_file_exists(&p.output_file)?;
    }
    paths
        .into_iter()
        .map(|(period, p)| Ok((period, read_weight_file(&p.output_file)?)))
        .collect()
}

/// Execute the `analyze` workflow: weighted sums plus the overall check.
pub fn run_analyze(layout: &DataLayout, mode: NormalizationMode) -> Result<WeightAnalysis, AppError> {
    let files = load_weight_files(layout)?;
    let source_weight = analysis_source_weight(mode, &files);
    let analysis = analyze_weights(&files, source_weight);
    validate_sum(analysis.overall)?;
    Ok(analysis)
}
