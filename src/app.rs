//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the tracing subscriber
//! - runs the weighting workflow
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{AnalyzeArgs, CalculateArgs, Command, LayoutArgs};
use crate::domain::{DataLayout, RunConfig, ScanParams, SpherePoint};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ww` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    let cli = crate::cli::Cli::parse();
    crate::logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Calculate(args) => handle_calculate(args),
        Command::Analyze(args) => handle_analyze(args),
    }
}

fn handle_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    debug!(?config, "run configuration");
    let output = pipeline::run_calculate(&config)?;

    println!("{}", crate::report::format_run_summary(&output.run, &config));

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_weights_csv(path, &output.run.weights)?;
        info!(path = %path.display(), "exported weights csv");
    }
    if let Some(path) = &config.scan_report {
        crate::report::write_scan_report(path, &output.run, &config)?;
        info!(path = %path.display(), "wrote scan report");
    }

    Ok(())
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let layout = layout_from_args(&args.layout)?;
    let analysis = pipeline::run_analyze(&layout, args.normalization)?;
    println!("{}", crate::report::format_analysis(&analysis));
    Ok(())
}

pub fn layout_from_args(args: &LayoutArgs) -> Result<DataLayout, AppError> {
    let components: Vec<char> = args.components.chars().filter(|c| !c.is_whitespace()).collect();
    if components.is_empty() {
        return Err(AppError::new(2, "At least one component is required."));
    }
    let periods: Vec<String> = args
        .periods
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if periods.is_empty() {
        return Err(AppError::new(2, "At least one period band is required."));
    }

    Ok(DataLayout {
        data_dir: args.data_dir.clone(),
        event: args.event.clone(),
        periods,
        components,
        output_dir: args.output_dir.clone(),
    })
}

pub fn config_from_args(args: &CalculateArgs) -> Result<RunConfig, AppError> {
    let scan = ScanParams {
        max_ratio: args.max_ratio,
        start: args.scan_start,
        gap: args.scan_gap,
        drop_ratio: args.drop_ratio,
        ..ScanParams::default()
    };
    scan.validate()?;

    Ok(RunConfig {
        layout: layout_from_args(&args.layout)?,
        mode: args.normalization,
        decluster: args.decluster,
        scan,
        center: SpherePoint::new(args.center_lat, args.center_lon),
        category_ratio: args.category_ratio.clone(),
        export_csv: args.export_csv.clone(),
        scan_report: args.scan_report.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::NormalizationMode;

    fn calculate(argv: &[&str]) -> CalculateArgs {
        let cli = Cli::parse_from(argv);
        let Command::Calculate(args) = cli.command else {
            panic!("expected calculate");
        };
        args
    }

    #[test]
    fn config_carries_cli_values() {
        let args = calculate(&["ww", "calculate", "simple", "--event", "EV", "--components", "ZT", "--max-ratio", "0.5"]);
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.mode, NormalizationMode::Simple);
        assert_eq!(config.layout.components, vec!['Z', 'T']);
        assert_eq!(config.scan.max_ratio, 0.5);
        assert_eq!(config.scan.max_distance, ScanParams::default().max_distance);
        assert_eq!(config.layout.categories().len(), 6);
    }

    #[test]
    fn rejects_bad_scan_params() {
        let args = calculate(&["ww", "calculate", "--event", "EV", "--scan-gap", "0"]);
        let err = config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_empty_components() {
        let args = calculate(&["ww", "calculate", "--event", "EV", "--components", ""]);
        assert!(config_from_args(&args).is_err());
    }
}
