//! Command-line parsing for the window weight calculator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! weighting code. Paths that change per machine can also come from the
//! environment (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_COMPONENTS, DeclusterKind, NormalizationMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ww", version, about = "Receiver and category weights for seismic measurement windows")]
pub struct Cli {
    /// Log at debug level (overridden by WW_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute, validate and write weight files.
    Calculate(CalculateArgs),
    /// Reload weight files and report weighted sums per category.
    Analyze(AnalyzeArgs),
}

/// Where inputs live and outputs go.
#[derive(Debug, Args, Clone)]
pub struct LayoutArgs {
    /// Directory holding `stations/` and `windows/`.
    #[arg(long, env = "WW_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Event name used in file names (e.g. C201001122153A).
    #[arg(long, env = "WW_EVENT")]
    pub event: String,

    /// Period bands, comma separated.
    #[arg(long, value_delimiter = ',', default_values_t = default_periods())]
    pub periods: Vec<String>,

    /// Components, one character each.
    #[arg(long, default_value = DEFAULT_COMPONENTS)]
    pub components: String,

    /// Directory receiving `{event}.{period}/weight.json`.
    #[arg(long, env = "WW_OUTPUT_DIR", default_value = "weights")]
    pub output_dir: PathBuf,
}

/// Options for `ww calculate`.
#[derive(Debug, Args, Clone)]
pub struct CalculateArgs {
    /// Normalization mode.
    #[arg(value_enum, default_value_t = NormalizationMode::Complex)]
    pub normalization: NormalizationMode,

    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Declustering algorithm for receiver weights.
    #[arg(long, value_enum, default_value_t = DeclusterKind::Scan)]
    pub decluster: DeclusterKind,

    /// Select the smallest distance reaching this share of the peak condition number.
    #[arg(long, default_value_t = 0.3)]
    pub max_ratio: f64,

    /// First scanned reference distance (degrees).
    #[arg(long, default_value_t = 0.5)]
    pub scan_start: f64,

    /// Step between scanned reference distances (degrees).
    #[arg(long, default_value_t = 0.5)]
    pub scan_gap: f64,

    /// Stop scanning once the condition number drops below this share of the peak.
    #[arg(long, default_value_t = 0.95)]
    pub drop_ratio: f64,

    /// Declustering center latitude (event epicenter; origin when event independent).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub center_lat: f64,

    /// Declustering center longitude.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub center_lon: f64,

    /// JSON `{period: {component: ratio}}` overriding category weights.
    #[arg(long, value_name = "JSON")]
    pub category_ratio: Option<PathBuf>,

    /// Also export the final weights to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Write a markdown report of every reference-distance scan.
    #[arg(long, value_name = "MD")]
    pub scan_report: Option<PathBuf>,
}

/// Options for `ww analyze`.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Mode the weight files were computed with (decides the source scalar).
    #[arg(value_enum, default_value_t = NormalizationMode::Complex)]
    pub normalization: NormalizationMode,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

fn default_periods() -> Vec<String> {
    crate::domain::DEFAULT_PERIODS.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_defaults_to_complex() {
        let cli = Cli::parse_from(["ww", "calculate", "--event", "EV"]);
        let Command::Calculate(args) = cli.command else {
            panic!("expected calculate");
        };
        assert_eq!(args.normalization, NormalizationMode::Complex);
        assert_eq!(args.layout.periods, vec!["17_40", "40_100", "90_250"]);
        assert_eq!(args.max_ratio, 0.3);
    }

    #[test]
    fn parses_mode_and_lists() {
        let cli = Cli::parse_from([
            "ww",
            "calculate",
            "simple_per_cat",
            "--event",
            "EV",
            "--periods",
            "17_40,40_100",
            "--components",
            "ZT",
            "--center-lat",
            "-12.5",
        ]);
        let Command::Calculate(args) = cli.command else {
            panic!("expected calculate");
        };
        assert_eq!(args.normalization, NormalizationMode::SimplePerCat);
        assert_eq!(args.layout.periods.len(), 2);
        assert_eq!(args.layout.components, "ZT");
        assert_eq!(args.center_lat, -12.5);
    }

    #[test]
    fn analyze_accepts_simple() {
        let cli = Cli::parse_from(["ww", "analyze", "simple", "--event", "EV"]);
        assert!(matches!(
            cli.command,
            Command::Analyze(AnalyzeArgs {
                normalization: NormalizationMode::Simple,
                ..
            })
        ));
    }
}
