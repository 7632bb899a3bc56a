//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr so stdout stays reserved for reports. Filtering
//! follows `WW_LOG` (an `EnvFilter` directive such as `window_weights=debug`)
//! and defaults to `info`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WW_LOG";

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
