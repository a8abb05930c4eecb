use tracing_subscriber::EnvFilter;

use crate::cli::ColorMode;

pub(crate) const FILTER_ENV: &str = "SWITCHBOARD_LOG";
pub(crate) const DEFAULT_FILTER: &str = "warn";

/// `SWITCHBOARD_LOG` wins over the configured filter. An unparseable
/// configured filter falls back to the default.
fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| configured_filter(configured))
}

fn configured_filter(configured: Option<&str>) -> EnvFilter {
    configured
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Logs go to stderr so that table and JSON
/// output on stdout stay clean.
pub(crate) fn init(configured: Option<&str>, color: ColorMode) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .with_ansi(matches!(color, ColorMode::On))
        .with_target(false)
        .try_init();

    if let Err(err) = result {
        crate::warn!("failed to initialize logging: {}", err);
    }
}
