//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Build the filter: `RUST_LOG` wins over the configured level.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, failing if one is already set.
pub fn try_setup_logging(
    level: &str,
    format: LogFormat,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = build_filter(level);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    }
}

/// Setup logging with the given level.
pub fn setup_logging(level: &str, format: LogFormat) {
    if let Err(e) = try_setup_logging(level, format) {
        tracing::warn!(error = %e, "Logging already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flag() {
        assert_eq!(LogFormat::from_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_flag(false), LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // Must not panic on garbage directives.
        let _ = build_filter("not==a==level");
    }

    #[test]
    fn test_second_init_fails_quietly() {
        let _ = try_setup_logging("debug", LogFormat::Pretty);
        assert!(try_setup_logging("debug", LogFormat::Json).is_err());
        setup_logging("info", LogFormat::Pretty);
    }
}
