//! Tracing subscriber setup.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive for `config`, unless `RUST_LOG` is set.
///
/// A bare level such as `"debug"` applies to this crate only.
fn filter_directive(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let level = config.level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("pubmed_synth={}", level)
        }
    })
}

/// Install the global subscriber, writing to stderr.
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::new(filter_directive(config));

    let (plain, json) = match config.format {
        LogFormat::Plain => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_scopes_bare_levels() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "debug".into(),
            format: LogFormat::Plain,
        };
        assert_eq!(filter_directive(&config), "pubmed_synth=debug");

        let config = LoggingConfig {
            level: "warn,pubmed_synth=trace".into(),
            format: LogFormat::Json,
        };
        assert_eq!(filter_directive(&config), "warn,pubmed_synth=trace");
    }

    #[test]
    fn test_second_init_fails_instead_of_panicking() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
