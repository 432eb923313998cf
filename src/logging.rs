//! Logging setup
//!
//! Installs the global `tracing` subscriber from [`LoggingConfig`].
//! `RUST_LOG`, when set, takes precedence over the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` first, then the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    filter_for(std::env::var("RUST_LOG").ok().as_deref(), config)
}

fn filter_for(rust_log: Option<&str>, config: &LoggingConfig) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(format!("diacheck={}", config.level)).ok())
        .unwrap_or_else(|| EnvFilter::new("diacheck=warn"))
}

/// Initialize logging. Logs go to stderr so stdout stays clean for results.
pub fn init(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: "json".to_string(),
        }
    }

    #[test]
    fn test_filter_uses_configured_level() {
        let filter = filter_for(None, &config("debug"));
        assert_eq!(filter.to_string(), "diacheck=debug");
    }

    #[test]
    fn test_filter_prefers_rust_log() {
        let filter = filter_for(Some("diacheck=trace"), &config("debug"));
        assert_eq!(filter.to_string(), "diacheck=trace");
    }

    #[test]
    fn test_filter_ignores_empty_rust_log() {
        let filter = filter_for(Some("  "), &config("info"));
        assert_eq!(filter.to_string(), "diacheck=info");
    }
}
