//! Process-wide logging setup.
//!
//! Call [`init`] once from `main`. Nothing in the library installs a
//! subscriber on its own.

use clap::ValueEnum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level for this crate, e.g. `info` or `debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Filter directives: `RUST_LOG` wins when set, otherwise the crate runs
    /// at the configured level and dependencies at `warn`.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("autopost={},warn", self.level)))
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = config.filter();
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
        };
        // Another test may already have installed a subscriber, so only the
        // second call is asserted.
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
