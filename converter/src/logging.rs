//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: job failures, report-write failures, watcher faults
//! - `warn`: skipped files
//! - `info`: files picked up, per-job summary counts
//! - `debug`: header binding details
//!
//! `RUST_LOG` overrides the level chosen on the command line.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-field lines with the job span.
    #[default]
    Full,
    /// Single-line format.
    Compact,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Map `-v`/`-q` counts onto a level, starting from `info`.
    pub fn from_verbosity(verbose: u8, quiet: u8) -> Self {
        let level = match i16::from(verbose) - i16::from(quiet) {
            i16::MIN..=-2 => Level::ERROR,
            -1 => Level::WARN,
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config.level);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false);

    match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init(),
        LogFormat::Full => tracing_subscriber::registry().with(filter).with(layer).init(),
    }
}

/// Route log output through the test harness so it shows up next to a
/// failing test. Safe to call from every test.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::new("fileconverter=debug"))
            .try_init();
    });
}

/// Build an `EnvFilter` from `level`, letting `RUST_LOG` take precedence.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,fileconverter={level}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(LogConfig::from_verbosity(0, 0).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(1, 0).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(5, 0).level, Level::TRACE);
        assert_eq!(LogConfig::from_verbosity(0, 1).level, Level::WARN);
        assert_eq!(LogConfig::from_verbosity(0, 3).level, Level::ERROR);
        assert_eq!(LogConfig::from_verbosity(2, 2).level, Level::INFO);
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = LogConfig::from_verbosity(1, 0)
            .with_format(LogFormat::Compact)
            .with_ansi(false);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.with_ansi);
        assert_eq!(LogConfig::default().format, LogFormat::Full);
    }
}
