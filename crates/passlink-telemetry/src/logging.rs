//! Logging configuration and subscriber installation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{TelemetryError, TelemetryResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn init_err<E: std::fmt::Display>(e: E) -> TelemetryError {
    TelemetryError::InitError(e.to_string())
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-readable (default).
    #[default]
    Pretty,
    /// Single line per event.
    Compact,
    /// One JSON object per event.
    Json,
    /// The default `tracing-subscriber` format.
    Full,
}

/// Where log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error (default).
    #[default]
    Stderr,
    /// Daily-rotated files in this directory.
    File(PathBuf),
}

/// Logging configuration, usually the `[logging]` table of the gateway config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Base filter, e.g. `info` or `passlink_gateway=debug,info`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
    /// Output target.
    #[serde(default)]
    pub target: LogTarget,
    /// File name prefix for [`LogTarget::File`].
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Include timestamps.
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Use ANSI colors. Ignored for JSON and file output.
    #[serde(default = "default_true")]
    pub ansi: bool,
    /// Extra filter directives layered over `level`.
    #[serde(default)]
    pub directives: Vec<String>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "passlink".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file_prefix: default_file_prefix(),
            timestamps: true,
            ansi: true,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Create a config with the given base level.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Set the line format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Add a filter directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Disable timestamps.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    fn build_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| TelemetryError::ConfigError(e.to_string()))?;
        for directive in &self.directives {
            let parsed = directive
                .parse()
                .map_err(|e: tracing_subscriber::filter::ParseError| {
                    TelemetryError::ConfigError(format!("{directive}: {e}"))
                })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }

    fn build_layer<W>(&self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let base = fmt::layer().with_writer(writer).with_ansi(ansi);
        match (self.format, self.timestamps) {
            (LogFormat::Pretty, true) => base.pretty().boxed(),
            (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
            (LogFormat::Compact, true) => base.compact().boxed(),
            (LogFormat::Compact, false) => base.compact().without_time().boxed(),
            (LogFormat::Json, true) => base.json().boxed(),
            (LogFormat::Json, false) => base.json().without_time().boxed(),
            (LogFormat::Full, true) => base.boxed(),
            (LogFormat::Full, false) => base.without_time().boxed(),
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` is not consulted; use `level` and `directives` instead.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] for an invalid filter,
/// [`TelemetryError::IoError`] if the log directory cannot be created, or
/// [`TelemetryError::InitError`] if a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.build_filter()?;
    let colored = config.ansi && config.format != LogFormat::Json;

    let layer = match &config.target {
        LogTarget::Stdout => config.build_layer(std::io::stdout, colored),
        LogTarget::Stderr => config.build_layer(std::io::stderr, colored),
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            config.build_layer(appender, false)
        },
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(init_err)
}

/// Install the default subscriber (info, stderr, pretty).
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.target, LogTarget::Stderr);
        assert_eq!(config.file_prefix, "passlink");
        assert!(config.timestamps);
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::new("debug")
            .with_format(LogFormat::Json)
            .with_target(LogTarget::Stdout)
            .with_directive("passlink_gateway=trace")
            .without_timestamps();

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.target, LogTarget::Stdout);
        assert_eq!(config.directives, vec!["passlink_gateway=trace"]);
        assert!(!config.timestamps);
    }

    #[test]
    fn test_toml_table() {
        let config: LogConfig = toml::from_str(
            r#"
            level = "warn"
            format = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.ansi);

        let empty: LogConfig = toml::from_str("").unwrap();
        assert_eq!(empty, LogConfig::default());
    }

    #[test]
    fn test_file_target_json() {
        let config: LogConfig =
            serde_json::from_str(r#"{"target":{"file":"/var/log/passlink"}}"#).unwrap();
        assert_eq!(
            config.target,
            LogTarget::File(PathBuf::from("/var/log/passlink"))
        );
    }

    #[test]
    fn test_filter_validation() {
        assert!(
            LogConfig::new("debug")
                .with_directive("passlink=trace")
                .build_filter()
                .is_ok()
        );
        assert!(
            LogConfig::new("debug")
                .with_directive("[bad=syntax")
                .build_filter()
                .is_err()
        );
    }
}
