//! Layered configuration for applications that compose plugins with `plinth`.
//!
//! Values are merged by `ortho_config` in increasing precedence: built-in
//! defaults, a TOML configuration file (the file named by `--config-path` or
//! `PLINTH_CONFIG_PATH`, otherwise a discovered `.plinth.toml`), `PLINTH_*`
//! environment variables and finally command-line flags. Load through the
//! derived [`OrthoConfig::load`] or [`OrthoConfig::load_from_iter`].
//!
//! The composition itself is configured per call through `ComposeConfig`;
//! this crate only carries the ambient settings, currently the telemetry
//! filter and output format.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{DEFAULT_LOG_FILTER, default_log_filter_string, default_log_format};
pub use logging::LogFormat;

/// Ambient configuration shared by binaries embedding `plinth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PLINTH")]
pub struct Config {
    /// `tracing` filter directive, for example `info` or `plinth=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for emitted log events.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[test]
    fn default_config_uses_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[rstest]
    #[case::json("json", LogFormat::Json)]
    #[case::compact("compact", LogFormat::Compact)]
    #[case::mixed_case("Compact", LogFormat::Compact)]
    fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
        let parsed = LogFormat::from_str(text).expect("parse log format");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn log_format_rejects_unknown_values() {
        assert!(LogFormat::from_str("yaml").is_err());
    }

    #[test]
    fn log_format_displays_snake_case() {
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
