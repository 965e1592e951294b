//! Tracing subscriber installation for applications embedding `plinth`.
//!
//! The library itself only emits events under the `plinth::compose` and
//! `plinth::server` targets. Installing a subscriber is left to the
//! application, which can use [`initialise`] to do it from a loaded
//! [`Config`].

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use plinth_config::{Config, LogFormat};

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Proof that a global subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Returns the output format of the installed subscriber.
    ///
    /// This is the format of the first successful installation, which later
    /// calls do not change.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directive could not be parsed.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Rejected directive.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the global subscriber on first use.
///
/// Later calls return a handle for the subscriber already installed and
/// ignore `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `log_filter` is not a valid
/// filter directive and [`TelemetryError::Subscriber`] when a subscriber was
/// installed by something other than this function.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config).map(|()| config.log_format()))
        .map(|format| TelemetryHandle { format: *format })
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|error| TelemetryError::Filter {
        filter: directive.to_owned(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let err = parse_filter("plinth=bogus").expect_err("filter should be rejected");
        assert!(
            matches!(&err, TelemetryError::Filter { filter, .. } if filter == "plinth=bogus"),
            "{err}"
        );
    }

    #[test]
    fn repeated_initialisation_keeps_first_format() {
        let first = initialise(&Config::default()).expect("first initialisation");
        let compact = Config {
            log_format: LogFormat::Compact,
            ..Config::default()
        };
        let second = initialise(&compact).expect("second initialisation");
        assert_eq!(first, second);
        assert_eq!(second.format(), LogFormat::Json);
    }
}
