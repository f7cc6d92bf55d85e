//! Tracing subscriber setup.

use lexicut_error::{ConfigError, LexicutResult};
use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Filter directive (e.g., "info", "lexicut_agent=debug")
    pub log_level: String,
    /// Enable JSON-formatted logs for structured logging
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Level from `RUST_LOG`, `info` when unset.
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
        }
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Force `debug` when `verbose` is set.
    pub fn with_verbose(self, verbose: bool) -> Self {
        if verbose {
            self.with_log_level("debug")
        } else {
            self
        }
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Parsed filter for this configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparsable directive.
    pub fn filter(&self) -> LexicutResult<EnvFilter> {
        EnvFilter::try_new(&self.log_level).map_err(|e| {
            ConfigError::new(format!("Invalid log filter '{}': {}", self.log_level, e)).into()
        })
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Install the global subscriber. Logs go to stderr so streamed agent text
/// on stdout stays clean.
///
/// # Errors
///
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_observability(config: &ObservabilityConfig) -> LexicutResult<()> {
    let env_filter = config.filter()?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)).into())
}
