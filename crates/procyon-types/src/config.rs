//! Engine configuration types for Procyon.
//!
//! `EngineConfig` represents the top-level `procyon.toml`. Every field has a
//! default so an empty file (or no file) is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Defaults for failed-job retries when an activity configures none.
    #[serde(default)]
    pub job_retry: JobRetryConfig,

    /// Tracing subscriber settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied by the job-retry scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRetryConfig {
    /// Retries granted when a policy does not state a count.
    #[serde(default = "default_retries")]
    pub default_retries: u32,

    /// ISO-8601 delay used when a policy has no intervals (e.g. "PT5M").
    #[serde(default = "default_retry_interval")]
    pub default_retry_interval: String,
}

fn default_retries() -> u32 {
    3
}

fn default_retry_interval() -> String {
    "PT5M".to_string()
}

impl Default for JobRetryConfig {
    fn default() -> Self {
        Self {
            default_retries: default_retries(),
            default_retry_interval: default_retry_interval(),
        }
    }
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Bridge spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            otel: false,
        }
    }
}
