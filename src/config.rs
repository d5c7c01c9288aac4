//! Engine configuration.
//!
//! Configuration is layered: built-in defaults, then an optional file, then
//! environment variables prefixed with `POLICY_ENGINE` using `__` to separate
//! nested fields (`POLICY_ENGINE_ENGINE__DEFAULT_BIAS=permit`).

use crate::policy::{Bias, DecisionType};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the environment variables read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "POLICY_ENGINE";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enforcement settings
    pub engine: EngineConfig,
    /// Metrics settings
    pub telemetry: TelemetryConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load defaults overlaid with the environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load defaults overlaid with `path`, then the environment.
    ///
    /// The file format is inferred from the extension (TOML, YAML or JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        Bias::try_from(self.engine.default_bias).map_err(|_| {
            Error::config_key(
                "default bias must be 'permit' or 'deny'",
                "engine.default_bias",
            )
        })?;

        if self.telemetry.service_name.is_empty() {
            return Err(Error::config_key(
                "service name cannot be empty",
                "telemetry.service_name",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_key(
                format!("unknown log level '{}'", self.logging.level),
                "logging.level",
            ));
        }

        Ok(())
    }
}

/// Enforcement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decision substituted for inconclusive outcomes
    pub default_bias: DecisionType,
}

impl EngineConfig {
    /// The configured default bias.
    pub fn bias(&self) -> Result<Bias> {
        Bias::try_from(self.default_bias)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_bias: DecisionType::Deny,
        }
    }
}

/// Metrics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether enforcement points record metrics
    pub enabled: bool,
    /// Service name reported with metrics
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: crate::NAME.to_string(),
        }
    }
}

/// Logging settings used by [`init_logging`](crate::telemetry::init_logging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
