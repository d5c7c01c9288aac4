//! Error types for the policy engine.
//!
//! Resolution failures (missing provider, cyclic dependencies) and failures
//! raised by caller-supplied providers or policies are never turned into a
//! [`Decision`](crate::policy::Decision). They travel through every nested
//! `provide` call and reach the caller of the enforcement point unchanged.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the policy engine.
#[derive(Error, Debug)]
pub enum Error {
    /// No information point is registered for a requested attribute
    #[error("Could not find provider for Key({key})")]
    MissingPolicyInformationPoint {
        /// Name of the requested key
        key: String,
    },

    /// An attribute transitively depends on itself
    #[error("Cycle: {}", .path.join(" -> "))]
    CyclicDependencies {
        /// Keys from the first occurrence of the repeated key through the
        /// repeated key again
        path: Vec<String>,
    },

    /// A resolved value does not have the type requested at the call site
    #[error("Attribute Key({key}) does not hold a value of type {expected}")]
    AttributeType {
        /// Name of the requested key
        key: String,
        /// Type requested by the caller
        expected: &'static str,
    },

    /// `NotApplicable` was supplied where a bias is required
    #[error("Bias cannot be 'NOT_APPLICABLE'")]
    InvalidBias,

    /// Two evaluation contexts of different implementations were merged
    #[error("Can not merge evaluation context of different type: {message}")]
    IncompatibleContext {
        /// Detailed error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Detailed error message
        message: String,
        /// Configuration key that caused the error
        key: Option<String>,
    },

    /// Error raised while loading layered configuration
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// Parse error
    #[error("Parse error: {message}")]
    Parse {
        /// Detailed error message
        message: String,
    },

    /// Telemetry/observability error
    #[error("Telemetry error: {message}")]
    Telemetry {
        /// Detailed error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure raised by a caller-supplied information point or policy
    #[error(transparent)]
    Policy(#[from] anyhow::Error),
}

impl Error {
    /// Create a missing information point error.
    pub fn missing_information_point(key: impl Into<String>) -> Self {
        Error::MissingPolicyInformationPoint { key: key.into() }
    }

    /// Create a cyclic dependency error from the offending path.
    pub fn cyclic_dependencies(path: Vec<String>) -> Self {
        Error::CyclicDependencies { path }
    }

    /// Create an attribute type mismatch error.
    pub fn attribute_type(key: impl Into<String>, expected: &'static str) -> Self {
        Error::AttributeType {
            key: key.into(),
            expected,
        }
    }

    /// Create an incompatible context error.
    pub fn incompatible_context(message: impl Into<String>) -> Self {
        Error::IncompatibleContext {
            message: message.into(),
        }
    }

    /// Create a configuration error with key context.
    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Create a telemetry error.
    pub fn telemetry(message: impl Into<String>) -> Self {
        Error::Telemetry {
            message: message.into(),
        }
    }

    /// Wrap a failure raised by caller code (a provider or a policy body).
    pub fn policy<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Policy(anyhow::Error::new(error))
    }

    /// Whether this error was raised while resolving an attribute.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Error::MissingPolicyInformationPoint { .. }
                | Error::CyclicDependencies { .. }
                | Error::AttributeType { .. }
        )
    }

    /// Whether this error is a construction-time configuration failure.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidBias | Error::Config { .. } | Error::ConfigSource(_)
        )
    }

    /// Get the error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::MissingPolicyInformationPoint { .. } => "missing_information_point",
            Error::CyclicDependencies { .. } => "cyclic_dependencies",
            Error::AttributeType { .. } => "attribute_type",
            Error::InvalidBias => "invalid_bias",
            Error::IncompatibleContext { .. } => "incompatible_context",
            Error::Config { .. } | Error::ConfigSource(_) => "config",
            Error::Parse { .. } => "parse",
            Error::Telemetry { .. } => "telemetry",
            Error::Serialization(_) => "serialization",
            Error::Policy(_) => "policy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("Something went wrong")]
    struct ProviderFailure;

    #[test]
    fn test_missing_provider_message() {
        let err = Error::missing_information_point("dummy-provider");
        assert_eq!(err.to_string(), "Could not find provider for Key(dummy-provider)");
        assert_eq!(err.category(), "missing_information_point");
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_cycle_message() {
        let err = Error::cyclic_dependencies(vec!["key1".into(), "key2".into(), "key1".into()]);
        assert_eq!(err.to_string(), "Cycle: key1 -> key2 -> key1");
    }

    #[test]
    fn test_invalid_bias_is_configuration_error() {
        assert!(Error::InvalidBias.is_configuration_error());
        assert!(Error::config_key("bad", "engine.default_bias").is_configuration_error());
        assert!(!Error::InvalidBias.is_resolution_error());
    }

    #[test]
    fn test_policy_error_is_transparent_and_downcastable() {
        let err = Error::policy(ProviderFailure);
        assert_eq!(err.to_string(), "Something went wrong");

        match err {
            Error::Policy(inner) => assert!(inner.downcast_ref::<ProviderFailure>().is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
