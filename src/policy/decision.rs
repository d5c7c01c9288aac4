//! Decision types for policy evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable code of the deny produced when no policy applies.
pub const NO_APPLICABLE_POLICY_FOUND: &str = "NO_APPLICABLE_POLICY_FOUND";

/// Message of the deny produced when no policy applies.
pub const NO_APPLICABLE_POLICY_MESSAGE: &str = "No applicable policy found";

/// The outcome of evaluating a policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// The request is allowed
    Permit,
    /// The request is denied
    Deny {
        /// Human-readable reason
        message: String,
        /// Machine-readable reason code
        code: String,
    },
    /// The policy has no opinion about the request
    NotApplicable {
        /// Human-readable reason
        message: String,
    },
}

impl Decision {
    /// Create a permit decision.
    pub fn permit() -> Self {
        Decision::Permit
    }

    /// Create a deny decision.
    pub fn deny(message: impl Into<String>, code: impl Into<String>) -> Self {
        Decision::Deny {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Create a not-applicable decision.
    pub fn not_applicable(message: impl Into<String>) -> Self {
        Decision::NotApplicable {
            message: message.into(),
        }
    }

    /// The decision substituted for a `NotApplicable` outcome under `bias`.
    pub fn no_applicable_policy(bias: Bias) -> Self {
        match bias {
            Bias::Permit => Decision::Permit,
            Bias::Deny => Decision::deny(NO_APPLICABLE_POLICY_MESSAGE, NO_APPLICABLE_POLICY_FOUND),
        }
    }

    /// Replace a `NotApplicable` outcome with the decision implied by `bias`.
    ///
    /// `Permit` and `Deny` are returned unchanged.
    pub fn with_bias(self, bias: Bias) -> Self {
        match self {
            Decision::NotApplicable { .. } => Decision::no_applicable_policy(bias),
            decided => decided,
        }
    }

    /// The kind of this decision.
    pub fn decision_type(&self) -> DecisionType {
        match self {
            Decision::Permit => DecisionType::Permit,
            Decision::Deny { .. } => DecisionType::Deny,
            Decision::NotApplicable { .. } => DecisionType::NotApplicable,
        }
    }

    /// The decision's message, if it carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Decision::Permit => None,
            Decision::Deny { message, .. } | Decision::NotApplicable { message } => Some(message),
        }
    }

    /// Check if this decision allows the request.
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }

    /// Check if this decision denies the request.
    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny { .. })
    }

    /// Check if this decision is inconclusive.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Decision::NotApplicable { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Permit => write!(f, "Permit"),
            Decision::Deny { message, code } => {
                write!(f, "Deny(message={}, code={})", message, code)
            }
            Decision::NotApplicable { message } => write!(f, "NotApplicable(message={})", message),
        }
    }
}

/// The kind of a [`Decision`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// Permit
    Permit,
    /// Deny
    Deny,
    /// Not applicable
    NotApplicable,
}

impl DecisionType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Permit => "permit",
            DecisionType::Deny => "deny",
            DecisionType::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DecisionType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "permit" => Ok(DecisionType::Permit),
            "deny" => Ok(DecisionType::Deny),
            "not_applicable" => Ok(DecisionType::NotApplicable),
            _ => Err(crate::Error::parse(format!("Unknown decision type: {}", s))),
        }
    }
}

/// The decision substituted for an inconclusive outcome.
///
/// Only `Permit` and `Deny` are valid biases; converting
/// [`DecisionType::NotApplicable`] fails with [`Error::InvalidBias`](crate::Error::InvalidBias).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    /// Treat inconclusive outcomes as permit
    Permit,
    /// Treat inconclusive outcomes as deny
    #[default]
    Deny,
}

impl TryFrom<DecisionType> for Bias {
    type Error = crate::Error;

    fn try_from(value: DecisionType) -> Result<Self, Self::Error> {
        match value {
            DecisionType::Permit => Ok(Bias::Permit),
            DecisionType::Deny => Ok(Bias::Deny),
            DecisionType::NotApplicable => Err(crate::Error::InvalidBias),
        }
    }
}

impl From<Bias> for DecisionType {
    fn from(bias: Bias) -> Self {
        match bias {
            Bias::Permit => DecisionType::Permit,
            Bias::Deny => DecisionType::Deny,
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DecisionType::from(*self))
    }
}
