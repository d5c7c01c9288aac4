//! # ABAC Policy Engine
//!
//! Attribute-based policy evaluation with lazily resolved attributes. Policies
//! ask an evaluation context for the attributes they need; the context runs
//! the registered information point for each attribute at most once per
//! evaluation, detects dependency cycles between attributes, and records a
//! human-readable trace of the evaluation.
//!
//! ## Features
//!
//! - **Typed attributes**: keys carry the value type and retrieval is type-checked
//! - **Lazy resolution**: information points may depend on other attributes
//! - **Cycle detection**: cyclic attribute dependencies fail with the full path
//! - **Combining algorithms**: permit-override, deny-override, first-applicable
//! - **Bias**: inconclusive outcomes are resolved to permit or deny
//! - **Audit trail**: every evaluation produces a trace and an optional record
//!
//! ## Quick Start
//!
//! ```rust
//! use abac_policy_engine::{
//!     Decision, DecisionType, EvaluationContextExt, FnPolicy, Key, PolicyDecisionPoint,
//!     PolicyEnforcementPoint,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> abac_policy_engine::Result<()> {
//!     let role: Key<String> = Key::new("role")?;
//!
//!     let pdp = Arc::new(PolicyDecisionPoint::new());
//!     let pep = PolicyEnforcementPoint::new(DecisionType::Deny, pdp)?;
//!
//!     let policy = FnPolicy::new("admin-only", move |ctx| {
//!         Ok(match ctx.get_value(&role)?.as_str() {
//!             "admin" => Decision::Permit,
//!             _ => Decision::not_applicable("Not an admin"),
//!         })
//!     })?;
//!
//!     let role: Key<String> = Key::new("role")?;
//!     let decision = pep.evaluate_policy(None, vec![role.with_value("guest".into()).into()], &policy)?;
//!     assert!(decision.is_deny());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod attribute;
pub mod config;
pub mod core;
pub mod error;
pub mod policy;
pub mod telemetry;

// Re-export main types for convenience
pub use crate::api::{
    EvaluationRecord, PolicyDecisionPoint, PolicyEnforcementPoint, PolicyEnforcementPointBuilder,
};
pub use crate::attribute::{
    AttributeType, AttributeValue, FnInformationPoint, InformationPoint, Key,
    PolicyInformationPoint,
};
pub use crate::config::Config;
pub use crate::core::{EvaluationContext, EvaluationContextExt, EvaluationReporter, ResolutionContext};
pub use crate::error::{Error, Result};
pub use crate::policy::{
    Bias, CombinedPolicy, CombiningAlgorithm, Decision, DecisionType, FnPolicy, Policy, PolicyKey,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
