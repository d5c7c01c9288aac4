//! Public API for the policy engine.
//!
//! This module provides the decision point that owns globally installed
//! information points, the enforcement point that evaluates policies and
//! applies bias, and the audit record describing one enforcement.

mod decision_point;
mod enforcement_point;
mod record;

pub use decision_point::{PolicyDecisionPoint, SharedDecisionPoint};
pub use enforcement_point::{PolicyEnforcementPoint, PolicyEnforcementPointBuilder};
pub use record::EvaluationRecord;
