//! Audit records for policy evaluations.

use crate::policy::Decision;
use crate::Result;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// The outcome of one enforcement, suitable for an audit sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique identifier of this evaluation
    pub id: Uuid,
    /// Name of the evaluated policy
    pub policy: String,
    /// The decision after bias
    pub decision: Decision,
    /// The decision returned by the policy, before bias
    pub original_decision: Decision,
    /// Whether the bias replaced an inconclusive outcome
    pub bias_applied: bool,
    /// The evaluation trace
    pub report: String,
    /// When the evaluation finished
    pub evaluated_at: DateTime<Utc>,
    /// Time taken for evaluation in milliseconds
    pub evaluation_time_ms: f64,
}

impl EvaluationRecord {
    /// Create a record for `policy` with a fresh id, stamped now.
    pub fn new(
        policy: impl Into<String>,
        original_decision: Decision,
        decision: Decision,
        report: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            policy: policy.into(),
            bias_applied: original_decision != decision,
            decision,
            original_decision,
            report: report.into(),
            evaluated_at: Utc::now(),
            evaluation_time_ms: 0.0,
        }
    }

    /// Set the evaluation time.
    pub fn with_evaluation_time(mut self, duration: Duration) -> Self {
        self.evaluation_time_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
