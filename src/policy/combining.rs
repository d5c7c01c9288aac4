//! Policy-combining algorithms.

use super::{evaluate_traced, Decision, Policy, PolicyKey};
use crate::attribute::Key;
use crate::core::EvaluationContext;
use crate::Result;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Strategy for reducing several sub-decisions into one.
///
/// | algorithm | result |
/// |---|---|
/// | `PermitOverride` | any `Permit` wins, else the first `Deny`, else `NotApplicable` |
/// | `DenyOverride` | the first `Deny` wins, else `Permit` if any, else `NotApplicable` |
/// | `FirstApplicable` | the first decision that is not `NotApplicable` |
///
/// The override algorithms evaluate every policy; `FirstApplicable` stops at
/// the first conclusive one. An empty list is `NotApplicable` for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningAlgorithm {
    /// Permit takes precedence over deny
    PermitOverride,
    /// Deny takes precedence over permit
    DenyOverride,
    /// The first conclusive decision is used
    FirstApplicable,
}

impl CombiningAlgorithm {
    /// Combine `policies` into a single policy that applies this algorithm.
    pub fn combine(self, policies: Vec<Arc<dyn Policy>>) -> CombinedPolicy {
        CombinedPolicy {
            key: Key::from_static(self.as_str()),
            algorithm: self,
            policies,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CombiningAlgorithm::PermitOverride => "permit-override",
            CombiningAlgorithm::DenyOverride => "deny-override",
            CombiningAlgorithm::FirstApplicable => "first-applicable",
        }
    }
}

impl fmt::Display for CombiningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CombiningAlgorithm {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "permit-override" => Ok(CombiningAlgorithm::PermitOverride),
            "deny-override" => Ok(CombiningAlgorithm::DenyOverride),
            "first-applicable" => Ok(CombiningAlgorithm::FirstApplicable),
            _ => Err(crate::Error::parse(format!(
                "Unknown combining algorithm: {}",
                s
            ))),
        }
    }
}

/// The synthetic policy produced by [`CombiningAlgorithm::combine`].
pub struct CombinedPolicy {
    key: PolicyKey,
    algorithm: CombiningAlgorithm,
    policies: Vec<Arc<dyn Policy>>,
}

impl CombinedPolicy {
    /// The algorithm applied by this policy.
    pub fn algorithm(&self) -> CombiningAlgorithm {
        self.algorithm
    }

    /// Number of combined policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policies are combined.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn permit_override(&self, ctx: &mut dyn EvaluationContext) -> Result<Decision> {
        let mut permitted = false;
        let mut first_deny = None;

        for policy in &self.policies {
            match evaluate_traced(policy.as_ref(), ctx)? {
                Decision::Permit => permitted = true,
                deny @ Decision::Deny { .. } => {
                    first_deny.get_or_insert(deny);
                }
                Decision::NotApplicable { .. } => {}
            }
        }

        Ok(if permitted {
            Decision::Permit
        } else {
            first_deny.unwrap_or_else(|| not_applicable(self.algorithm))
        })
    }

    fn deny_override(&self, ctx: &mut dyn EvaluationContext) -> Result<Decision> {
        let mut permitted = false;
        let mut first_deny = None;

        for policy in &self.policies {
            match evaluate_traced(policy.as_ref(), ctx)? {
                Decision::Permit => permitted = true,
                deny @ Decision::Deny { .. } => {
                    first_deny.get_or_insert(deny);
                }
                Decision::NotApplicable { .. } => {}
            }
        }

        Ok(match first_deny {
            Some(deny) => deny,
            None if permitted => Decision::Permit,
            None => not_applicable(self.algorithm),
        })
    }

    fn first_applicable(&self, ctx: &mut dyn EvaluationContext) -> Result<Decision> {
        for policy in &self.policies {
            let decision = evaluate_traced(policy.as_ref(), ctx)?;
            if !decision.is_not_applicable() {
                return Ok(decision);
            }
        }
        Ok(not_applicable(self.algorithm))
    }
}

fn not_applicable(algorithm: CombiningAlgorithm) -> Decision {
    Decision::not_applicable(format!("No applicable policy found ({})", algorithm))
}

impl Policy for CombinedPolicy {
    fn key(&self) -> &PolicyKey {
        &self.key
    }

    fn evaluate(&self, ctx: &mut dyn EvaluationContext) -> Result<Decision> {
        match self.algorithm {
            CombiningAlgorithm::PermitOverride => self.permit_override(ctx),
            CombiningAlgorithm::DenyOverride => self.deny_override(ctx),
            CombiningAlgorithm::FirstApplicable => self.first_applicable(ctx),
        }
    }
}

impl fmt::Debug for CombinedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.policies.iter().map(|p| p.key().name()).collect();
        f.debug_struct("CombinedPolicy")
            .field("algorithm", &self.algorithm)
            .field("policies", &names)
            .finish()
    }
}
