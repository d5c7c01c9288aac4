//! Policies, decisions and combining algorithms.
//!
//! A policy is a named unit that looks at an evaluation context and produces a
//! [`Decision`]. Several policies can be reduced to a single synthetic policy
//! with a [`CombiningAlgorithm`].

mod combining;
mod decision;

pub use combining::{CombinedPolicy, CombiningAlgorithm};
pub use decision::{
    Bias, Decision, DecisionType, NO_APPLICABLE_POLICY_FOUND, NO_APPLICABLE_POLICY_MESSAGE,
};

use crate::attribute::Key;
use crate::core::EvaluationContext;
use crate::Result;

use std::fmt;

/// Key naming a policy.
pub type PolicyKey = Key<dyn Policy>;

/// A unit of authorization logic.
///
/// Policies are stateless. Attributes are requested lazily from the context,
/// and any resolution error is returned as-is rather than folded into a
/// decision.
pub trait Policy: Send + Sync {
    /// The policy's key; its name heads the policy's section of the report.
    fn key(&self) -> &PolicyKey;

    /// Evaluate the policy against `ctx`.
    fn evaluate(&self, ctx: &mut dyn EvaluationContext) -> Result<Decision>;
}

/// A policy backed by a function.
pub struct FnPolicy<F> {
    key: PolicyKey,
    evaluator: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(&mut dyn EvaluationContext) -> Result<Decision> + Send + Sync,
{
    /// Create a policy named `name` that evaluates with `evaluator`.
    ///
    /// # Errors
    /// Returns a configuration error if `name` is empty.
    pub fn new(name: impl Into<String>, evaluator: F) -> Result<Self> {
        Ok(Self::with_key(Key::new(name)?, evaluator))
    }

    /// Create a policy with an existing key.
    pub fn with_key(key: PolicyKey, evaluator: F) -> Self {
        Self { key, evaluator }
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&mut dyn EvaluationContext) -> Result<Decision> + Send + Sync,
{
    fn key(&self) -> &PolicyKey {
        &self.key
    }

    fn evaluate(&self, ctx: &mut dyn EvaluationContext) -> Result<Decision> {
        (self.evaluator)(ctx)
    }
}

impl<F> fmt::Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPolicy").field("key", &self.key).finish()
    }
}

/// Evaluate `policy` inside its own indented section of the report.
pub(crate) fn evaluate_traced(
    policy: &dyn Policy,
    ctx: &mut dyn EvaluationContext,
) -> Result<Decision> {
    ctx.report(policy.key().name()).indent();
    let result = policy.evaluate(ctx);
    if let Ok(decision) = &result {
        ctx.report(&format!("Result: {}", decision));
    }
    ctx.unindent();
    result
}
