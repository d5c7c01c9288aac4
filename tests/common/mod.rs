//! Shared helpers for integration tests.

#![allow(dead_code)]

use abac_policy_engine::{
    Decision, EvaluationContext, EvaluationReporter, FnPolicy, InformationPoint, Policy,
    ResolutionContext, Result,
};

/// Name given to policies built with [`test_policy`].
pub const TEST_POLICY: &str = "test-policy";

/// Build a policy named `test-policy` from a closure.
pub fn test_policy<F>(evaluator: F) -> FnPolicy<F>
where
    F: Fn(&mut dyn EvaluationContext) -> Result<Decision> + Send + Sync,
{
    FnPolicy::new(TEST_POLICY, evaluator).expect("valid policy name")
}

/// Evaluates a single policy against ad-hoc attributes and asserts the outcome.
pub struct PolicyTester<'a> {
    policy: &'a dyn Policy,
}

impl<'a> PolicyTester<'a> {
    pub fn new(policy: &'a dyn Policy) -> Self {
        Self { policy }
    }

    pub fn assert_permit(&self, attributes: Vec<InformationPoint>) {
        let decision = self.evaluate(attributes);
        assert_eq!(decision, Decision::Permit, "expected permit, got {}", decision);
    }

    pub fn assert_deny(&self, attributes: Vec<InformationPoint>) -> MessageAsserter {
        let decision = self.evaluate(attributes);
        assert!(decision.is_deny(), "expected deny, got {}", decision);
        MessageAsserter { decision }
    }

    pub fn assert_not_applicable(&self, attributes: Vec<InformationPoint>) -> MessageAsserter {
        let decision = self.evaluate(attributes);
        assert!(
            decision.is_not_applicable(),
            "expected not applicable, got {}",
            decision
        );
        MessageAsserter { decision }
    }

    fn evaluate(&self, attributes: Vec<InformationPoint>) -> Decision {
        let mut ctx = ResolutionContext::new(attributes);
        ctx.report(self.policy.key().name()).indent();
        let result = self.policy.evaluate(&mut ctx);
        ctx.unindent();
        match result {
            Ok(decision) => decision,
            Err(err) => panic!(
                "policy evaluation should not fail: {}\n{}",
                err,
                ctx.get_report()
            ),
        }
    }
}

/// Checks the message of a decision returned by [`PolicyTester`].
pub struct MessageAsserter {
    decision: Decision,
}

impl MessageAsserter {
    pub fn with_message(&self, expected: &str) {
        assert_eq!(self.decision.message(), Some(expected));
    }
}
