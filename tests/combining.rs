//! Decision tables for the policy-combining algorithms.

use abac_policy_engine::policy::NO_APPLICABLE_POLICY_FOUND;
use abac_policy_engine::{
    CombiningAlgorithm, Decision, DecisionType, FnPolicy, Policy, PolicyDecisionPoint,
    PolicyEnforcementPoint, ResolutionContext,
};
use std::sync::Arc;

use CombiningAlgorithm::{DenyOverride, FirstApplicable, PermitOverride};
use DecisionType::{Deny, NotApplicable, Permit};

fn policy(decision_type: DecisionType) -> Arc<dyn Policy> {
    let decision = match decision_type {
        Permit => Decision::Permit,
        Deny => Decision::deny("Deny", NO_APPLICABLE_POLICY_FOUND),
        NotApplicable => Decision::not_applicable("No applicable"),
    };
    Arc::new(FnPolicy::new(decision_type.as_str(), move |_ctx| Ok(decision.clone())).unwrap())
}

fn combine(algorithm: CombiningAlgorithm, policies: &[DecisionType]) -> DecisionType {
    let policies = policies.iter().copied().map(policy).collect();
    let mut ctx = ResolutionContext::new(vec![]);
    algorithm
        .combine(policies)
        .evaluate(&mut ctx)
        .unwrap()
        .decision_type()
}

/// (policies, permit-override, deny-override, first-applicable)
const TABLE: &[(&[DecisionType], DecisionType, DecisionType, DecisionType)] = &[
    (&[Permit], Permit, Permit, Permit),
    (&[Deny], Deny, Deny, Deny),
    (&[NotApplicable], NotApplicable, NotApplicable, NotApplicable),
    (&[Permit, Permit], Permit, Permit, Permit),
    (&[Permit, Deny], Permit, Deny, Permit),
    (&[Deny, Permit], Permit, Deny, Deny),
    (&[Permit, NotApplicable], Permit, Permit, Permit),
    (&[NotApplicable, Permit], Permit, Permit, Permit),
    (&[NotApplicable, Deny], Deny, Deny, Deny),
    (&[Deny, NotApplicable], Deny, Deny, Deny),
    (&[Deny, Deny], Deny, Deny, Deny),
    (&[NotApplicable, NotApplicable], NotApplicable, NotApplicable, NotApplicable),
];

#[test]
fn test_decision_table() {
    for (policies, permit_override, deny_override, first_applicable) in TABLE {
        assert_eq!(
            combine(PermitOverride, policies),
            *permit_override,
            "permit-override {:?}",
            policies
        );
        assert_eq!(
            combine(DenyOverride, policies),
            *deny_override,
            "deny-override {:?}",
            policies
        );
        assert_eq!(
            combine(FirstApplicable, policies),
            *first_applicable,
            "first-applicable {:?}",
            policies
        );
    }
}

#[test]
fn test_not_applicable_message_names_algorithm() {
    let mut ctx = ResolutionContext::new(vec![]);

    let decision = FirstApplicable
        .combine(vec![policy(NotApplicable)])
        .evaluate(&mut ctx)
        .unwrap();

    assert_eq!(
        decision,
        Decision::not_applicable("No applicable policy found (first-applicable)")
    );
}

#[test]
fn test_evaluate_policies_traces_each_policy() {
    let pep = PolicyEnforcementPoint::new(Deny, Arc::new(PolicyDecisionPoint::new())).unwrap();

    let (decision, report) = pep
        .evaluate_policies_with_report(
            DenyOverride,
            None,
            vec![],
            vec![policy(Permit), policy(NotApplicable)],
        )
        .unwrap();

    assert_eq!(decision, Decision::Permit);
    assert_eq!(
        report,
        "deny-override\n\
         \tpermit\n\
         \t\tResult: Permit\n\
         \tnot_applicable\n\
         \t\tResult: NotApplicable(message=No applicable)\n\
         \tResult: Permit\n"
    );
}

#[test]
fn test_evaluate_policies_applies_bias() {
    let pep = PolicyEnforcementPoint::new(Permit, Arc::new(PolicyDecisionPoint::new())).unwrap();

    let decision = pep
        .evaluate_policies(
            PermitOverride,
            None,
            vec![],
            vec![policy(NotApplicable), policy(NotApplicable)],
        )
        .unwrap();
    assert_eq!(decision, Decision::Permit);

    let record = pep
        .evaluate_policies_with_record(FirstApplicable, None, vec![], vec![])
        .unwrap();
    assert_eq!(record.policy, "first-applicable");
    assert!(record.bias_applied);
}
