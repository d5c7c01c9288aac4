//! Policy enforcement point.

use super::{EvaluationRecord, PolicyDecisionPoint};
use crate::attribute::InformationPoint;
use crate::config::Config;
use crate::core::{EvaluationContext, EvaluationReporter, ResolutionContext, ResolutionStats};
use crate::policy::{Bias, CombiningAlgorithm, Decision, DecisionType, Policy};
use crate::telemetry::Telemetry;
use crate::Result;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The public entry point for policy evaluation.
///
/// Builds a context through its [`PolicyDecisionPoint`], evaluates a policy,
/// and replaces a `NotApplicable` outcome with the bias. Resolution and
/// policy errors are returned to the caller unmodified; they are never turned
/// into a `Deny`.
pub struct PolicyEnforcementPoint {
    bias: Bias,
    pdp: Arc<PolicyDecisionPoint>,
    telemetry: Option<Arc<Telemetry>>,
}

struct Outcome {
    original: Decision,
    decision: Decision,
    elapsed: Duration,
}

impl PolicyEnforcementPoint {
    /// Create an enforcement point builder.
    pub fn builder() -> PolicyEnforcementPointBuilder {
        PolicyEnforcementPointBuilder::new()
    }

    /// Create an enforcement point with the default `bias`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBias`](crate::Error::InvalidBias) if `bias` is
    /// `NotApplicable`.
    pub fn new(bias: DecisionType, pdp: Arc<PolicyDecisionPoint>) -> Result<Self> {
        Ok(Self {
            bias: Bias::try_from(bias)?,
            pdp,
            telemetry: None,
        })
    }

    /// The default bias.
    pub fn bias(&self) -> Bias {
        self.bias
    }

    /// Metrics recorded by this enforcement point, if enabled.
    pub fn telemetry(&self) -> Option<&Arc<Telemetry>> {
        self.telemetry.as_ref()
    }

    /// Build a context from the installed information points and `attributes`.
    pub fn create_evaluation_context(
        &self,
        attributes: impl IntoIterator<Item = InformationPoint>,
    ) -> ResolutionContext {
        self.pdp.create_evaluation_context(attributes)
    }

    /// Evaluate `policy` against a fresh context built from `attributes`.
    ///
    /// `bias` overrides the default bias for this call.
    pub fn evaluate_policy(
        &self,
        bias: Option<Bias>,
        attributes: impl IntoIterator<Item = InformationPoint>,
        policy: &dyn Policy,
    ) -> Result<Decision> {
        self.evaluate_policy_with_report(bias, attributes, policy)
            .map(|(decision, _)| decision)
    }

    /// Like [`evaluate_policy`](Self::evaluate_policy), also returning the trace.
    pub fn evaluate_policy_with_report(
        &self,
        bias: Option<Bias>,
        attributes: impl IntoIterator<Item = InformationPoint>,
        policy: &dyn Policy,
    ) -> Result<(Decision, String)> {
        let mut ctx = self.create_evaluation_context(attributes);
        self.evaluate_policy_with_context_with_report(bias, &mut ctx, policy)
    }

    /// Evaluate `policy` against an existing context.
    ///
    /// Values already cached in `ctx` are reused and the trace is appended to
    /// the context's report.
    pub fn evaluate_policy_with_context(
        &self,
        bias: Option<Bias>,
        ctx: &mut dyn EvaluationContext,
        policy: &dyn Policy,
    ) -> Result<Decision> {
        self.enforce(bias, ctx, policy)
            .map(|outcome| outcome.decision)
    }

    /// Like [`evaluate_policy_with_context`](Self::evaluate_policy_with_context),
    /// also returning the context's full report.
    pub fn evaluate_policy_with_context_with_report(
        &self,
        bias: Option<Bias>,
        ctx: &mut dyn EvaluationContext,
        policy: &dyn Policy,
    ) -> Result<(Decision, String)> {
        let outcome = self.enforce(bias, ctx, policy)?;
        Ok((outcome.decision, ctx.get_report()))
    }

    /// Combine `policies` with `algorithm` and evaluate the result.
    pub fn evaluate_policies(
        &self,
        algorithm: CombiningAlgorithm,
        bias: Option<Bias>,
        attributes: impl IntoIterator<Item = InformationPoint>,
        policies: Vec<Arc<dyn Policy>>,
    ) -> Result<Decision> {
        self.evaluate_policy(bias, attributes, &algorithm.combine(policies))
    }

    /// Like [`evaluate_policies`](Self::evaluate_policies), also returning the trace.
    pub fn evaluate_policies_with_report(
        &self,
        algorithm: CombiningAlgorithm,
        bias: Option<Bias>,
        attributes: impl IntoIterator<Item = InformationPoint>,
        policies: Vec<Arc<dyn Policy>>,
    ) -> Result<(Decision, String)> {
        self.evaluate_policy_with_report(bias, attributes, &algorithm.combine(policies))
    }

    /// Evaluate `policy` and describe the outcome as an [`EvaluationRecord`].
    pub fn evaluate_policy_with_record(
        &self,
        bias: Option<Bias>,
        attributes: impl IntoIterator<Item = InformationPoint>,
        policy: &dyn Policy,
    ) -> Result<EvaluationRecord> {
        let mut ctx = self.create_evaluation_context(attributes);
        let outcome = self.enforce(bias, &mut ctx, policy)?;

        Ok(EvaluationRecord::new(
            policy.key().name(),
            outcome.original,
            outcome.decision,
            ctx.get_report(),
        )
        .with_evaluation_time(outcome.elapsed))
    }

    /// Combine `policies` with `algorithm` and describe the outcome as an
    /// [`EvaluationRecord`].
    pub fn evaluate_policies_with_record(
        &self,
        algorithm: CombiningAlgorithm,
        bias: Option<Bias>,
        attributes: impl IntoIterator<Item = InformationPoint>,
        policies: Vec<Arc<dyn Policy>>,
    ) -> Result<EvaluationRecord> {
        self.evaluate_policy_with_record(bias, attributes, &algorithm.combine(policies))
    }

    fn enforce(
        &self,
        bias: Option<Bias>,
        ctx: &mut dyn EvaluationContext,
        policy: &dyn Policy,
    ) -> Result<Outcome> {
        let name = policy.key().name();
        let bias = bias.unwrap_or(self.bias);
        let stats_before = ctx.stats();
        let start = Instant::now();

        ctx.report(name).indent();
        let result = policy.evaluate(ctx).map(|original| {
            let decision = original.clone().with_bias(bias);
            ctx.report(&format!("Result: {}", decision));
            (original, decision)
        });
        ctx.unindent();

        let elapsed = start.elapsed();
        match result {
            Ok((original, decision)) => {
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                debug!(
                    policy = name,
                    decision = %decision,
                    bias = %bias,
                    bias_applied = original.is_not_applicable(),
                    elapsed_ms,
                    "policy evaluated"
                );
                if let Some(telemetry) = &self.telemetry {
                    let stats = ctx.stats();
                    telemetry.record_evaluation(
                        &original,
                        &decision,
                        elapsed_ms,
                        ResolutionStats {
                            cache_hits: stats.cache_hits.saturating_sub(stats_before.cache_hits),
                            cache_misses: stats
                                .cache_misses
                                .saturating_sub(stats_before.cache_misses),
                        },
                    );
                }
                Ok(Outcome {
                    original,
                    decision,
                    elapsed,
                })
            }
            Err(err) => {
                warn!(
                    policy = name,
                    category = err.category(),
                    error = %err,
                    "policy evaluation failed"
                );
                if let Some(telemetry) = &self.telemetry {
                    telemetry.record_error(&err);
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for PolicyEnforcementPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEnforcementPoint")
            .field("bias", &self.bias)
            .field("pdp", &self.pdp)
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}

/// Builder for [`PolicyEnforcementPoint`].
pub struct PolicyEnforcementPointBuilder {
    config: Config,
    bias: Option<DecisionType>,
    pdp: Option<Arc<PolicyDecisionPoint>>,
    telemetry_enabled: Option<bool>,
}

impl PolicyEnforcementPointBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            bias: None,
            pdp: None,
            telemetry_enabled: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the default bias, overriding the configured one.
    pub fn with_bias(mut self, bias: DecisionType) -> Self {
        self.bias = Some(bias);
        self
    }

    /// Share an existing decision point.
    pub fn with_decision_point(mut self, pdp: Arc<PolicyDecisionPoint>) -> Self {
        self.pdp = Some(pdp);
        self
    }

    /// Enable or disable metrics, overriding the configured setting.
    pub fn with_telemetry_enabled(mut self, enabled: bool) -> Self {
        self.telemetry_enabled = Some(enabled);
        self
    }

    /// Build the enforcement point.
    ///
    /// # Errors
    /// Returns a configuration error if the configuration is invalid or the
    /// bias is `NotApplicable`.
    pub fn build(self) -> Result<PolicyEnforcementPoint> {
        let mut config = self.config;
        if let Some(bias) = self.bias {
            config.engine.default_bias = bias;
        }
        if let Some(enabled) = self.telemetry_enabled {
            config.telemetry.enabled = enabled;
        }

        let bias = config.engine.bias()?;
        config.validate()?;

        let telemetry = if config.telemetry.enabled {
            Some(Arc::new(Telemetry::new(&config.telemetry)?))
        } else {
            None
        };

        Ok(PolicyEnforcementPoint {
            bias,
            pdp: self.pdp.unwrap_or_default(),
            telemetry,
        })
    }
}

impl Default for PolicyEnforcementPointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Key;
    use crate::core::EvaluationContextExt;
    use crate::policy::FnPolicy;
    use crate::Error;

    fn role() -> Key<String> {
        Key::new("role").unwrap()
    }

    fn admin_only() -> FnPolicy<impl Fn(&mut dyn EvaluationContext) -> Result<Decision> + Send + Sync> {
        FnPolicy::new("admin-only", |ctx| {
            Ok(match ctx.get_value(&role())?.as_str() {
                "admin" => Decision::Permit,
                _ => Decision::not_applicable("Not an admin"),
            })
        })
        .unwrap()
    }

    fn with_role(name: &str) -> Vec<InformationPoint> {
        vec![role().with_value(name.to_string()).into()]
    }

    fn pep(bias: DecisionType) -> PolicyEnforcementPoint {
        PolicyEnforcementPoint::new(bias, Arc::new(PolicyDecisionPoint::new())).unwrap()
    }

    #[test]
    fn test_not_applicable_bias_is_rejected() {
        let result = PolicyEnforcementPoint::new(
            DecisionType::NotApplicable,
            Arc::new(PolicyDecisionPoint::new()),
        );
        assert!(matches!(result, Err(Error::InvalidBias)));

        let result = PolicyEnforcementPoint::builder()
            .with_bias(DecisionType::NotApplicable)
            .build();
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_default_and_per_call_bias() {
        let pep = pep(DecisionType::Deny);
        let decision = pep
            .evaluate_policy(None, with_role("guest"), &admin_only())
            .unwrap();
        assert!(decision.is_deny());

        let decision = pep
            .evaluate_policy(Some(Bias::Permit), with_role("guest"), &admin_only())
            .unwrap();
        assert!(decision.is_permit());
    }

    #[test]
    fn test_report_layout() {
        let pep = pep(DecisionType::Deny);

        let (decision, report) = pep
            .evaluate_policy_with_report(None, with_role("admin"), &admin_only())
            .unwrap();

        assert_eq!(decision, Decision::Permit);
        assert_eq!(
            report,
            "admin-only\n\tRequested Key(role), cache-miss: \"admin\"\n\tResult: Permit\n"
        );
    }

    #[test]
    fn test_errors_propagate_unmodified() {
        let pep = pep(DecisionType::Permit);

        let err = pep.evaluate_policy(None, vec![], &admin_only()).unwrap_err();

        assert_eq!(err.to_string(), "Could not find provider for Key(role)");
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_context_is_reused() {
        let pep = pep(DecisionType::Deny);
        let mut ctx = pep.create_evaluation_context(with_role("admin"));

        pep.evaluate_policy_with_context(None, &mut ctx, &admin_only())
            .unwrap();
        let (decision, report) = pep
            .evaluate_policy_with_context_with_report(None, &mut ctx, &admin_only())
            .unwrap();

        assert!(decision.is_permit());
        assert!(report.ends_with("admin-only\n\tRequested Key(role), cache-hit\n\tResult: Permit\n"));
        assert_eq!(ctx.stats().cache_hits, 1);
    }

    #[test]
    fn test_record() {
        let pep = pep(DecisionType::Deny);

        let record = pep
            .evaluate_policy_with_record(None, with_role("guest"), &admin_only())
            .unwrap();

        assert_eq!(record.policy, "admin-only");
        assert!(record.bias_applied);
        assert!(record.original_decision.is_not_applicable());
        assert_eq!(
            record.decision,
            Decision::no_applicable_policy(Bias::Deny)
        );
        assert!(record.report.starts_with("admin-only\n"));
    }

    #[test]
    fn test_builder_records_metrics() {
        let pep = PolicyEnforcementPoint::builder()
            .with_bias(DecisionType::Permit)
            .with_telemetry_enabled(true)
            .build()
            .unwrap();

        pep.evaluate_policy(None, with_role("guest"), &admin_only())
            .unwrap();
        pep.evaluate_policy(None, vec![], &admin_only())
            .unwrap_err();

        let metrics = pep.telemetry().unwrap().metrics();
        assert_eq!(pep.bias(), Bias::Permit);
        assert_eq!(metrics.permits, 1);
        assert_eq!(metrics.bias_applied, 1);
        assert_eq!(metrics.attribute_cache_misses, 1);
        assert_eq!(metrics.errors_by_category["missing_information_point"], 1);
    }

    #[test]
    fn test_builder_without_telemetry() {
        let pdp = Arc::new(PolicyDecisionPoint::new());
        let pep = PolicyEnforcementPoint::builder()
            .with_decision_point(Arc::clone(&pdp))
            .with_telemetry_enabled(false)
            .build()
            .unwrap();

        pdp.install(role().with_value("admin".into()));

        assert!(pep.telemetry().is_none());
        assert_eq!(pep.bias(), Bias::Deny);
        assert!(pep
            .evaluate_policy(None, vec![], &admin_only())
            .unwrap()
            .is_permit());
    }
}
