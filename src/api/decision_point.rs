//! Policy decision point.

use crate::attribute::{AttributeType, InformationPoint, PolicyInformationPoint};
use crate::core::ResolutionContext;

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::debug;

/// Registry of globally installed information points.
///
/// The registry is an immutable snapshot swapped atomically on every
/// [`install`](Self::install), so evaluations running concurrently with an
/// installation see either the old or the new registry, never a partial one.
/// Independent instances share nothing.
pub struct PolicyDecisionPoint {
    installed: ArcSwap<Vec<InformationPoint>>,
}

impl PolicyDecisionPoint {
    /// Create a decision point with no installed information points.
    pub fn new() -> Self {
        Self {
            installed: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Install `pip`, replacing any information point installed for its key.
    pub fn install<T, P>(&self, pip: P) -> &Self
    where
        T: AttributeType,
        P: PolicyInformationPoint<T> + 'static,
    {
        self.install_point(InformationPoint::new(pip))
    }

    /// Install a type-erased information point.
    ///
    /// A replaced entry keeps its position in installation order.
    pub fn install_point(&self, point: InformationPoint) -> &Self {
        self.installed.rcu(|current| {
            let mut next = Vec::clone(current);
            match next.iter_mut().find(|p| p.name() == point.name()) {
                Some(slot) => *slot = point.clone(),
                None => next.push(point.clone()),
            }
            next
        });
        debug!(key = point.name(), "installed information point");
        self
    }

    /// Build a context for one evaluation.
    ///
    /// The context sees the installed information points followed by
    /// `attributes`, so call-site attributes override installed providers and
    /// later attributes override earlier ones.
    pub fn create_evaluation_context(
        &self,
        attributes: impl IntoIterator<Item = InformationPoint>,
    ) -> ResolutionContext {
        let installed = self.installed.load();
        ResolutionContext::new(installed.iter().cloned().chain(attributes))
    }

    /// Names of the installed keys, in installation order.
    pub fn installed_keys(&self) -> Vec<String> {
        self.installed
            .load()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Number of installed information points.
    pub fn len(&self) -> usize {
        self.installed.load().len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.installed.load().is_empty()
    }
}

impl Default for PolicyDecisionPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PolicyDecisionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyDecisionPoint")
            .field("installed", &self.installed_keys())
            .finish()
    }
}

/// Shared handle to a decision point.
pub type SharedDecisionPoint = Arc<PolicyDecisionPoint>;
