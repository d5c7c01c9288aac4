//! Evaluation contexts.
//!
//! A context resolves attribute keys to values for a single evaluation. Each
//! key is produced at most once per context: the first request runs the
//! registered information point and caches the value, later requests are
//! served from the cache. Keys that are in flight sit on a resolution stack,
//! and requesting one of them again is reported as a dependency cycle.

use super::key_stack::KeyStack;
use super::reporter::{EvaluationReporter, Reporter};
use crate::attribute::{AttributeData, AttributeType, InformationPoint, Key};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::ops::Add;
use std::sync::Arc;
use tracing::trace;

/// Resolves attribute keys to values and records the evaluation trace.
///
/// The trait is object safe so policies and information points can work
/// against `&mut dyn EvaluationContext`. Typed access is provided by
/// [`EvaluationContextExt::get_value`].
pub trait EvaluationContext: EvaluationReporter + Send {
    /// Resolve the attribute named `name` to its type-erased value.
    fn resolve(&mut self, name: &str) -> Result<Arc<dyn AttributeData>>;

    /// Merge this context with `other` into a new context.
    ///
    /// Providers and cached values of `other` win on key collision. Merging
    /// contexts of different implementations is an
    /// [`Error::IncompatibleContext`].
    fn plus(&self, other: &dyn EvaluationContext) -> Result<Box<dyn EvaluationContext>>;

    /// Cache statistics for this context.
    fn stats(&self) -> ResolutionStats {
        ResolutionStats::default()
    }

    /// View the context as [`Any`], used to check implementations match.
    fn as_any(&self) -> &dyn Any;
}

/// Typed access to an [`EvaluationContext`].
pub trait EvaluationContextExt: EvaluationContext {
    /// Resolve `key` and return its value.
    ///
    /// # Errors
    /// - [`Error::MissingPolicyInformationPoint`] if no provider is registered
    /// - [`Error::CyclicDependencies`] if `key` is already being resolved
    /// - [`Error::AttributeType`] if the value is not a `T`
    /// - any error raised by the information point itself
    fn get_value<T: AttributeType>(&mut self, key: &Key<T>) -> Result<T> {
        let value = self.resolve(key.name())?;
        (*value)
            .as_any_value()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::attribute_type(key.name(), type_name::<T>()))
    }
}

impl<C: EvaluationContext + ?Sized> EvaluationContextExt for C {}

/// Attribute cache counters for one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Requests answered from the cache
    pub cache_hits: u64,
    /// Requests that ran an information point
    pub cache_misses: u64,
}

/// The engine's [`EvaluationContext`].
pub struct ResolutionContext {
    providers: Vec<InformationPoint>,
    register: HashMap<String, InformationPoint>,
    cache: HashMap<String, Arc<dyn AttributeData>>,
    stack: KeyStack,
    reporter: Reporter,
    stats: ResolutionStats,
}

impl ResolutionContext {
    /// Create a context from an ordered list of information points.
    ///
    /// Later entries override earlier entries for the same key.
    pub fn new(providers: impl IntoIterator<Item = InformationPoint>) -> Self {
        let providers: Vec<InformationPoint> = providers.into_iter().collect();
        let register = providers
            .iter()
            .map(|provider| (provider.name().to_string(), provider.clone()))
            .collect();

        Self {
            providers,
            register,
            cache: HashMap::new(),
            stack: KeyStack::new(),
            reporter: Reporter::new(),
            stats: ResolutionStats::default(),
        }
    }

    /// Merge two contexts.
    ///
    /// The registry is rebuilt from both provider lists (`other` last) and the
    /// cache is the union of both caches, `other` winning on collision. The
    /// merged context starts with an empty trace.
    pub fn merge(&self, other: &ResolutionContext) -> ResolutionContext {
        let mut merged = ResolutionContext::new(
            self.providers
                .iter()
                .chain(other.providers.iter())
                .cloned(),
        );
        merged.cache = self
            .cache
            .iter()
            .chain(other.cache.iter())
            .map(|(name, value)| (name.clone(), Arc::clone(value)))
            .collect();
        merged
    }

    /// Number of distinct keys with a registered provider.
    pub fn registered_len(&self) -> usize {
        self.register.len()
    }

    /// Number of resolved values held in the cache.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn resolve_uncached(&mut self, name: &str) -> Result<Arc<dyn AttributeData>> {
        let provider = match self.register.get(name) {
            Some(provider) => provider.clone(),
            None => {
                self.report(&format!("Requested Key({name}), no provider found"));
                return Err(Error::missing_information_point(name));
            }
        };

        let value = provider.provide(self)?;
        self.report(&format!("Requested Key({name}), cache-miss: {value:?}"));
        self.cache.insert(name.to_string(), Arc::clone(&value));
        self.stats.cache_misses += 1;
        Ok(value)
    }
}

impl EvaluationContext for ResolutionContext {
    fn resolve(&mut self, name: &str) -> Result<Arc<dyn AttributeData>> {
        if let Some(value) = self.cache.get(name) {
            let value = Arc::clone(value);
            trace!(key = name, "attribute cache hit");
            self.report(&format!("Requested Key({name}), cache-hit"));
            self.stats.cache_hits += 1;
            return Ok(value);
        }

        self.stack.push(name)?;
        trace!(key = name, depth = self.stack.depth(), "resolving attribute");
        let result = self.resolve_uncached(name);
        self.stack.pop();
        result
    }

    fn plus(&self, other: &dyn EvaluationContext) -> Result<Box<dyn EvaluationContext>> {
        match other.as_any().downcast_ref::<ResolutionContext>() {
            Some(other) => Ok(Box::new(self.merge(other))),
            None => Err(Error::incompatible_context(
                "only ResolutionContext instances can be merged",
            )),
        }
    }

    fn stats(&self) -> ResolutionStats {
        self.stats
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EvaluationReporter for ResolutionContext {
    fn report(&mut self, message: &str) -> &mut dyn EvaluationReporter {
        self.reporter.report(message);
        self
    }

    fn indent(&mut self) -> &mut dyn EvaluationReporter {
        self.reporter.indent();
        self
    }

    fn unindent(&mut self) -> &mut dyn EvaluationReporter {
        self.reporter.unindent();
        self
    }

    fn get_report(&self) -> String {
        self.reporter.get_report()
    }
}

impl Add<&ResolutionContext> for &ResolutionContext {
    type Output = ResolutionContext;

    fn add(self, other: &ResolutionContext) -> ResolutionContext {
        self.merge(other)
    }
}

impl std::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut cached: Vec<&String> = self.cache.keys().collect();
        cached.sort();
        f.debug_struct("ResolutionContext")
            .field("providers", &self.providers)
            .field("cached", &cached)
            .field("stats", &self.stats)
            .finish()
    }
}
