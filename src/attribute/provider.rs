//! Policy information points.
//!
//! A policy information point (PIP) knows how to produce the value of one
//! attribute. While doing so it may ask the context for other attributes,
//! which is how the dependency graph between attributes is discovered at
//! resolution time rather than declared up front.

use super::{AttributeType, Key};
use crate::core::EvaluationContext;
use crate::Result;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased attribute value as stored in an evaluation context's cache.
pub trait AttributeData: Any + fmt::Debug + Send + Sync {
    /// View the value as [`Any`] for a checked downcast.
    fn as_any_value(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> AttributeData for T {
    fn as_any_value(&self) -> &dyn Any {
        self
    }
}

/// A provider of values for a single attribute key.
pub trait PolicyInformationPoint<T: AttributeType>: Send + Sync {
    /// The key this information point provides.
    fn key(&self) -> &Key<T>;

    /// Produce the attribute value, requesting other attributes from `ctx` as
    /// needed.
    fn provide(&self, ctx: &mut dyn EvaluationContext) -> Result<T>;
}

impl<T, P> PolicyInformationPoint<T> for Arc<P>
where
    T: AttributeType,
    P: PolicyInformationPoint<T> + ?Sized,
{
    fn key(&self) -> &Key<T> {
        (**self).key()
    }

    fn provide(&self, ctx: &mut dyn EvaluationContext) -> Result<T> {
        (**self).provide(ctx)
    }
}

/// An information point backed by a function.
pub struct FnInformationPoint<T, F> {
    key: Key<T>,
    provider: F,
}

impl<T, F> FnInformationPoint<T, F>
where
    T: AttributeType,
    F: Fn(&mut dyn EvaluationContext) -> Result<T> + Send + Sync,
{
    /// Create an information point that computes `key` with `provider`.
    pub fn new(key: Key<T>, provider: F) -> Self {
        Self { key, provider }
    }
}

impl<T, F> PolicyInformationPoint<T> for FnInformationPoint<T, F>
where
    T: AttributeType,
    F: Fn(&mut dyn EvaluationContext) -> Result<T> + Send + Sync,
{
    fn key(&self) -> &Key<T> {
        &self.key
    }

    fn provide(&self, ctx: &mut dyn EvaluationContext) -> Result<T> {
        (self.provider)(ctx)
    }
}

impl<T, F> fmt::Debug for FnInformationPoint<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInformationPoint")
            .field("key", &self.key)
            .finish()
    }
}

trait ErasedInformationPoint: Send + Sync {
    fn name(&self) -> &str;

    fn provide(&self, ctx: &mut dyn EvaluationContext) -> Result<Arc<dyn AttributeData>>;
}

struct Typed<T, P> {
    pip: P,
    _type: PhantomData<fn() -> T>,
}

impl<T, P> ErasedInformationPoint for Typed<T, P>
where
    T: AttributeType,
    P: PolicyInformationPoint<T>,
{
    fn name(&self) -> &str {
        self.pip.key().name()
    }

    fn provide(&self, ctx: &mut dyn EvaluationContext) -> Result<Arc<dyn AttributeData>> {
        let value = self.pip.provide(ctx)?;
        Ok(Arc::new(value))
    }
}

/// A registry entry: any [`PolicyInformationPoint`] with its value type erased.
///
/// This is what the decision point installs and what evaluation contexts are
/// built from. Cloning is cheap.
#[derive(Clone)]
pub struct InformationPoint {
    inner: Arc<dyn ErasedInformationPoint>,
}

impl InformationPoint {
    /// Erase the value type of `pip`.
    pub fn new<T, P>(pip: P) -> Self
    where
        T: AttributeType,
        P: PolicyInformationPoint<T> + 'static,
    {
        Self {
            inner: Arc::new(Typed {
                pip,
                _type: PhantomData,
            }),
        }
    }

    /// Create an information point from a function.
    pub fn from_fn<T, F>(key: Key<T>, provider: F) -> Self
    where
        T: AttributeType,
        F: Fn(&mut dyn EvaluationContext) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(FnInformationPoint::new(key, provider))
    }

    /// Name of the key this information point provides.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub(crate) fn provide(
        &self,
        ctx: &mut dyn EvaluationContext,
    ) -> Result<Arc<dyn AttributeData>> {
        self.inner.provide(ctx)
    }
}

impl fmt::Debug for InformationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InformationPoint(Key({}))", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EvaluationContextExt, ResolutionContext};

    #[test]
    fn test_fn_information_point_provides_value() {
        let key: Key<usize> = Key::new("length").unwrap();
        let pip = FnInformationPoint::new(key.clone(), |_ctx| Ok(42usize));
        let mut ctx = ResolutionContext::new(vec![]);

        assert_eq!(pip.key(), &key);
        assert_eq!(pip.provide(&mut ctx).unwrap(), 42);
    }

    #[test]
    fn test_information_point_name() {
        let key: Key<usize> = Key::new("length").unwrap();
        let point = InformationPoint::from_fn(key, |_ctx| Ok(1usize));

        assert_eq!(point.name(), "length");
        assert_eq!(format!("{point:?}"), "InformationPoint(Key(length))");
    }

    #[test]
    fn test_shared_information_point() {
        let key: Key<String> = Key::new("subject").unwrap();
        let shared = Arc::new(key.with_value("Z999999".to_string()));
        let mut ctx = ResolutionContext::new(vec![InformationPoint::new(Arc::clone(&shared))]);

        assert_eq!(ctx.get_value(&key).unwrap(), "Z999999");
        assert_eq!(Arc::strong_count(&shared), 2);
    }
}
