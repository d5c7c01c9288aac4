//! Attribute values bound to a key.

use super::{AttributeType, Key, PolicyInformationPoint};
use crate::core::EvaluationContext;
use crate::Result;

/// A fixed value for an attribute.
///
/// An attribute value is itself an information point whose `provide` returns
/// the bound value without any further lookups. Supplying one for a key that
/// also has an installed provider overrides that provider for a single
/// evaluation and cuts every provider chain that passes through the key.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue<T: AttributeType> {
    key: Key<T>,
    value: T,
}

impl<T: AttributeType> AttributeValue<T> {
    /// Bind `value` to `key`.
    pub fn new(key: Key<T>, value: T) -> Self {
        Self { key, value }
    }

    /// Bind `value` to the key provided by `pip`.
    pub fn for_provider<P>(pip: &P, value: T) -> Self
    where
        P: PolicyInformationPoint<T> + ?Sized,
    {
        Self::new(pip.key().clone(), value)
    }

    /// The bound key.
    pub fn key(&self) -> &Key<T> {
        &self.key
    }

    /// The bound value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: AttributeType> PolicyInformationPoint<T> for AttributeValue<T> {
    fn key(&self) -> &Key<T> {
        &self.key
    }

    fn provide(&self, _ctx: &mut dyn EvaluationContext) -> Result<T> {
        Ok(self.value.clone())
    }
}
