//! Typed attribute keys.

use super::{AttributeType, AttributeValue};
use crate::{Error, Result};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// A named identifier for an attribute whose values have type `T`.
///
/// Identity is the name alone: two keys with the same name are equal even when
/// their declared value types differ. Names are expected to be unique across
/// the whole system, so a shared name means a shared provider and a shared
/// cache slot. Retrieval through
/// [`EvaluationContextExt::get_value`](crate::core::EvaluationContextExt::get_value)
/// is type-checked, which turns an accidental alias into an
/// [`Error::AttributeType`] instead of a wrong value.
pub struct Key<T: ?Sized> {
    name: Arc<str>,
    _type: PhantomData<fn(&T)>,
}

impl<T: ?Sized> Key<T> {
    /// Create a key with the given name.
    ///
    /// # Errors
    /// Returns a configuration error if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::config_key("Key name cannot be empty", "key.name"));
        }
        Ok(Self::from_arc(Arc::from(name)))
    }

    /// Create a key named after the simple type name of `value`.
    ///
    /// Module paths and generic arguments are stripped, so a value of type
    /// `crate::policies::SameUnitPolicy<Foo>` yields the key `SameUnitPolicy`.
    /// Unnamed types such as tuples, arrays and slices keep their full type
    /// name.
    pub fn from_type_of<U: ?Sized>(_value: &U) -> Self {
        Self::from_arc(Arc::from(simple_type_name::<U>()))
    }

    /// Key for a name known to be non-empty.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(!name.is_empty());
        Self::from_arc(Arc::from(name))
    }

    fn from_arc(name: Arc<str>) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    /// The key's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: AttributeType> Key<T> {
    /// Bind this key to a fixed value.
    pub fn with_value(&self, value: T) -> AttributeValue<T> {
        AttributeValue::new(self.clone(), value)
    }
}

fn simple_type_name<U: ?Sized>() -> &'static str {
    let full = std::any::type_name::<U>();
    let without_generics = full
        .split(['<', '(', '[', ';'])
        .next()
        .unwrap_or(full);
    let simple = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics);
    if simple.is_empty() {
        full
    } else {
        simple
    }
}

impl<T: ?Sized> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self::from_arc(Arc::clone(&self.name))
    }
}

impl<T: ?Sized, U: ?Sized> PartialEq<Key<U>> for Key<T> {
    fn eq(&self, other: &Key<U>) -> bool {
        self.name == other.name
    }
}

impl<T: ?Sized> Eq for Key<T> {}

impl<T: ?Sized> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T: ?Sized> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

impl<T: ?Sized> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}
