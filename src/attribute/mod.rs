//! Attribute keys, values and the information points that provide them.

mod key;
mod provider;
mod value;

pub use key::Key;
pub use provider::{AttributeData, FnInformationPoint, InformationPoint, PolicyInformationPoint};
pub use value::AttributeValue;

use std::any::Any;
use std::fmt;

/// Types that can be used as attribute values.
///
/// Blanket-implemented for every `'static` type that is `Clone`, `Debug`,
/// `Send` and `Sync`. Absent values are modelled as `Option<T>`.
pub trait AttributeType: Any + Clone + fmt::Debug + Send + Sync {}

impl<T: Any + Clone + fmt::Debug + Send + Sync> AttributeType for T {}

impl<T: AttributeType> From<AttributeValue<T>> for InformationPoint {
    fn from(value: AttributeValue<T>) -> Self {
        InformationPoint::new(value)
    }
}
