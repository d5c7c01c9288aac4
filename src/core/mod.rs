//! Attribute resolution core: evaluation contexts and trace reporting.

mod context;
mod key_stack;
mod reporter;

pub use context::{EvaluationContext, EvaluationContextExt, ResolutionContext, ResolutionStats};
pub use reporter::{EvaluationReporter, Reporter};
