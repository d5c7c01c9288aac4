//! Human-readable evaluation trace.

/// An append-only, indentable trace of an evaluation.
///
/// Every call returns the reporter so calls can be chained:
/// `ctx.report("policy").indent()`.
pub trait EvaluationReporter {
    /// Append `message` on its own line at the current indentation.
    fn report(&mut self, message: &str) -> &mut dyn EvaluationReporter;

    /// Increase indentation by one tab.
    fn indent(&mut self) -> &mut dyn EvaluationReporter;

    /// Decrease indentation by one tab; does nothing at zero.
    fn unindent(&mut self) -> &mut dyn EvaluationReporter;

    /// The accumulated trace text.
    fn get_report(&self) -> String;
}

/// String-backed [`EvaluationReporter`].
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    buffer: String,
    indent: String,
}

impl Reporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current indentation depth in tabs.
    pub fn depth(&self) -> usize {
        self.indent.len()
    }
}

impl EvaluationReporter for Reporter {
    fn report(&mut self, message: &str) -> &mut dyn EvaluationReporter {
        self.buffer.push_str(&self.indent);
        self.buffer.push_str(message);
        self.buffer.push('\n');
        self
    }

    fn indent(&mut self) -> &mut dyn EvaluationReporter {
        self.indent.push('\t');
        self
    }

    fn unindent(&mut self) -> &mut dyn EvaluationReporter {
        self.indent.pop();
        self
    }

    fn get_report(&self) -> String {
        self.buffer.clone()
    }
}
