//! Resolution stack used for cycle detection.

use crate::{Error, Result};

/// Ordered list of keys currently being resolved.
///
/// A key may be resolved many times in one context, one after the other, but
/// never while it is already in flight. The stack tells the two apart.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyStack {
    keys: Vec<String>,
}

impl KeyStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push `name`, failing with the cycle path if it is already in flight.
    pub(crate) fn push(&mut self, name: &str) -> Result<()> {
        if let Some(start) = self.keys.iter().position(|key| key == name) {
            let mut path: Vec<String> = self.keys[start..].to_vec();
            path.push(name.to_string());
            return Err(Error::cyclic_dependencies(path));
        }
        self.keys.push(name.to_string());
        Ok(())
    }

    pub(crate) fn pop(&mut self) {
        self.keys.pop();
    }

    pub(crate) fn depth(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop() {
        let mut stack = KeyStack::new();
        stack.push("a").unwrap();
        stack.push("b").unwrap();
        assert_eq!(stack.depth(), 2);

        stack.pop();
        stack.push("b").unwrap();
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_cycle_path_starts_at_first_occurrence() {
        let mut stack = KeyStack::new();
        for key in ["root", "key1", "key2", "key3"] {
            stack.push(key).unwrap();
        }

        let err = stack.push("key1").unwrap_err();
        assert_eq!(err.to_string(), "Cycle: key1 -> key2 -> key3 -> key1");
        assert_eq!(stack.depth(), 4);
    }

    #[test]
    fn test_self_reference() {
        let mut stack = KeyStack::new();
        stack.push("key1").unwrap();

        let err = stack.push("key1").unwrap_err();
        assert_eq!(err.to_string(), "Cycle: key1 -> key1");
    }
}
