// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value annotations carried into every line's prefix.
//!
//! A [`ContextStack`] is an ordered list: entries render left to right in the
//! order they were pushed, and keys need not be unique.
//!
//! ```rust
//! use tracemark::context::ContextStack;
//!
//! let mut stack = ContextStack::new();
//! stack.push("user", "alice");
//! stack.push("req", "42");
//! assert_eq!(stack.to_string(), " (user:alice, req:42)");
//!
//! stack.remove_key("user");
//! assert_eq!(stack.to_string(), " (req:42)");
//!
//! stack.pop();
//! assert_eq!(stack.to_string(), "");
//! ```

use std::fmt::Display;

/// One annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextEntry {
    pub key: String,
    pub value: String,
}

impl Display for ContextEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

/// Ordered key/value annotations.
///
/// Rendering via [`Display`] yields `" (k1:v1, k2:v2)"`, or nothing at all
/// when the stack is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextStack {
    entries: Vec<ContextEntry>,
}

impl ContextStack {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(ContextEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Removes every entry whose key is `key`.
    pub fn remove_key(&mut self, key: &str) {
        self.entries.retain(|entry| entry.key != key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes the most recently pushed entry, whatever its key.
    ///
    /// An empty stack stays empty.
    pub fn pop(&mut self) -> Option<ContextEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.iter()
    }
}

impl Display for ContextStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }
        f.write_str(" (")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", entry)?;
        }
        f.write_str(")")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContextStack {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut stack = Self::new();
        for (key, value) in iter {
            stack.push(key, value);
        }
        stack
    }
}

#[cfg(test)]
mod tests {
    use super::ContextStack;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn renders_in_push_order() {
        let stack: ContextStack = [("k1", "v1"), ("k2", "v2")].into_iter().collect();
        assert_eq!(stack.to_string(), " (k1:v1, k2:v2)");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn empty_renders_nothing() {
        assert_eq!(ContextStack::new().to_string(), "");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn remove_key_drops_every_match() {
        let mut stack: ContextStack = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        stack.remove_key("a");
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.to_string(), " (b:2)");

        stack.remove_key("missing");
        let left: Vec<(&str, &str)> = stack
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
            .collect();
        assert_eq!(left, vec![("b", "2")]);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn pop_takes_most_recent_regardless_of_key() {
        let mut stack: ContextStack = [("hello", "world"), ("good", "bye")].into_iter().collect();
        let popped = stack.pop().expect("stack has entries");
        assert_eq!(popped.key, "good");
        assert_eq!(stack.to_string(), " (hello:world)");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn pop_on_empty_is_a_no_op() {
        let mut stack = ContextStack::new();
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn clear_empties() {
        let mut stack: ContextStack = [("a", "1"), ("b", "2")].into_iter().collect();
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.to_string(), "");
    }
}
