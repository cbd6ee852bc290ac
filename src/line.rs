// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record behind every emitted line, and how lines become text.
//!
//! A [`Line`] freezes its prefix (instance prefix, call site, contexts) when it
//! is created. Changing the tracer's prefix or contexts afterwards affects only
//! later lines.
//!
//! A flushed block looks like this, with every prefix padded to the widest one:
//!
//! ```text
//! TRACE: -----
//! TRACE: main.rs:10 (req:7) - loading
//! TRACE: db.rs:88           - query took 3ms
//! TRACE: db.rs:90
//! TRACE: =====
//! ```

use crate::callsite::Source;
use crate::context::ContextStack;
use std::fmt::{Debug, Display, Write};

/// First line of a flushed block, after the prefix.
pub const SECTION_BEGIN: &str = "-----";
/// Last line of a flushed block, after the prefix.
pub const SECTION_END: &str = "=====";

/// One pending or emitted trace line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    message: String,
    source: Source,
    prefix: String,
}

impl Line {
    /// Creates a line, rendering its prefix from the current state.
    ///
    /// An empty `message` makes a marker line.
    pub fn new(
        message: impl Into<String>,
        source: Source,
        line_prefix: &str,
        contexts: &ContextStack,
    ) -> Self {
        let prefix = format!("{}{}{} ", line_prefix, source, contexts);
        Self {
            message: message.into(),
            source,
            prefix,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The decoration rendered to the left of the message, trailing space included.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_marker(&self) -> bool {
        self.message.is_empty()
    }

    fn prefix_width(&self) -> usize {
        self.prefix.chars().count()
    }

    /// Appends the line padded to `width`, followed by a newline.
    pub fn render_into(&self, out: &mut String, width: usize) {
        //writing to a String cannot fail
        let _ = write!(out, "{:<width$}", self.prefix, width = width);
        if !self.is_marker() {
            out.push_str("- ");
            out.push_str(&self.message);
        }
        out.push('\n');
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)?;
        if !self.is_marker() {
            write!(f, "- {}", self.message)?;
        }
        Ok(())
    }
}

/// Renders `lines` as one delimited, aligned block.
///
/// Returns `None` for no lines; an empty flush writes nothing, delimiters included.
pub fn render_block(line_prefix: &str, lines: &[Line]) -> Option<String> {
    let width = lines.iter().map(Line::prefix_width).max()?;

    let mut out = String::new();
    out.push_str(line_prefix);
    out.push_str(SECTION_BEGIN);
    out.push('\n');
    for line in lines {
        line.render_into(&mut out, width);
    }
    out.push_str(line_prefix);
    out.push_str(SECTION_END);
    out.push('\n');
    Some(out)
}

/// Renders values as `[0] <debug>, [1] <debug>, ...`.
///
/// Uses the single-line [`Debug`] form, so derived impls show every field
/// while the result stays on one line.
pub fn describe_values(values: &[&dyn Debug]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        //writing to a String cannot fail
        let _ = write!(out, "[{}] {:?}", i, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    fn source(file: &str, line: u32) -> Source {
        Source {
            file: file.to_string(),
            function: String::new(),
            line,
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn prefix_includes_location_and_contexts() {
        let contexts: ContextStack = [("k1", "v1"), ("k2", "v2")].into_iter().collect();
        let line = Line::new("hello", source("main.rs", 12), "P: ", &contexts);
        assert_eq!(line.prefix(), "P: main.rs:12 (k1:v1, k2:v2) ");
        assert_eq!(line.to_string(), "P: main.rs:12 (k1:v1, k2:v2) - hello");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn marker_has_no_dash() {
        let line = Line::new("", source("main.rs", 3), "", &ContextStack::new());
        assert!(line.is_marker());
        assert_eq!(line.to_string(), "main.rs:3 ");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn block_aligns_to_widest_prefix() {
        let mut contexts = ContextStack::new();
        contexts.push("req", "7");
        let lines = vec![
            Line::new("loading", source("main.rs", 10), "T: ", &contexts),
            Line::new("query", source("db.rs", 88), "T: ", &ContextStack::new()),
            Line::new("", source("db.rs", 90), "T: ", &ContextStack::new()),
        ];
        let block = render_block("T: ", &lines).expect("lines are pending");
        let expected = "T: -----\n\
                        T: main.rs:10 (req:7) - loading\n\
                        T: db.rs:88           - query\n\
                        T: db.rs:90           \n\
                        T: =====\n";
        assert_eq!(block, expected);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn values_are_indexed_and_show_fields() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Person {
            name: &'static str,
            loc: &'static str,
        }
        let dave = Person { name: "dave", loc: "earth" };
        let fred = Box::new(Person { name: "fred", loc: "mars" });
        let described = describe_values(&[&dave as &dyn Debug, &fred, &7u8]);
        assert_eq!(
            described,
            r#"[0] Person { name: "dave", loc: "earth" }, [1] Person { name: "fred", loc: "mars" }, [2] 7"#
        );
        let none: [&dyn Debug; 0] = [];
        assert_eq!(describe_values(&none), "");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn empty_block_renders_nothing() {
        assert_eq!(render_block("T: ", &[]), None);
    }
}
