// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construction-time settings for a [`Tracer`](crate::Tracer).
//!
//! The writer is not part of the config because writers are rarely `Clone`;
//! pass it to [`Tracer::with_writer`](crate::Tracer::with_writer) or set it
//! afterwards with [`Tracer::set_writer`](crate::Tracer::set_writer).
//!
//! ```rust
//! use tracemark::{Tracer, TracerConfig};
//!
//! let tracer = Tracer::with_config(TracerConfig::buffered().line_prefix("worker-3 "));
//! assert!(!tracer.auto_flush());
//! assert_eq!(tracer.line_prefix(), "worker-3 ");
//! ```

/// Line prefix of the process-wide default tracer.
pub const DEFAULT_LINE_PREFIX: &str = "TRACE: ";

/// Settings a [`Tracer`](crate::Tracer) starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TracerConfig {
    pub(crate) line_prefix: String,
    pub(crate) auto_flush: bool,
}

impl TracerConfig {
    /// Lines collect until [`flush`](crate::Tracer::flush). No prefix.
    pub fn buffered() -> Self {
        Self {
            line_prefix: String::new(),
            auto_flush: false,
        }
    }

    /// Every line is written as soon as it is produced. No prefix.
    pub fn immediate() -> Self {
        Self {
            line_prefix: String::new(),
            auto_flush: true,
        }
    }

    /// What the process-wide default tracer starts with: immediate, prefixed
    /// with [`DEFAULT_LINE_PREFIX`].
    pub fn process_default() -> Self {
        Self::immediate().line_prefix(DEFAULT_LINE_PREFIX)
    }

    pub fn line_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.line_prefix = prefix.into();
        self
    }

    pub fn auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }
}
