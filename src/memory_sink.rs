// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! A writer that keeps everything written to it, for tests and for code that
//! wants to look at trace output instead of printing it.
//!
//! `MemorySink` is a handle: clones share one buffer. Hand one clone to
//! [`Tracer::set_writer`](crate::Tracer::set_writer) and keep the other to
//! read what was written.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// A cloneable in-memory writer.
///
/// # Example
///
/// ```rust
/// use tracemark::{MemorySink, Tracer, TracerConfig};
///
/// let sink = MemorySink::new();
/// let config = TracerConfig::immediate().line_prefix("TRACE: ");
/// let tracer = Tracer::with_writer(config, sink.clone());
/// tracer.here();
///
/// let output = sink.drain();
/// assert!(output.starts_with("TRACE: "));
/// assert!(output.ends_with('\n'));
///
/// // Buffer is now empty
/// assert_eq!(sink.drain(), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Clone: shares the buffer; this is the point of the type
// - Default: empty buffer
// - PartialEq/Eq/Hash: NOT implemented - handle identity vs. content equality is unclear
// - Display: NOT implemented - use `contents()`
// - Send/Sync: automatic through Arc<Mutex<_>>

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, leaving the buffer intact.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Everything written so far, clearing the buffer.
    pub fn drain(&self) -> String {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let result = String::from_utf8_lossy(&buffer).into_owned();
        buffer.clear();
        result
    }

    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
