// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tracer instance: buffering, flushing and the per-instance API.
//!
//! # Architecture
//!
//! A [`Tracer`] holds three pieces of state:
//!
//! - the line prefix and the [`ContextStack`], each behind a spinlock since
//!   they are only cloned or edited in place;
//! - an output section (auto-flush flag, pending lines, writer, last write
//!   error) behind one `Mutex`.
//!
//! Appending, flushing and switching modes all take the output mutex, and the
//! write to the sink happens while it is held. A flush therefore never sees a
//! half-appended line, an append never races a clear, and pending lines only
//! exist while auto-flush is off.
//!
//! # Call sites
//!
//! Every method that produces lines is `#[track_caller]`, so the recorded
//! file and line are those of the code calling the method (or the macro, or
//! the crate-root free function that forwards to it).

use crate::callsite::Source;
use crate::config::TracerConfig;
use crate::context::ContextStack;
use crate::line::{Line, describe_values, render_block};
use crate::spinlock::Spinlock;
use crate::stdout_sink::StdoutSink;
use std::backtrace::Backtrace;
use std::fmt::{Debug, Display};
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct Output {
    auto_flush: bool,
    lines: Vec<Line>,
    writer: Box<dyn Write + Send>,
    write_error: Option<std::io::Error>,
}

impl Output {
    fn append(&mut self, line: Line) {
        if self.auto_flush {
            let mut text = line.to_string();
            text.push('\n');
            self.write(&text);
        } else {
            self.lines.push(line);
        }
    }

    /// Writes pending lines as one block and clears them.
    fn flush_pending(&mut self, line_prefix: &str) {
        if let Some(block) = render_block(line_prefix, &self.lines) {
            self.write(&block);
        }
        self.lines.clear();
    }

    /// One `write_all` per call. Failures are kept for `take_write_error`.
    fn write(&mut self, text: &str) {
        let result = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(e) = result {
            self.write_error = Some(e);
        }
    }
}

/// A tracing instance.
///
/// Most code uses the process-wide default through the free functions and
/// macros at the crate root. Construct a `Tracer` when a piece of work wants
/// its own buffer, prefix or writer.
///
/// # Example
///
/// ```rust
/// use tracemark::{MemorySink, Tracer, TracerConfig};
///
/// let sink = MemorySink::new();
/// let tracer = Tracer::with_writer(TracerConfig::buffered().line_prefix("job: "), sink.clone());
///
/// tracer.add_context("id", "17");
/// tracer.msg("starting");
/// tracer.msg(format_args!("{} rows", 3));
/// assert_eq!(sink.contents(), "");
///
/// tracer.flush();
/// let output = sink.drain();
/// assert!(output.starts_with("job: -----\n"));
/// assert!(output.contains("(id:17)"));
/// assert!(output.contains("- 3 rows\n"));
/// assert!(output.ends_with("job: =====\n"));
/// ```
pub struct Tracer {
    line_prefix: Spinlock<String>,
    contexts: Spinlock<ContextStack>,
    output: Mutex<Output>,
}

impl Tracer {
    /// A buffered tracer writing to stdout.
    ///
    /// The line prefix is copied from the [default tracer](crate::default_tracer)
    /// now; later changes to either tracer do not affect the other.
    pub fn new() -> Self {
        let prefix = crate::global::default_tracer().line_prefix();
        Self::with_config(TracerConfig::buffered().line_prefix(prefix))
    }

    /// A tracer writing to stdout.
    pub fn with_config(config: TracerConfig) -> Self {
        Self::with_writer(config, StdoutSink::new())
    }

    pub fn with_writer(config: TracerConfig, writer: impl Write + Send + 'static) -> Self {
        Self {
            line_prefix: Spinlock::new(config.line_prefix),
            contexts: Spinlock::new(ContextStack::new()),
            output: Mutex::new(Output {
                auto_flush: config.auto_flush,
                lines: Vec::new(),
                writer: Box::new(writer),
                write_error: None,
            }),
        }
    }

    fn lock_output(&self) -> MutexGuard<'_, Output> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the writer. Lines already pending go to the new writer on flush.
    pub fn set_writer(&self, writer: impl Write + Send + 'static) {
        let old = std::mem::replace(&mut self.lock_output().writer, Box::new(writer));
        drop(old);
    }

    /// Sets the prefix for lines produced from now on.
    ///
    /// Pending lines keep the prefix they were created with; the block
    /// delimiters use whatever prefix is current at flush time.
    pub fn set_line_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        self.line_prefix.with(|current| *current = prefix);
    }

    pub fn line_prefix(&self) -> String {
        self.line_prefix.get()
    }

    /// Switches between immediate and buffered output.
    ///
    /// Enabling flushes anything pending first, so no line is lost in the switch.
    pub fn set_auto_flush(&self, enabled: bool) {
        let prefix = self.line_prefix();
        let mut output = self.lock_output();
        if enabled {
            output.flush_pending(&prefix);
        }
        output.auto_flush = enabled;
    }

    pub fn auto_flush(&self) -> bool {
        self.lock_output().auto_flush
    }

    /// Number of lines waiting for [`flush`](Self::flush).
    pub fn pending(&self) -> usize {
        self.lock_output().lines.len()
    }

    /// Emits a message.
    ///
    /// Anything `Display` works; pass `format_args!` for formatting, or use
    /// the [`msg!`](crate::msg) macro.
    #[track_caller]
    pub fn msg(&self, message: impl Display) {
        self.emit(Source::caller(), message.to_string());
    }

    /// Emits a bare "reached here" marker.
    #[track_caller]
    pub fn here(&self) {
        self.emit(Source::caller(), String::new());
    }

    /// Emits one line listing `values` with their `Debug` representation.
    ///
    /// ```rust
    /// # use tracemark::{MemorySink, Tracer, TracerConfig};
    /// #[derive(Debug)]
    /// struct Point { x: i32, y: i32 }
    ///
    /// let sink = MemorySink::new();
    /// let tracer = Tracer::with_writer(TracerConfig::immediate(), sink.clone());
    /// tracer.objs(&[&Point { x: 1, y: 2 } as &dyn std::fmt::Debug, &"label"]);
    /// assert!(sink.contents().contains(r#"- [0] Point { x: 1, y: 2 }, [1] "label""#));
    /// ```
    #[track_caller]
    pub fn objs(&self, values: &[&dyn Debug]) {
        self.emit(Source::caller(), describe_values(values));
    }

    /// Emits the current backtrace, one line per line of its text.
    ///
    /// `count <= 0` emits all of it; otherwise only the first `count` lines.
    /// Every line carries the caller's location, and in buffered mode the
    /// lines are appended together.
    #[track_caller]
    pub fn stack(&self, count: isize) {
        let source = Source::caller();
        let rendered = Backtrace::force_capture().to_string();
        let limit = usize::try_from(count)
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(usize::MAX);
        let prefix = self.line_prefix();
        let lines: Vec<Line> = self.contexts.with(|contexts| {
            rendered
                .lines()
                .take(limit)
                .map(|text| Line::new(text, source.clone(), &prefix, contexts))
                .collect()
        });
        let mut output = self.lock_output();
        for line in lines {
            output.append(line);
        }
    }

    /// Emits `message` as coming from `source`.
    ///
    /// The entry point for callers that resolved the call site themselves, for
    /// example with [`callsite::resolve`](crate::callsite::resolve). An empty
    /// message emits a marker.
    pub fn emit(&self, source: Source, message: impl Into<String>) {
        let prefix = self.line_prefix();
        let line = self
            .contexts
            .with(|contexts| Line::new(message, source, &prefix, contexts));
        self.lock_output().append(line);
    }

    /// Annotates subsequent lines with `key:value`.
    pub fn add_context(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.contexts.with(|contexts| contexts.push(key, value));
    }

    /// Removes every context entry with this key.
    pub fn remove_context(&self, key: &str) {
        self.contexts.with(|contexts| contexts.remove_key(key));
    }

    pub fn remove_all_contexts(&self) {
        self.contexts.with(|contexts| contexts.clear());
    }

    /// Removes the most recently added context entry. Does nothing when there is none.
    pub fn remove_previous_context(&self) {
        self.contexts.with(|contexts| {
            contexts.pop();
        });
    }

    /// A snapshot of the current contexts.
    pub fn contexts(&self) -> ContextStack {
        self.contexts.get()
    }

    /// Writes pending lines as one aligned block and clears them.
    ///
    /// Does nothing, delimiters included, when nothing is pending.
    pub fn flush(&self) {
        let prefix = self.line_prefix();
        self.lock_output().flush_pending(&prefix);
    }

    /// The most recent failed write to the sink, if any, clearing it.
    ///
    /// Writing is best-effort: a failed block is dropped rather than retried,
    /// and the error is kept here instead of being returned to the caller.
    pub fn take_write_error(&self) -> Option<std::io::Error> {
        self.lock_output().write_error.take()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line_prefix = self.line_prefix();
        let contexts = self.contexts();
        let (auto_flush, pending) = {
            let output = self.lock_output();
            (output.auto_flush, output.lines.len())
        };
        f.debug_struct("Tracer")
            .field("line_prefix", &line_prefix)
            .field("contexts", &contexts)
            .field("auto_flush", &auto_flush)
            .field("pending", &pending)
            .finish()
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        let prefix = self.line_prefix.get();
        self.output
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .flush_pending(&prefix);
    }
}

/*
Boilerplate notes for Tracer:

IMPLEMENTED:
- Debug: manual, shows configuration and pending count rather than the writer
- Default: same as `new()`
- Send/Sync: automatic; writer is `Send` behind a Mutex

NOT IMPLEMENTED:
- Clone: a tracer owns its buffer and writer; share it with `Arc` instead
- PartialEq/Eq/Hash: equality of a stateful sink is not meaningful
- Display: no obvious representation
*/
