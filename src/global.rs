// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide default tracer and the free functions that drive it.
//!
//! The default is created on first use from
//! [`TracerConfig::process_default`]: immediate output to stdout, prefixed
//! with [`DEFAULT_LINE_PREFIX`](crate::DEFAULT_LINE_PREFIX). Because
//! it is created lazily by whoever touches it first, including
//! [`Tracer::new`], it always exists before any other tracer copies its prefix.
//!
//! A program that wants different defaults builds its own tracer once at
//! startup and installs it with [`set_default_tracer`].
//!
//! # Examples
//!
//! ```
//! use tracemark::{MemorySink, Tracer, TracerConfig};
//! use std::sync::Arc;
//!
//! let sink = MemorySink::new();
//! let tracer = Tracer::with_writer(TracerConfig::process_default(), sink.clone());
//! tracemark::set_default_tracer(Arc::new(tracer));
//!
//! tracemark::add_context("phase", "startup");
//! tracemark::msg("loading config");
//! assert!(sink.drain().contains("(phase:startup) - loading config"));
//! ```
//!
//! # Thread Safety
//!
//! Every function here may be called from any thread. The default is held in
//! a spinlock that is only taken long enough to clone or swap an `Arc`.

use crate::config::TracerConfig;
use crate::spinlock::Spinlock;
use crate::tracer::Tracer;
use std::fmt::{Debug, Display};
use std::io::Write;
use std::sync::{Arc, OnceLock};

static DEFAULT_TRACER: OnceLock<Spinlock<Arc<Tracer>>> = OnceLock::new();

fn slot() -> &'static Spinlock<Arc<Tracer>> {
    DEFAULT_TRACER.get_or_init(|| {
        Spinlock::new(Arc::new(Tracer::with_config(TracerConfig::process_default())))
    })
}

/// The current process-wide tracer.
pub fn default_tracer() -> Arc<Tracer> {
    slot().get()
}

/// Installs `tracer` as the process-wide default, returning the previous one.
///
/// Code still holding the previous tracer keeps using it until it lets go.
pub fn set_default_tracer(tracer: Arc<Tracer>) -> Arc<Tracer> {
    slot().with(|current| std::mem::replace(current, tracer))
}

/// Sets the default tracer's writer.
pub fn set_writer(writer: impl Write + Send + 'static) {
    default_tracer().set_writer(writer);
}

/// Sets the default tracer's line prefix.
pub fn set_line_prefix(prefix: impl Into<String>) {
    default_tracer().set_line_prefix(prefix);
}

/// Switches the default tracer between immediate and buffered output.
pub fn set_auto_flush(enabled: bool) {
    default_tracer().set_auto_flush(enabled);
}

/// Emits a message on the default tracer. See also [`msg!`](crate::msg).
#[track_caller]
pub fn msg(message: impl Display) {
    default_tracer().msg(message);
}

/// Emits a "reached here" marker on the default tracer.
#[track_caller]
pub fn here() {
    default_tracer().here();
}

/// Emits an object dump on the default tracer. See also [`objs!`](crate::objs).
#[track_caller]
pub fn objs(values: &[&dyn Debug]) {
    default_tracer().objs(values);
}

/// Emits the current backtrace on the default tracer; `count <= 0` for all of it.
#[track_caller]
pub fn stack(count: isize) {
    default_tracer().stack(count);
}

pub fn add_context(key: impl Into<String>, value: impl Into<String>) {
    default_tracer().add_context(key, value);
}

pub fn remove_context(key: &str) {
    default_tracer().remove_context(key);
}

pub fn remove_all_contexts() {
    default_tracer().remove_all_contexts();
}

pub fn remove_previous_context() {
    default_tracer().remove_previous_context();
}

/// Flushes the default tracer.
pub fn flush() {
    default_tracer().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use std::sync::Mutex;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    static TEST_TRACER_GUARD: Mutex<()> = Mutex::new(());

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn default_is_immediate_and_prefixed() {
        let _guard = TEST_TRACER_GUARD.lock().unwrap();
        let original = set_default_tracer(Arc::new(Tracer::with_config(
            TracerConfig::process_default(),
        )));
        let tracer = default_tracer();
        assert!(tracer.auto_flush());
        assert_eq!(tracer.line_prefix(), crate::config::DEFAULT_LINE_PREFIX);
        set_default_tracer(original);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn new_tracer_copies_prefix_once() {
        let _guard = TEST_TRACER_GUARD.lock().unwrap();
        let original = set_default_tracer(Arc::new(Tracer::with_config(
            TracerConfig::process_default().line_prefix("inherited "),
        )));

        let tracer = Tracer::new();
        assert!(!tracer.auto_flush());
        assert_eq!(tracer.line_prefix(), "inherited ");

        set_line_prefix("changed ");
        assert_eq!(tracer.line_prefix(), "inherited ");

        set_default_tracer(original);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn free_functions_reach_the_default() {
        let _guard = TEST_TRACER_GUARD.lock().unwrap();
        let sink = MemorySink::new();
        let original = set_default_tracer(Arc::new(Tracer::with_writer(
            TracerConfig::process_default(),
            sink.clone(),
        )));

        here();
        let output = sink.drain();
        assert!(output.starts_with("TRACE: global.rs:"));
        assert!(!output.contains("- "));

        set_auto_flush(false);
        msg("buffered");
        assert_eq!(sink.contents(), "");
        flush();
        assert_eq!(sink.drain().lines().count(), 3);

        set_default_tracer(original);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn replacing_returns_previous() {
        let _guard = TEST_TRACER_GUARD.lock().unwrap();
        let first = Arc::new(Tracer::with_config(TracerConfig::buffered()));
        let original = set_default_tracer(first.clone());
        let replaced = set_default_tracer(original);
        assert!(Arc::ptr_eq(&first, &replaced));
    }
}
