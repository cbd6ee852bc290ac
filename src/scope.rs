// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carrying a tracer through a call chain without a global.
//!
//! A tracer can be made *current* for the running thread with
//! [`Tracer::enter`]. Code further down the call chain asks for it with
//! [`current`], which answers `None` when nothing was entered, so the caller
//! decides whether to fall back to the [default](crate::default_tracer).
//!
//! ```rust
//! use tracemark::{Tracer, TracerConfig, scope};
//! use std::sync::Arc;
//!
//! fn handle_request() {
//!     match scope::current() {
//!         Some(tracer) => tracer.msg("inside request"),
//!         None => tracemark::msg("no request tracer"),
//!     }
//! }
//!
//! let tracer = Arc::new(Tracer::with_config(TracerConfig::buffered()));
//! {
//!     let _scope = tracer.enter();
//!     handle_request();
//! }
//! assert_eq!(tracer.pending(), 1);
//! assert!(scope::current().is_none());
//! # tracer.set_writer(std::io::sink());
//! ```
//!
//! Async executors may poll a future on any thread; wrap it in
//! [`ApplyTracer`] so the tracer is current during every poll.

use crate::tracer::Tracer;
use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

thread_local! {
    static CURRENT: RefCell<Option<Arc<Tracer>>> = const { RefCell::new(None) };
}

/// The tracer entered on this thread, if any.
pub fn current() -> Option<Arc<Tracer>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// The tracer entered on this thread, or the process-wide default.
pub fn current_or_default() -> Arc<Tracer> {
    current().unwrap_or_else(crate::global::default_tracer)
}

fn replace_current(tracer: Option<Arc<Tracer>>) -> Option<Arc<Tracer>> {
    CURRENT.with(|current| current.replace(tracer))
}

/// Restores the previously current tracer when dropped.
///
/// Created by [`Tracer::enter`]. Tied to the thread that created it.
#[must_use = "the tracer stops being current when the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    prior: Option<Arc<Tracer>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let leaving = replace_current(self.prior.take());
        drop(leaving);
    }
}

impl Tracer {
    /// Makes this tracer current on this thread until the guard drops.
    ///
    /// Scopes nest: dropping the inner guard brings back the outer tracer.
    pub fn enter(self: &Arc<Self>) -> ScopeGuard {
        ScopeGuard {
            prior: replace_current(Some(self.clone())),
            _not_send: PhantomData,
        }
    }
}

/// A [`Future`] wrapper that makes a tracer current while the inner future is polled.
///
/// # Examples
///
/// ```rust
/// use tracemark::{Tracer, TracerConfig, scope::{self, ApplyTracer}};
/// use std::sync::Arc;
///
/// async fn work() {
///     scope::current().expect("tracer applied").msg("working");
/// }
///
/// # async fn example() {
/// let tracer = Arc::new(Tracer::with_config(TracerConfig::buffered()));
/// ApplyTracer::new(tracer.clone(), work()).await;
/// assert_eq!(tracer.pending(), 1);
/// # }
/// ```
pub struct ApplyTracer<F>(Arc<Tracer>, F);

impl<F> ApplyTracer<F> {
    pub fn new(tracer: Arc<Tracer>, f: F) -> Self {
        Self(tracer, f)
    }
}

impl<F> Future for ApplyTracer<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        // SAFETY: the inner future is never moved out of `self`
        let (tracer, fut) = unsafe {
            let d = self.get_unchecked_mut();
            (&d.0, Pin::new_unchecked(&mut d.1))
        };
        let _scope = tracer.enter();
        fut.poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TracerConfig;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    fn quiet() -> Arc<Tracer> {
        Arc::new(Tracer::with_writer(TracerConfig::buffered(), std::io::sink()))
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn nothing_entered_is_not_found() {
        assert!(current().is_none());
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn scopes_nest_and_restore() {
        let outer = quiet();
        let inner = quiet();

        let outer_scope = outer.enter();
        assert!(Arc::ptr_eq(&current().expect("outer entered"), &outer));
        {
            let _inner_scope = inner.enter();
            assert!(Arc::ptr_eq(&current().expect("inner entered"), &inner));
        }
        assert!(Arc::ptr_eq(&current().expect("outer restored"), &outer));
        drop(outer_scope);
        assert!(current().is_none());
    }

    #[test]
    fn current_is_per_thread() {
        let tracer = quiet();
        let _scope = tracer.enter();
        let seen = std::thread::spawn(|| current().is_some())
            .join()
            .expect("thread should not panic");
        assert!(!seen);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn fallback_prefers_entered() {
        let tracer = quiet();
        let _scope = tracer.enter();
        assert!(Arc::ptr_eq(&current_or_default(), &tracer));
    }
}
