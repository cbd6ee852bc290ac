// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
A lock for state that is read or replaced in a few instructions.

The line prefix and the context stack are touched on every emitted line but
only ever cloned or edited in place, so a spinlock is enough. On the wasm main
thread a blocking mutex is not available, which rules out `std::sync::Mutex`
for these.

Never do I/O or run user code while holding it.
*/

use std::cell::UnsafeCell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

pub(crate) struct Spinlock<T> {
    data: UnsafeCell<T>,
    locked: AtomicBool,
}

unsafe impl<T: Send> Send for Spinlock<T> {}
unsafe impl<T: Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub(crate) const fn new(data: T) -> Self {
        Spinlock {
            data: UnsafeCell::new(data),
            locked: AtomicBool::new(false),
        }
    }

    /// Runs `f` with exclusive access to the data.
    pub(crate) fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        while self
            .locked
            .compare_exchange_weak(false, true, Acquire, Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
        let _unlock = Unlock(&self.locked);
        // SAFETY: the flag above gives us exclusive access until `_unlock` drops
        f(unsafe { &mut *self.data.get() })
    }
}

impl<T: Clone> Spinlock<T> {
    pub(crate) fn get(&self) -> T {
        self.with(|data| data.clone())
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Spinlock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.get();
        std::fmt::Debug::fmt(&data, f)
    }
}

/// Releases the flag even if the closure unwinds.
struct Unlock<'a>(&'a AtomicBool);

impl Drop for Unlock<'_> {
    fn drop(&mut self) {
        self.0.store(false, Release);
    }
}

#[cfg(test)]
mod tests {
    use super::Spinlock;
    use std::sync::Arc;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    #[derive(Clone)]
    struct ReadsLock;

    static REENTRANT: Spinlock<ReadsLock> = Spinlock::new(ReadsLock);

    impl std::fmt::Debug for ReadsLock {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            REENTRANT.with(|_| ());
            f.write_str("ReadsLock")
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn debug_formats_outside_the_lock() {
        assert_eq!(format!("{:?}", REENTRANT), "ReadsLock");
        assert_eq!(format!("{:?}", Spinlock::new(vec![1, 2])), "[1, 2]");
    }

    #[test]
    fn concurrent_edits_are_not_lost() {
        let lock = Arc::new(Spinlock::new(0u32));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        lock.with(|n| *n += 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker should not panic");
        }
        assert_eq!(lock.get(), 4000);
    }

    #[test]
    fn unlocks_after_panic() {
        let lock = Arc::new(Spinlock::new(Vec::<u8>::new()));
        let inner = lock.clone();
        let result = std::thread::spawn(move || {
            inner.with(|v| {
                if v.is_empty() {
                    panic!("boom");
                }
            })
        })
        .join();
        assert!(result.is_err());
        lock.with(|v| v.push(1));
        assert_eq!(lock.get(), vec![1]);
    }
}
