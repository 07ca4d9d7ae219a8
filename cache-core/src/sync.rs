//! A counting semaphore with explicit `acquire`/`release` (P/V) calls.
//!
//! The readers/writer discipline in [`crate::concurrent`] needs a lock
//! that one thread can take and a *different* thread can release — the
//! first reader to arrive acquires `write_mutex`, and the last reader to
//! leave releases it. That shape doesn't fit a scope-based `MutexGuard`,
//! so this type exposes raw `acquire`/`release` instead, the same way
//! the design's `P(mutex)`/`V(mutex)` primitives do.

use std::sync::{Condvar, Mutex};

/// A classic counting semaphore built on a `Mutex` + `Condvar`, since
/// the standard library does not expose POSIX-style semaphores directly.
pub struct Semaphore {
    count: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    #[must_use]
    pub fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    /// `P(sem)`: block until a unit is available, then take it.
    pub fn acquire(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        while *count == 0 {
            count = self
                .available
                .wait(count)
                .unwrap_or_else(|e| e.into_inner());
        }
        *count -= 1;
    }

    /// `V(sem)`: return a unit, waking one waiter if any.
    pub fn release(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        self.available.notify_one();
    }
}

/// A binary semaphore used purely for mutual exclusion, initialized held-free.
#[must_use]
pub fn binary_mutex() -> Semaphore {
    Semaphore::new(1)
}
