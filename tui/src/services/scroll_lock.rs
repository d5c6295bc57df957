//! Scoped suspension of feed scrolling while a modal overlay is up.
//!
//! The dialog acquires the lock when it opens and the guard's `Drop` restores
//! scrolling, so release happens on every close path, including teardown
//! while a fetch is still in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct ScrollLock {
    flag: Arc<AtomicBool>,
}

impl ScrollLock {
    pub fn acquire(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Relaxed);
        Self { flag }
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}
