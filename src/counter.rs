//! Lock-free byte counter.
//!
//! [`Counter`] holds the `current` and `total` byte counts of a transfer in
//! two independent atomics. Increments never take a lock, so the I/O path
//! feeding bytes is never blocked by a render in progress.
//!
//! There is no snapshot isolation between the two fields: a reader may see
//! a `current` that was written before the latest `total`. After every
//! [`Counter::add`] returns, `current <= total` holds whenever `total > 0`.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::io::Progress;

/// Thread-safe holder of the current and total byte counts.
///
/// A `total` of zero means the size of the transfer is unknown and no
/// clamping takes place.
#[derive(Debug, Default)]
pub struct Counter {
    current: AtomicU64,
    total: AtomicU64,
}

impl Counter {
    /// Create a counter expecting `total` bytes.
    #[must_use]
    pub const fn new(total: u64) -> Self {
        Self {
            current: AtomicU64::new(0),
            total: AtomicU64::new(total),
        }
    }

    /// Replace the expected total.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    /// Replace the current count.
    pub fn set_current(&self, current: u64) {
        self.current.store(current, Ordering::SeqCst);
    }

    /// Bytes observed so far.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Expected total, or zero when unknown.
    #[must_use]
    pub fn get_total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Add `n` bytes and return the resulting count.
    ///
    /// If the count overshoots a non-zero total it is clamped down to the
    /// total before returning. Concurrent readers may briefly observe the
    /// unclamped value.
    pub fn add(&self, n: u64) -> u64 {
        let current = self.current.fetch_add(n, Ordering::SeqCst).saturating_add(n);
        let total = self.get_total();
        if total > 0 && current > total {
            self.clamp_to(total)
        } else {
            current
        }
    }

    /// Clamp the current count down to `total`, returning the new count.
    ///
    /// Uses a compare-and-swap loop so a concurrent increment is never
    /// overwritten by a stale value.
    fn clamp_to(&self, total: u64) -> u64 {
        match self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current > total).then_some(total)
            }) {
            Ok(_) => total,
            Err(current) => current,
        }
    }
}

impl Progress for Counter {
    fn get(&self) -> u64 {
        Counter::get(self)
    }

    fn get_total(&self) -> u64 {
        Counter::get_total(self)
    }

    fn set_total(&self, total: u64) {
        Counter::set_total(self, total);
    }

    fn add(&self, n: u64) -> u64 {
        Counter::add(self, n)
    }
}
