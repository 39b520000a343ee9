use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out candidate indices to workers through a single shared counter.
///
/// Every call increments the counter unconditionally; each index in
/// `[0, total)` is claimed by exactly one caller exactly once, and the claim
/// itself is the only synchronization workers share for assignment. Relaxed
/// ordering suffices: nothing is published through the counter, and the
/// result slots synchronize on their own.
pub(crate) struct WorkDistributor {
    next: AtomicUsize,
    total: usize,
}

impl WorkDistributor {
    pub fn new(total: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            total,
        }
    }

    /// Claims the next unprocessed candidate index, or `None` once all
    /// indices have been handed out.
    pub fn claim_next(&self) -> Option<usize> {
        let claimed = self.next.fetch_add(1, Ordering::Relaxed);
        (claimed < self.total).then_some(claimed)
    }
}
