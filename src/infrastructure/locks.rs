//! Per-book mutual exclusion for circulation operations
//!
//! Checkout, return and reserve on the same book are serialized so that
//! picking an available copy and draining the reservation queue never
//! interleave. Operations on different books proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct BookLocks {
    locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl BookLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `book_id`. The lock is released when
    /// the returned guard is dropped.
    pub async fn lock(&self, book_id: i32) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard is not held across the await
        let mutex = self
            .locks
            .entry(book_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}
