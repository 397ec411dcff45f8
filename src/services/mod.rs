use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod promotions;

/// Per-product critical sections.
///
/// Inventory allocation and promotion toggling are read-modify-write
/// sequences over a product's rows; without serialization two concurrent
/// callers can both read stale state and both succeed. Services share one
/// registry and hold the product's guard across the whole transaction.
#[derive(Clone, Default)]
pub struct ProductLocks {
    locks: Arc<DashMap<i32, Arc<Mutex<()>>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for a single product.
    pub async fn acquire(&self, product_id: i32) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Acquires locks for a set of products in ascending id order, so two
    /// multi-product operations can never deadlock against each other.
    pub async fn acquire_many(&self, product_ids: &[i32]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<i32> = product_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }
}

/// Outcome of a best-effort batch delete.
///
/// Batch deletes are deliberately not atomic: ids that cannot be deleted
/// (unknown, or protected by an active flag) are skipped and reported here
/// rather than failing the whole batch.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchDeleteOutcome {
    pub deleted: Vec<i32>,
    pub skipped: Vec<i32>,
}

impl BatchDeleteOutcome {
    pub fn all_deleted(&self) -> bool {
        self.skipped.is_empty()
    }
}
