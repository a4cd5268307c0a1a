use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Idle locks are pruned once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per product id, serializing read-modify-write cycles on
/// that product's review list.
#[derive(Default)]
pub struct ProductLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, product_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() > PRUNE_THRESHOLD {
                // Only the table holds a reference: nobody owns or awaits it.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(product_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
