// src/coalesce.rs
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-region async guard. Holders of the same key run one at a time, so a
/// second caller can re-check the cache after the first one filled it.
#[derive(Default)]
pub struct RegionCoalescer {
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RegionCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
