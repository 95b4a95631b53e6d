// src/cache.rs
//! In-memory analysis cache keyed by region id.
//!
//! Absolute TTL measured from capture time; an entry at or past its TTL is
//! treated as absent. There is no background sweep: stale entries stay in the
//! map until the next `put` for the same key overwrites them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use metrics::counter;

use crate::types::AnalysisResult;

/// Default time-to-live: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Millisecond wall clock. Swappable so TTL behavior is testable.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: Arc<AnalysisResult>,
    captured_at_ms: u64,
}

/// Process-wide result cache. Construct once and share through `Arc`.
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Returns the entry for `key` when `now - captured_at < ttl`.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<Arc<AnalysisResult>> {
        let now = self.clock.now_ms();
        let ttl_ms = ttl.as_millis() as u64;
        let hit = self
            .lock()
            .get(key)
            .filter(|e| now.saturating_sub(e.captured_at_ms) < ttl_ms)
            .map(|e| Arc::clone(&e.result));

        if hit.is_some() {
            counter!("analysis_cache_hits_total").increment(1);
        } else {
            counter!("analysis_cache_misses_total").increment(1);
        }
        hit
    }

    /// Stores `value` captured now, replacing any previous entry.
    pub fn put(&self, key: &str, value: Arc<AnalysisResult>) {
        let entry = CacheEntry {
            result: value,
            captured_at_ms: self.clock.now_ms(),
        };
        self.lock().insert(key.to_string(), entry);
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the guard cannot leave a half-written entry.
        match self.entries.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}
