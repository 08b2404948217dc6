//! Shared snapshot of today's orders.
//!
//! Several dashboard panels ask for the same list; they share one fetched
//! snapshot instead of issuing duplicate reads. The snapshot is replaced
//! wholesale on refresh and dropped wholesale on any order write, never
//! patched in place, so any number of consumers can hold it read-only.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::db::Database;
use crate::error::AppResult;
use crate::models::Order;
use crate::services::orders;

const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct Snapshot {
    fetched_at: Instant,
    orders: Arc<[Order]>,
}

pub struct TodayOrdersCache {
    ttl: Duration,
    // Lock order: this mutex is taken before the connection lock, never after.
    inner: Mutex<Option<Snapshot>>,
}

impl Default for TodayOrdersCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TodayOrdersCache {
    pub fn new(ttl: Duration) -> Self {
        TodayOrdersCache {
            ttl,
            inner: Mutex::new(None),
        }
    }

    /// Returns the current snapshot, refreshing it from the store when absent
    /// or older than the TTL.
    pub fn get(&self, db: &Database) -> AppResult<Arc<[Order]>> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(snapshot) = guard.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&snapshot.orders));
            }
        }

        let fresh: Arc<[Order]> = orders::get_today_orders(db)?.into();
        *guard = Some(Snapshot {
            fetched_at: Instant::now(),
            orders: Arc::clone(&fresh),
        });

        Ok(fresh)
    }

    /// Drops the snapshot; the next `get` reads fresh from the store.
    pub fn invalidate(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}
