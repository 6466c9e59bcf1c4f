//! Two-tier response cache with deterministic fallback.
//!
//! Fresh tier: short TTL, serves repeat requests without touching upstream.
//! Latest tier: TTL-agnostic last-known-good, overwritten on every
//! successful run, read only when a provider call fails.
//!
//! The controller is an explicitly constructed service — built once at
//! process start and injected into handlers — so tests get an isolated
//! instance instead of hidden global state. Locks are never held across a
//! provider call; two racing requests for one key may both invoke the
//! provider, which wastes a fetch but corrupts nothing.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::PipelineError;
use crate::providers::degraded_response;
use crate::types::{TrendQuery, TrendResponse};

#[derive(Debug, Clone)]
struct FreshEntry {
    stored_at: Instant,
    payload: TrendResponse,
}

/// Per-key state machine: fresh hit → short-circuit; miss → provider call;
/// failure → stale latest entry, else degraded placeholder.
#[derive(Debug)]
pub struct TrendCache {
    fresh: Mutex<HashMap<String, FreshEntry>>,
    latest: Mutex<HashMap<String, TrendResponse>>,
    fresh_ttl: Duration,
}

impl TrendCache {
    #[must_use]
    pub fn new(fresh_ttl: Duration) -> Self {
        Self {
            fresh: Mutex::new(HashMap::new()),
            latest: Mutex::new(HashMap::new()),
            fresh_ttl,
        }
    }

    #[must_use]
    pub const fn fresh_ttl(&self) -> Duration {
        self.fresh_ttl
    }

    /// Serve one request through the fallback chain.
    ///
    /// Never returns an error: every outcome is a valid [`TrendResponse`]
    /// whose metadata discloses its own trust tier. Provider failures stop
    /// here — they are logged, then absorbed into a stale or degraded
    /// payload.
    pub async fn serve<F, Fut>(&self, query: &TrendQuery, provider: F) -> TrendResponse
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TrendResponse, PipelineError>>,
    {
        let key = query.cache_key();

        {
            let mut fresh = self.fresh.lock().await;
            if let Some(entry) = fresh.get(&key) {
                if entry.stored_at.elapsed() < self.fresh_ttl {
                    tracing::debug!(key, "fresh cache hit");
                    return entry.payload.clone();
                }
                fresh.remove(&key);
            }
        }

        match provider().await {
            Ok(response) => {
                self.fresh.lock().await.insert(
                    key.clone(),
                    FreshEntry {
                        stored_at: Instant::now(),
                        payload: response.clone(),
                    },
                );
                self.latest.lock().await.insert(key, response.clone());
                response
            }
            Err(error) => {
                tracing::warn!(key, error = %error, "provider call failed, falling back");
                let latest = self.latest.lock().await;
                if let Some(last_good) = latest.get(&key) {
                    let mut stale = last_good.clone();
                    stale.meta.stale = Some(true);
                    stale.meta.stale_reason = Some(error.to_string());
                    return stale;
                }
                drop(latest);
                degraded_response(query, Some(error.to_string()))
            }
        }
    }
}
