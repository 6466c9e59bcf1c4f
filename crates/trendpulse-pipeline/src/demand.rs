//! Demand verification against an autocomplete-style suggestion endpoint.
//!
//! A bounded worker pool corroborates that candidate terms have real-world
//! search interest. One flaky lookup never corrupts the rank: per-candidate
//! failures degrade to a heuristic estimate. Results are cached by
//! normalized query for several hours.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tokio::sync::Mutex;

use crate::fetch::FetchClient;

const DEFAULT_SUGGEST_BASE: &str = "https://suggestqueries.google.com";

#[derive(Debug, Clone)]
struct CachedDemand {
    stored_at: Instant,
    value: f64,
}

/// Bounded-concurrency autocomplete lookups with a TTL cache.
#[derive(Debug, Clone)]
pub struct DemandVerifier {
    fetch: FetchClient,
    suggest_base: String,
    cache: Arc<Mutex<HashMap<String, CachedDemand>>>,
    ttl: Duration,
    pool_width: usize,
}

impl DemandVerifier {
    #[must_use]
    pub fn new(fetch: FetchClient, ttl: Duration, pool_width: usize) -> Self {
        Self {
            fetch,
            suggest_base: DEFAULT_SUGGEST_BASE.to_string(),
            cache: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            pool_width: pool_width.max(1),
        }
    }

    /// Point the verifier at a different suggestion endpoint (tests).
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.suggest_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Verify demand for a batch of terms.
    ///
    /// Returns a map keyed by lowercased term with values in `[0, 1]`.
    /// Lookups run through a worker pool of `pool_width`; excess terms queue
    /// behind it. This method never fails — individual lookup errors fall
    /// back to [`heuristic_demand`].
    pub async fn verify(&self, terms: &[String], lang: &str) -> HashMap<String, f64> {
        let results: Vec<(String, f64)> = stream::iter(terms.iter().cloned())
            .map(|term| {
                let key = term.to_lowercase();
                async move {
                    let value = self.lookup(&term, lang).await;
                    (key, value)
                }
            })
            .buffer_unordered(self.pool_width)
            .collect()
            .await;

        results.into_iter().collect()
    }

    async fn lookup(&self, term: &str, lang: &str) -> f64 {
        let key = term.to_lowercase();

        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&key) {
                if cached.stored_at.elapsed() < self.ttl {
                    return cached.value;
                }
            }
        }

        let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}/complete/search?client=firefox&hl={lang}&q={encoded}",
            self.suggest_base
        );

        let value = match self.fetch.fetch_json(&url).await {
            Ok(Some(json)) => demand_from_suggestions(term, &json),
            Ok(None) => {
                tracing::debug!(term, "suggestion body was not JSON, using heuristic");
                heuristic_demand(term)
            }
            Err(e) => {
                tracing::warn!(term, error = %e, "demand lookup failed, using heuristic");
                heuristic_demand(term)
            }
        };

        let mut cache = self.cache.lock().await;
        cache.insert(
            key,
            CachedDemand {
                stored_at: Instant::now(),
                value,
            },
        );
        value
    }
}

/// Score the suggestion payload `["q", ["s1", "s2", ...]]` for a term.
///
/// Each suggestion echoing the term counts; ten echoes saturate at 1.0.
fn demand_from_suggestions(term: &str, json: &serde_json::Value) -> f64 {
    let needle = term.to_lowercase();
    let matches = json
        .get(1)
        .and_then(serde_json::Value::as_array)
        .map_or(0, |suggestions| {
            suggestions
                .iter()
                .filter_map(serde_json::Value::as_str)
                .filter(|s| s.to_lowercase().contains(&needle))
                .count()
        });
    #[allow(clippy::cast_precision_loss)]
    let score = matches.min(10) as f64 / 10.0;
    score
}

/// Fallback estimate when the suggestion endpoint is unreachable.
///
/// Shorter terms skew toward head queries; the estimate decays with length
/// and stays well under a verified full hit.
#[must_use]
pub fn heuristic_demand(term: &str) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let len = term.chars().count() as f64;
    (0.55 - 0.04 * len).clamp(0.15, 0.5)
}
