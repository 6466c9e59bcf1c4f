//! Per-request orchestration: dispatch the selected provider, normalize its
//! output, and stamp the trust metadata.

use std::time::{Duration, Instant};

use chrono::Utc;
use trendpulse_core::AppConfig;

use crate::demand::DemandVerifier;
use crate::error::PipelineError;
use crate::fetch::FetchClient;
use crate::normalize::build_items;
use crate::providers::{self, Endpoints, ProviderContext, ProviderKind};
use crate::types::{TrendMeta, TrendQuery, TrendResponse};

pub struct TrendPipeline {
    ctx: ProviderContext,
}

impl TrendPipeline {
    /// Build the pipeline from application config: one HTTP client, one
    /// demand verifier, default upstream endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let fetch = FetchClient::new(config.fetch_timeout_secs, &config.fetch_user_agent)?;
        let demand = DemandVerifier::new(
            fetch.clone(),
            Duration::from_secs(config.demand_cache_ttl_secs),
            config.demand_pool_width,
        );
        Ok(Self {
            ctx: ProviderContext {
                fetch,
                demand,
                endpoints: Endpoints::default(),
            },
        })
    }

    /// Build from an explicit context (tests point endpoints at a mock
    /// server this way).
    #[must_use]
    pub fn with_context(ctx: ProviderContext) -> Self {
        Self { ctx }
    }

    /// Run one provider invocation end to end:
    /// fetch → parse → tokenize → aggregate → score → grade → normalize.
    ///
    /// # Errors
    ///
    /// Propagates provider failures ([`PipelineError::InsufficientSignal`],
    /// upstream HTTP/parse errors). The cache controller decides what the
    /// client sees; nothing here is client-facing on the error path.
    pub async fn run(&self, query: &TrendQuery) -> Result<TrendResponse, PipelineError> {
        let started = Instant::now();
        let output = providers::run(&self.ctx, query).await?;
        let items = build_items(&output.ranked, &output.cooccur, query);
        let took_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            provider = query.provider.as_str(),
            items = items.len(),
            took_ms,
            "provider run complete"
        );

        Ok(TrendResponse {
            items,
            meta: TrendMeta {
                source: query.provider.as_str().to_string(),
                is_mock: query.provider == ProviderKind::Mock,
                keywords_are_live: output.keywords_are_live,
                series_is_synthetic: true,
                stale: None,
                stale_reason: None,
                fetched_at: Utc::now(),
                took_ms,
            },
        })
    }
}
