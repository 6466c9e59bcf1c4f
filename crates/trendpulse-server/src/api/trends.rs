use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};
use trendpulse_core::{AppConfig, LocaleTarget, Timeframe};
use trendpulse_pipeline::{ProviderKind, TrendQuery, TrendResponse};

/// Raw query parameters. `tf`/`timeframe`, `geo`/`country`, and `hl`/`lang`
/// are accepted as aliases; the short form wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TrendsParams {
    pub source: Option<String>,
    pub tf: Option<String>,
    pub timeframe: Option<String>,
    pub geo: Option<String>,
    pub country: Option<String>,
    pub hl: Option<String>,
    pub lang: Option<String>,
    pub cat: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// Normalize raw params into a [`TrendQuery`], rejecting unknown providers
/// at this boundary.
fn build_query(params: TrendsParams, config: &AppConfig) -> Result<TrendQuery, String> {
    let source = params.source.unwrap_or_else(|| "news".to_string());
    let provider = ProviderKind::parse(&source).map_err(|e| e.to_string())?;

    let timeframe = params
        .tf
        .or(params.timeframe)
        .map_or_else(Timeframe::default, |raw| Timeframe::parse(&raw));

    let geo = params
        .geo
        .or(params.country)
        .unwrap_or_else(|| config.default_geo.clone());
    let lang = params
        .hl
        .or(params.lang)
        .unwrap_or_else(|| config.default_lang.clone());

    let not_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let mut query = TrendQuery::new(provider, timeframe, LocaleTarget::new(&geo, &lang));
    query.category = not_blank(params.cat);
    query.filter = not_blank(params.q);
    query.limit = params.limit.filter(|l| *l > 0);
    Ok(query)
}

pub(super) async fn get_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<TrendsParams>,
) -> Result<Json<TrendResponse>, ApiError> {
    let query = build_query(params, &state.config)
        .map_err(|message| ApiError::new(req_id.0.clone(), "unknown_provider", message))?;

    let pipeline = Arc::clone(&state.pipeline);
    let run_query = query.clone();
    let response = state
        .cache
        .serve(&query, move || async move { pipeline.run(&run_query).await })
        .await;

    Ok(Json(response))
}
