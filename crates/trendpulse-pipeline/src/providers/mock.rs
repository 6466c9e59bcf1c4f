//! Deterministic placeholder provider.
//!
//! Serves two duties: the explicit `source=mock` provider for dashboard
//! development, and the degraded tier when a live provider fails with no
//! last-known-good entry. Either way the payload is loudly flagged — the
//! metadata never lets mock data pass for live data.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::aggregate::{Candidate, CooccurrenceIndex};
use crate::normalize::build_items;
use crate::providers::ProviderOutput;
use crate::types::{TrendMeta, TrendQuery, TrendResponse};

/// Fixed placeholder terms, strongest first. Chosen to look plausible on a
/// Korean dashboard without ever colliding with a real trending set.
const PLACEHOLDER_TERMS: &[&str] = &[
    "주말 날씨",
    "프로야구 일정",
    "환율 전망",
    "신작 드라마",
    "전기차 보조금",
    "올림픽 중계",
    "부동산 정책",
    "아이돌 컴백",
    "여행 특가",
    "건강검진 예약",
    "수능 일정",
    "연말 정산",
];

fn placeholder_candidates() -> Vec<Candidate> {
    let total = PLACEHOLDER_TERMS.len();
    PLACEHOLDER_TERMS
        .iter()
        .enumerate()
        .map(|(index, term)| {
            #[allow(clippy::cast_precision_loss)]
            let raw_score = (total - index) as f64 * 10.0;
            Candidate {
                term: (*term).to_string(),
                raw_score,
                sources: BTreeSet::from(["mock".to_string()]),
            }
        })
        .collect()
}

// Query-specific shaping (filter, limit, series) happens in the shared
// normalization step, same as every live provider.
pub(crate) fn run(_query: &TrendQuery) -> ProviderOutput {
    ProviderOutput {
        ranked: placeholder_candidates(),
        cooccur: CooccurrenceIndex::new(),
        keywords_are_live: false,
    }
}

/// Build the degraded-tier payload returned when a provider fails and no
/// stale entry exists. `reason` records why live data was unavailable.
#[must_use]
pub fn degraded_response(query: &TrendQuery, reason: Option<String>) -> TrendResponse {
    let cooccur = CooccurrenceIndex::new();
    let items = build_items(&placeholder_candidates(), &cooccur, query);
    TrendResponse {
        items,
        meta: TrendMeta {
            source: query.provider.as_str().to_string(),
            is_mock: true,
            keywords_are_live: false,
            series_is_synthetic: true,
            stale: None,
            stale_reason: reason,
            fetched_at: Utc::now(),
            took_ms: 0,
        },
    }
}
