//! Shaping ranked candidates into the uniform client-facing item schema.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use trendpulse_core::Timeframe;

use crate::aggregate::{Candidate, CooccurrenceIndex};
use crate::grade::grade_for_rank;
use crate::types::{RankedItem, TrendQuery};

/// Cap on related terms per item.
pub const RELATED_TERMS_CAP: usize = 8;

/// Default result-set cap for high-volume providers.
pub const DEFAULT_ITEM_CAP: usize = 50;

/// Build the final item list from ranked candidates.
///
/// Applies the `q` substring filter (re-ranking positions without
/// re-scoring), caps the set, assigns dense 1-based ranks, grades by
/// position within the retained set, and attaches related terms, links,
/// and the synthetic display series.
#[must_use]
pub fn build_items(
    ranked: &[Candidate],
    cooccur: &CooccurrenceIndex,
    query: &TrendQuery,
) -> Vec<RankedItem> {
    let cap = query.limit.unwrap_or(DEFAULT_ITEM_CAP).max(1);

    let retained: Vec<&Candidate> = ranked
        .iter()
        .filter(|c| match &query.filter {
            Some(q) => c.term.to_lowercase().contains(&q.to_lowercase()),
            None => true,
        })
        .take(cap)
        .collect();

    let total = retained.len();
    retained
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let rank = index + 1;
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let score = candidate.raw_score.round().max(0.0) as u64;
            let rank_display = u32::try_from(rank).unwrap_or(u32::MAX);
            RankedItem {
                rank: rank_display,
                term: candidate.term.clone(),
                score,
                grade: grade_for_rank(rank, total),
                related_terms: cooccur.related(&candidate.term, &query.locale, RELATED_TERMS_CAP),
                links: build_links(&candidate.term, query),
                series: synthetic_series(&candidate.term, query.timeframe),
            }
        })
        .collect()
}

/// Constructed outbound links for a term. Never fetched, only rendered.
fn build_links(term: &str, query: &TrendQuery) -> BTreeMap<String, String> {
    let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC).to_string();
    let geo = &query.locale.geo;
    let lang = &query.locale.lang;
    BTreeMap::from([
        (
            "search".to_string(),
            format!("https://www.google.com/search?q={encoded}&hl={lang}"),
        ),
        (
            "trends".to_string(),
            format!("https://trends.google.com/trends/explore?q={encoded}&geo={geo}"),
        ),
        (
            "youtube".to_string(),
            format!("https://www.youtube.com/results?search_query={encoded}"),
        ),
        (
            "news".to_string(),
            format!("https://news.google.com/search?q={encoded}&hl={lang}"),
        ),
    ])
}

/// Display-only series: a deterministic hash-seeded walk per
/// (term, timeframe), so repeated requests and stale fallbacks render the
/// same chart. Always flagged synthetic in response metadata.
fn synthetic_series(term: &str, timeframe: Timeframe) -> Vec<u32> {
    let buckets = timeframe.series_buckets();
    let mut state = fnv1a(term) ^ (buckets as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);

    let mut value = i64::try_from(30 + state % 41).unwrap_or(50);
    let mut series = Vec::with_capacity(buckets);
    for _ in 0..buckets {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let delta = i64::try_from((state >> 33) % 21).unwrap_or(10) - 10;
        value = (value + delta).clamp(5, 100);
        series.push(u32::try_from(value).unwrap_or(5));
    }
    series
}

fn fnv1a(input: &str) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325_u64;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}
