use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendpulse_core::{LocaleTarget, Timeframe};

use crate::providers::ProviderKind;

/// One normalized trend request, decoded once at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendQuery {
    pub provider: ProviderKind,
    pub timeframe: Timeframe,
    pub locale: LocaleTarget,
    /// Category filter, passed through to providers that support it.
    pub category: Option<String>,
    /// Post-hoc substring filter over final terms (`q`); re-ranks, never
    /// re-scores.
    pub filter: Option<String>,
    pub limit: Option<usize>,
}

impl TrendQuery {
    #[must_use]
    pub fn new(provider: ProviderKind, timeframe: Timeframe, locale: LocaleTarget) -> Self {
        Self {
            provider,
            timeframe,
            locale,
            category: None,
            filter: None,
            limit: None,
        }
    }

    /// Canonical cache key: every parameter that changes the payload is part
    /// of the key, absent optionals serialize as `-`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.provider.as_str(),
            self.timeframe,
            self.locale.geo,
            self.locale.lang,
            opt(&self.category),
            opt(&self.filter),
            self.limit.map_or_else(|| "-".to_string(), |l| l.to_string()),
        )
    }
}

/// The externally visible, scored form of a retained candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    /// 1-based, dense; ties broken by stable input order.
    pub rank: u32,
    pub term: String,
    /// Display form of the accumulated score, integer-rounded.
    pub score: u64,
    /// Position-based 0–100 bucket, derived from rank and pool size only.
    pub grade: u8,
    pub related_terms: Vec<String>,
    /// Constructed outbound search links, never fetched.
    pub links: BTreeMap<String, String>,
    /// Display-only synthetic series; `meta.series_is_synthetic` is always
    /// true for these.
    pub series: Vec<u32>,
}

/// Trust disclosure attached to every payload, live or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendMeta {
    pub source: String,
    pub is_mock: bool,
    pub keywords_are_live: bool,
    pub series_is_synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub took_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendResponse {
    pub items: Vec<RankedItem>,
    pub meta: TrendMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_covers_all_parameters() {
        let mut query = TrendQuery::new(
            ProviderKind::NewsKeywords,
            Timeframe::Day,
            LocaleTarget::new("kr", "KO"),
        );
        assert_eq!(query.cache_key(), "news|day|KR|ko|-|-|-");

        query.category = Some("sports".to_string());
        query.filter = Some("이적".to_string());
        query.limit = Some(20);
        assert_eq!(query.cache_key(), "news|day|KR|ko|sports|이적|20");
    }

    #[test]
    fn meta_serializes_camel_case_and_elides_stale() {
        let meta = TrendMeta {
            source: "news".to_string(),
            is_mock: false,
            keywords_are_live: true,
            series_is_synthetic: true,
            stale: None,
            stale_reason: None,
            fetched_at: Utc::now(),
            took_ms: 12,
        };
        let json = serde_json::to_value(&meta).expect("meta serializes");
        assert!(json.get("isMock").is_some());
        assert!(json.get("keywordsAreLive").is_some());
        assert!(json.get("seriesIsSynthetic").is_some());
        assert!(json.get("stale").is_none());
        assert!(json.get("staleReason").is_none());
    }
}
