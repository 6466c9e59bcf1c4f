//! Flagship keyword provider: fuses the trend feed, news headlines, video
//! popularity titles, and forum hot posts into one candidate pool, then
//! ranks with the blended composite plus demand verification.
//!
//! Individual source failures are logged and skipped; the run only fails
//! when the surviving pool is too thin to rank.

use crate::aggregate::{CandidatePool, CooccurrenceIndex};
use crate::error::PipelineError;
use crate::feed::parse_feed_titles;
use crate::providers::{forum, trends_rss, video, ProviderContext, ProviderKind, ProviderOutput};
use crate::score::rank_blended;
use crate::types::TrendQuery;

/// Demand lookups are issued for the strongest candidates only; the tail
/// would waste quota on terms that cannot reach the top anyway.
const DEMAND_LOOKUP_CAP: usize = 20;

pub(crate) fn news_feed_url(base: &str, query: &TrendQuery) -> String {
    let geo = &query.locale.geo;
    let lang = &query.locale.lang;
    match &query.category {
        Some(category) => format!(
            "{base}/rss/headlines/section/topic/{}?hl={lang}&gl={geo}&ceid={geo}:{lang}",
            category.to_ascii_uppercase()
        ),
        None => format!("{base}/rss?hl={lang}&gl={geo}&ceid={geo}:{lang}"),
    }
}

pub(crate) async fn run(
    ctx: &ProviderContext,
    query: &TrendQuery,
) -> Result<ProviderOutput, PipelineError> {
    let mut pool = CandidatePool::new(query.locale.clone());
    let mut cooccur = CooccurrenceIndex::new();

    // Fold order is fixed: trends, news, videos, forum. Accumulation is
    // commutative, but the first-recorded source entry shows up first in
    // diagnostics.
    let trends_url = trends_rss::feed_url(&ctx.endpoints.trends_rss_base, &query.locale.geo);
    match fetch_titles(ctx, &trends_url).await {
        Ok(terms) => {
            tracing::debug!(count = terms.len(), "collected trend feed terms");
            for term in &terms {
                cooccur.ingest_title(term);
            }
            pool.observe_terms(&terms, "trends");
        }
        Err(e) => {
            tracing::warn!(source = "trends", error = %e, "trend feed fetch failed");
        }
    }

    let news_url = news_feed_url(&ctx.endpoints.news_rss_base, query);
    match fetch_titles(ctx, &news_url).await {
        Ok(titles) => {
            tracing::debug!(count = titles.len(), "collected news headlines");
            for title in &titles {
                cooccur.ingest_title(title);
            }
            pool.observe_titles(&titles, "news");
        }
        Err(e) => {
            tracing::warn!(source = "news", error = %e, "news feed fetch failed");
        }
    }

    match video::fetch_titles(ctx, &query.locale.geo).await {
        Ok(titles) => {
            tracing::debug!(count = titles.len(), "collected video titles");
            for title in &titles {
                cooccur.ingest_title(title);
            }
            pool.observe_titles(&titles, "videos");
        }
        Err(e) => {
            tracing::warn!(source = "videos", error = %e, "video list fetch failed");
        }
    }

    match forum::fetch_titles(ctx).await {
        Ok(titles) => {
            tracing::debug!(count = titles.len(), "collected forum titles");
            for title in &titles {
                cooccur.ingest_title(title);
            }
            pool.observe_titles(&titles, "forum");
        }
        Err(e) => {
            tracing::warn!(source = "forum", error = %e, "forum feed fetch failed");
        }
    }

    let mut candidates = pool.into_candidates();

    // Verify demand for the strongest candidates before blending.
    candidates.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let lookup_terms: Vec<String> = candidates
        .iter()
        .take(DEMAND_LOOKUP_CAP)
        .map(|c| c.term.clone())
        .collect();
    let demand = ctx.demand.verify(&lookup_terms, &query.locale.lang).await;

    let ranked = rank_blended(
        candidates,
        &demand,
        query.category.as_deref(),
        ProviderKind::NewsKeywords.min_viable_pool(),
    )?;

    Ok(ProviderOutput {
        ranked,
        cooccur,
        keywords_are_live: true,
    })
}

async fn fetch_titles(ctx: &ProviderContext, url: &str) -> Result<Vec<String>, PipelineError> {
    let fetched = ctx.fetch.fetch_text(url).await?;
    parse_feed_titles(&fetched.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::DemandVerifier;
    use crate::fetch::FetchClient;
    use crate::providers::Endpoints;
    use std::time::Duration;
    use trendpulse_core::{LocaleTarget, Timeframe};
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(base: &str) -> ProviderContext {
        let fetch = FetchClient::new(5, "trendpulse-test").expect("client builds");
        ProviderContext {
            demand: DemandVerifier::new(fetch.clone(), Duration::from_secs(60), 2)
                .with_base_url(base),
            fetch,
            endpoints: Endpoints {
                trends_rss_base: base.to_string(),
                news_rss_base: base.to_string(),
                video_api_base: base.to_string(),
                forum_rss_base: base.to_string(),
            },
        }
    }

    fn query() -> TrendQuery {
        TrendQuery::new(
            ProviderKind::NewsKeywords,
            Timeframe::Day,
            LocaleTarget::new("KR", "ko"),
        )
    }

    fn feed(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|t| format!("<item><title>{t}</title></item>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>{items}</channel></rss>"#
        )
    }

    #[tokio::test]
    async fn survives_partial_source_failure() {
        let server = MockServer::start().await;
        // Trend feed is down; the rest answer.
        Mock::given(method("GET"))
            .and(path_regex(r"^/trends/.*"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/rss$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[
                "손흥민 복귀 임박 소식",
                "월드컵 예선 결과 정리",
                "환율 급등 원인 분석",
                "아이폰 신모델 공개 행사",
                "전기차 보조금 개편 발표",
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/youtube/.*"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                serde_json::json!({
                    "items": [
                        { "snippet": { "title": "손흥민 골 모음집 하이라이트" } },
                        { "snippet": { "title": "월드컵 명장면 다시보기" } }
                    ]
                })
                .to_string(),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/r/.*"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[
                "손흥민 경기력 토론",
                "부동산 전망 이야기",
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/complete/search$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["q", []]"#))
            .mount(&server)
            .await;

        let ctx = context(&server.uri());
        let output = run(&ctx, &query()).await.expect("three live sources suffice");

        assert!(output.keywords_are_live);
        let shared = output
            .ranked
            .iter()
            .find(|c| c.term == "손흥민")
            .expect("손흥민 seen by news, videos, and forum");
        assert_eq!(shared.sources.len(), 3);
        // Multi-source consensus puts it on top of the blend.
        assert_eq!(output.ranked[0].term, "손흥민");
    }

    #[tokio::test]
    async fn all_sources_down_is_insufficient_signal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let ctx = context(&server.uri());
        let err = run(&ctx, &query()).await.expect_err("nothing to rank");
        assert!(matches!(err, PipelineError::InsufficientSignal { got: 0, .. }));
    }
}
