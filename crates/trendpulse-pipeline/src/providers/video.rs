//! Video-platform popularity provider.
//!
//! The upstream JSON is schema-fragile; every field we touch is decoded
//! once here into typed optionals, so nothing downstream ever re-checks
//! for absent fields.

use serde::Deserialize;

use crate::aggregate::{CandidatePool, CooccurrenceIndex};
use crate::error::PipelineError;
use crate::providers::{ProviderContext, ProviderKind, ProviderOutput};
use crate::score::rank_by_raw;
use crate::types::TrendQuery;

const MAX_RESULTS: usize = 50;

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoEntry>,
}

#[derive(Debug, Deserialize)]
struct VideoEntry {
    snippet: Option<VideoSnippet>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: Option<String>,
}

pub(crate) fn popular_url(base: &str, geo: &str) -> String {
    format!(
        "{base}/youtube/v3/videos?part=snippet&chart=mostPopular&regionCode={geo}&maxResults={MAX_RESULTS}"
    )
}

/// Fetch the popularity list and return its usable titles, list order.
pub(crate) async fn fetch_titles(
    ctx: &ProviderContext,
    geo: &str,
) -> Result<Vec<String>, PipelineError> {
    let url = popular_url(&ctx.endpoints.video_api_base, geo);
    let Some(json) = ctx.fetch.fetch_json(&url).await? else {
        return Err(PipelineError::Decode(
            "video list body was not JSON".to_string(),
        ));
    };
    let parsed: VideoListResponse = serde_json::from_value(json)
        .map_err(|e| PipelineError::Decode(format!("video list shape: {e}")))?;

    // Bodies leave the fetch layer already sanitized; only length needs
    // checking here.
    Ok(parsed
        .items
        .into_iter()
        .filter_map(|entry| entry.snippet.and_then(|s| s.title))
        .filter(|title| title.chars().count() >= 2)
        .collect())
}

pub(crate) async fn run(
    ctx: &ProviderContext,
    query: &TrendQuery,
) -> Result<ProviderOutput, PipelineError> {
    let titles = fetch_titles(ctx, &query.locale.geo).await?;
    tracing::debug!(count = titles.len(), "video popularity titles");

    let mut pool = CandidatePool::new(query.locale.clone());
    pool.observe_titles(&titles, "videos");

    let mut cooccur = CooccurrenceIndex::new();
    for title in &titles {
        cooccur.ingest_title(title);
    }

    let ranked = rank_by_raw(
        pool.into_candidates(),
        ProviderKind::VideoTrends.min_viable_pool(),
    )?;
    Ok(ProviderOutput {
        ranked,
        cooccur,
        keywords_are_live: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::DemandVerifier;
    use crate::fetch::FetchClient;
    use crate::providers::Endpoints;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(base: &str) -> ProviderContext {
        let fetch = FetchClient::new(5, "trendpulse-test").expect("client builds");
        ProviderContext {
            demand: DemandVerifier::new(fetch.clone(), Duration::from_secs(60), 2),
            fetch,
            endpoints: Endpoints {
                trends_rss_base: base.to_string(),
                news_rss_base: base.to_string(),
                video_api_base: base.to_string(),
                forum_rss_base: base.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn absent_optional_fields_are_skipped_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("chart", "mostPopular"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                serde_json::json!({
                    "items": [
                        { "snippet": { "title": "손흥민 인터뷰 전체 영상입니다" } },
                        { "snippet": {} },
                        {},
                        { "snippet": { "title": "월드컵 하이라이트 모음 정리" } }
                    ]
                })
                .to_string(),
            ))
            .mount(&server)
            .await;

        let ctx = context(&server.uri());
        let titles = fetch_titles(&ctx, "KR").await.expect("fetch succeeds");
        assert_eq!(titles.len(), 2, "entries without titles drop out");
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>quota</html>"))
            .mount(&server)
            .await;

        let ctx = context(&server.uri());
        let err = fetch_titles(&ctx, "KR").await.expect_err("not JSON");
        assert!(matches!(err, PipelineError::Decode(_)));
    }
}
