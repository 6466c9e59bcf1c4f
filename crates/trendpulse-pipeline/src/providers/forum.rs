//! Forum hot-post provider: lowest-trust source, plain RSS of post titles.

use crate::aggregate::{CandidatePool, CooccurrenceIndex};
use crate::error::PipelineError;
use crate::feed::parse_feed_titles;
use crate::providers::{ProviderContext, ProviderKind, ProviderOutput};
use crate::score::rank_by_raw;
use crate::types::TrendQuery;

pub(crate) fn hot_url(base: &str) -> String {
    format!("{base}/r/korea/hot/.rss?limit=50")
}

pub(crate) async fn fetch_titles(ctx: &ProviderContext) -> Result<Vec<String>, PipelineError> {
    let url = hot_url(&ctx.endpoints.forum_rss_base);
    let fetched = ctx.fetch.fetch_text(&url).await?;
    parse_feed_titles(&fetched.text)
}

pub(crate) async fn run(
    ctx: &ProviderContext,
    query: &TrendQuery,
) -> Result<ProviderOutput, PipelineError> {
    let titles = fetch_titles(ctx).await?;
    tracing::debug!(count = titles.len(), "forum hot titles");

    let mut pool = CandidatePool::new(query.locale.clone());
    pool.observe_titles(&titles, "forum");

    let mut cooccur = CooccurrenceIndex::new();
    for title in &titles {
        cooccur.ingest_title(title);
    }

    let ranked = rank_by_raw(
        pool.into_candidates(),
        ProviderKind::ForumHot.min_viable_pool(),
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
    use trendpulse_core::{LocaleTarget, Timeframe};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn atom_forum_feed_ranks_tokens() {
        let server = MockServer::start().await;
        let entries: String = [
            "소개팅 잠수 썰 공유",
            "환승 이별 경험담 정리",
            "부동산 전망 토론",
            "대학원 진학 고민 상담",
            "자취 요리 추천 목록",
        ]
        .iter()
        .map(|t| format!("<entry><title>{t}</title></entry>"))
        .collect();
        Mock::given(method("GET"))
            .and(path("/r/korea/hot/.rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<?xml version="1.0" encoding="utf-8"?><feed>{entries}</feed>"#
            )))
            .mount(&server)
            .await;

        let fetch = FetchClient::new(5, "trendpulse-test").expect("client builds");
        let ctx = ProviderContext {
            demand: DemandVerifier::new(fetch.clone(), Duration::from_secs(60), 2),
            fetch,
            endpoints: Endpoints {
                trends_rss_base: server.uri(),
                news_rss_base: server.uri(),
                video_api_base: server.uri(),
                forum_rss_base: server.uri(),
            },
        };
        let query = TrendQuery::new(
            ProviderKind::ForumHot,
            Timeframe::Day,
            LocaleTarget::new("KR", "ko"),
        );

        let output = run(&ctx, &query).await.expect("provider succeeds");
        assert!(output.ranked.len() >= 8, "tokenized pool clears the minimum");
        assert!(output
            .ranked
            .iter()
            .all(|c| c.sources.contains("forum") && c.sources.len() == 1));
    }
}
