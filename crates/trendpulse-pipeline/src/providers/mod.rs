//! Source-specific provider pipelines.
//!
//! Providers form a closed set: an unrecognized `source` value is rejected
//! at the boundary with [`PipelineError::UnknownProvider`], never silently
//! mapped to the mock provider.

mod forum;
mod mock;
mod news;
mod trends_rss;
mod video;

pub use mock::degraded_response;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Candidate, CooccurrenceIndex};
use crate::demand::DemandVerifier;
use crate::error::PipelineError;
use crate::fetch::FetchClient;
use crate::types::TrendQuery;

/// The closed set of provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Trend-feed RSS: entries already are keywords.
    TrendsRss,
    /// Flagship multi-source keyword fusion over news/trends/video/forum
    /// headlines, with demand verification.
    NewsKeywords,
    /// Video-platform popularity list.
    VideoTrends,
    /// Forum hot-post feed.
    ForumHot,
    /// Deterministic placeholder set; also the degraded-tier payload.
    Mock,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrendsRss => "trends",
            Self::NewsKeywords => "news",
            Self::VideoTrends => "videos",
            Self::ForumHot => "forum",
            Self::Mock => "mock",
        }
    }

    /// Parse a `source` query value.
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnknownProvider`] for anything outside the closed
    /// set — rejected here at the boundary, not deep inside dispatch.
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trends" | "trends_rss" => Ok(Self::TrendsRss),
            "news" | "keywords" => Ok(Self::NewsKeywords),
            "videos" | "video" => Ok(Self::VideoTrends),
            "forum" => Ok(Self::ForumHot),
            "mock" => Ok(Self::Mock),
            other => Err(PipelineError::UnknownProvider(other.to_string())),
        }
    }

    /// Smallest candidate pool this provider considers rankable.
    ///
    /// The trend feed is short but authoritative; tokenized providers need
    /// more mass before a ranking means anything.
    #[must_use]
    pub(crate) const fn min_viable_pool(self) -> usize {
        match self {
            Self::TrendsRss => 4,
            Self::Mock => 1,
            Self::NewsKeywords | Self::VideoTrends | Self::ForumHot => 8,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Upstream endpoint bases, overridable for tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub trends_rss_base: String,
    pub news_rss_base: String,
    pub video_api_base: String,
    pub forum_rss_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            trends_rss_base: "https://trends.google.com".to_string(),
            news_rss_base: "https://news.google.com".to_string(),
            video_api_base: "https://www.googleapis.com".to_string(),
            forum_rss_base: "https://www.reddit.com".to_string(),
        }
    }
}

/// Shared collaborators handed to every provider run.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub fetch: FetchClient,
    pub demand: DemandVerifier,
    pub endpoints: Endpoints,
}

/// What a provider run produces before normalization.
#[derive(Debug)]
pub(crate) struct ProviderOutput {
    /// Final ordering, best first.
    pub ranked: Vec<Candidate>,
    pub cooccur: CooccurrenceIndex,
    /// False when the keyword list itself is fabricated (mock).
    pub keywords_are_live: bool,
}

/// Dispatch one provider invocation.
pub(crate) async fn run(
    ctx: &ProviderContext,
    query: &TrendQuery,
) -> Result<ProviderOutput, PipelineError> {
    match query.provider {
        ProviderKind::TrendsRss => trends_rss::run(ctx, query).await,
        ProviderKind::NewsKeywords => news::run(ctx, query).await,
        ProviderKind::VideoTrends => video::run(ctx, query).await,
        ProviderKind::ForumHot => forum::run(ctx, query).await,
        ProviderKind::Mock => Ok(mock::run(query)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sources_parse_and_round_trip() {
        for (raw, kind) in [
            ("trends", ProviderKind::TrendsRss),
            ("news", ProviderKind::NewsKeywords),
            ("videos", ProviderKind::VideoTrends),
            ("forum", ProviderKind::ForumHot),
            ("mock", ProviderKind::Mock),
        ] {
            assert_eq!(ProviderKind::parse(raw).expect("parses"), kind);
            assert_eq!(kind.as_str(), raw);
        }
        assert_eq!(
            ProviderKind::parse(" Videos ").expect("case/space tolerant"),
            ProviderKind::VideoTrends
        );
    }

    #[test]
    fn unknown_source_is_a_typed_error() {
        let err = ProviderKind::parse("naver").expect_err("not in the closed set");
        match err {
            PipelineError::UnknownProvider(name) => assert_eq!(name, "naver"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn min_pool_sizes() {
        assert_eq!(ProviderKind::TrendsRss.min_viable_pool(), 4);
        assert_eq!(ProviderKind::NewsKeywords.min_viable_pool(), 8);
        assert_eq!(ProviderKind::Mock.min_viable_pool(), 1);
    }
}
