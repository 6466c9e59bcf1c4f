//! Trend-feed RSS provider: entries are keywords already, so there is no
//! tokenization — the feed's own ordering carries the weight.

use crate::aggregate::{CandidatePool, CooccurrenceIndex};
use crate::error::PipelineError;
use crate::feed::parse_feed_titles;
use crate::providers::{ProviderContext, ProviderKind, ProviderOutput};
use crate::score::rank_by_raw;
use crate::types::TrendQuery;

pub(crate) fn feed_url(base: &str, geo: &str) -> String {
    format!("{base}/trends/trendingsearches/daily/rss?geo={geo}")
}

pub(crate) async fn run(
    ctx: &ProviderContext,
    query: &TrendQuery,
) -> Result<ProviderOutput, PipelineError> {
    let url = feed_url(&ctx.endpoints.trends_rss_base, &query.locale.geo);
    let fetched = ctx.fetch.fetch_text(&url).await?;
    let mut terms = parse_feed_titles(&fetched.text)?;

    // The upstream occasionally repeats an entry; uniqueness matters here
    // because position within the list is the score.
    let mut seen = std::collections::HashSet::new();
    terms.retain(|t| seen.insert(t.to_lowercase()));

    tracing::debug!(count = terms.len(), geo = %query.locale.geo, "trend feed entries");

    let mut pool = CandidatePool::new(query.locale.clone());
    pool.observe_terms(&terms, "trends");

    let mut cooccur = CooccurrenceIndex::new();
    for term in &terms {
        cooccur.ingest_title(term);
    }

    let ranked = rank_by_raw(
        pool.into_candidates(),
        ProviderKind::TrendsRss.min_viable_pool(),
    )?;
    Ok(ProviderOutput {
        ranked,
        cooccur,
        keywords_are_live: true,
    })
}
