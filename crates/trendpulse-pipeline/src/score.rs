//! Candidate ranking: baseline raw-score ordering and the blended
//! composite used by the flagship keyword provider.

use std::collections::HashMap;

use crate::aggregate::Candidate;
use crate::error::PipelineError;

/// Composite blend weights: story-fit / multi-source consensus / demand.
/// Fixed at 45/35/20 for parity with the tuned originals; the pinning test
/// below treats drift as a behavior change.
pub const STORY_FIT_WEIGHT: f64 = 0.45;
pub const CONSENSUS_WEIGHT: f64 = 0.35;
pub const DEMAND_WEIGHT: f64 = 0.20;

/// Template keywords per category for the affinity classifier.
const CATEGORY_TEMPLATES: &[(&str, &[&str])] = &[
    (
        "sports",
        &[
            "경기", "승리", "이적", "감독", "득점", "리그", "올림픽", "월드컵", "선수",
            "match", "league", "goal", "cup",
        ],
    ),
    (
        "entertainment",
        &[
            "드라마", "배우", "아이돌", "컴백", "예능", "영화", "무대", "콘서트",
            "drama", "idol", "concert", "comeback",
        ],
    ),
    (
        "tech",
        &[
            "아이폰", "갤럭시", "반도체", "인공지능", "출시", "애플",
            "ai", "iphone", "galaxy", "chip", "robot",
        ],
    ),
    (
        "politics",
        &[
            "대통령", "국회", "선거", "정부", "장관", "의원", "여야",
            "election", "president", "minister",
        ],
    ),
];

/// Affinity of a term for a requested category: full weight on a template
/// match, reduced otherwise. No category filter means every term fits.
#[must_use]
pub fn category_affinity(term: &str, category: Option<&str>) -> f64 {
    let Some(category) = category else {
        return 1.0;
    };
    let needle = term.to_lowercase();
    let matched = CATEGORY_TEMPLATES
        .iter()
        .find(|(name, _)| *name == category.to_lowercase())
        .is_some_and(|(_, keywords)| keywords.iter().any(|kw| needle.contains(kw)));
    if matched {
        1.0
    } else {
        0.4
    }
}

/// Enforce the minimum viable pool size.
///
/// A sparse pool means the upstream signal was too thin to rank with any
/// confidence; callers treat this as a pipeline failure and fall back.
fn require_min_pool(got: usize, need: usize) -> Result<(), PipelineError> {
    if got < need {
        return Err(PipelineError::InsufficientSignal { got, need });
    }
    Ok(())
}

/// Rank candidates by accumulated raw score, descending.
///
/// The sort is stable: ties keep their first-observation order.
///
/// # Errors
///
/// [`PipelineError::InsufficientSignal`] when fewer than `min_pool`
/// candidates survived filtering.
pub fn rank_by_raw(
    mut candidates: Vec<Candidate>,
    min_pool: usize,
) -> Result<Vec<Candidate>, PipelineError> {
    require_min_pool(candidates.len(), min_pool)?;
    candidates.sort_by(|a, b| {
        b.raw_score
            .partial_cmp(&a.raw_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(candidates)
}

/// Rank candidates by the 45/35/20 blended composite.
///
/// - story fit: raw score normalized against the pool maximum, scaled by
///   category affinity;
/// - consensus: contributing-source count normalized against the pool
///   maximum;
/// - demand: verified search interest in `[0, 1]` keyed by lowercased term
///   (missing entries count as zero).
///
/// The composite decides ordering only; the displayed score stays the
/// rounded raw score.
///
/// # Errors
///
/// [`PipelineError::InsufficientSignal`] when fewer than `min_pool`
/// candidates survived filtering.
pub fn rank_blended(
    mut candidates: Vec<Candidate>,
    demand: &HashMap<String, f64>,
    category: Option<&str>,
    min_pool: usize,
) -> Result<Vec<Candidate>, PipelineError> {
    require_min_pool(candidates.len(), min_pool)?;

    let max_raw = candidates
        .iter()
        .map(|c| c.raw_score)
        .fold(f64::MIN, f64::max)
        .max(f64::EPSILON);
    #[allow(clippy::cast_precision_loss)]
    let max_sources = candidates
        .iter()
        .map(|c| c.sources.len())
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let composite = |c: &Candidate| -> f64 {
        let story = (c.raw_score / max_raw) * category_affinity(&c.term, category);
        #[allow(clippy::cast_precision_loss)]
        let consensus = c.sources.len() as f64 / max_sources;
        let demand_score = demand
            .get(&c.term.to_lowercase())
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        STORY_FIT_WEIGHT * story + CONSENSUS_WEIGHT * consensus + DEMAND_WEIGHT * demand_score
    };

    candidates.sort_by(|a, b| {
        composite(b)
            .partial_cmp(&composite(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(candidates)
}
