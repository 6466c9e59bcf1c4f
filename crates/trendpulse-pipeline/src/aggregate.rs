//! Multi-source observation folding.
//!
//! Each source contributes `(term, weight, source)` observations; the pool
//! accumulates a weighted score and a provenance set per normalized term.
//! Accumulation is strictly additive within one pass — re-observing a term
//! only ever raises its score and grows its source set.

use std::collections::{BTreeSet, HashMap};

use trendpulse_core::LocaleTarget;

use crate::tokenize::{extract_phrases, tokenize, usable_term};

/// Per-source trust multipliers. Hand-tuned hierarchy: the trend feed's own
/// ordering is the strongest evidence, a generic forum token the weakest.
/// These are configuration defaults, not derived values; tests pin them so
/// numeric drift shows up as a failed assertion.
pub const SOURCE_TRUST: &[(&str, f64)] = &[
    ("trends", 3.0),
    ("videos", 2.0),
    ("news", 1.5),
    ("forum", 1.0),
    ("autocomplete", 1.2),
];

/// Trust multiplier for a source name; unknown sources count at 1.0.
#[must_use]
pub fn source_trust(source: &str) -> f64 {
    SOURCE_TRUST
        .iter()
        .find(|(name, _)| *name == source)
        .map_or(1.0, |(_, w)| *w)
}

/// Positional weight for the item at `index` of a source list of `total`.
///
/// Upstream ordering encodes relevance: the front of the list counts full
/// weight, decaying linearly to a 0.2 floor at the tail.
#[must_use]
pub fn positional_weight(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction = index as f64 / total as f64;
    1.0 - fraction * 0.8
}

/// A keyword or phrase under consideration during one aggregation pass.
///
/// Lives exactly one provider invocation; never persisted.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Display form: the first-observed spelling.
    pub term: String,
    /// Accumulated weighted evidence; monotonically increasing.
    pub raw_score: f64,
    /// Names of contributing upstreams, no duplicates.
    pub sources: BTreeSet<String>,
}

/// One aggregation pass's candidate pool.
///
/// Terms are deduplicated case-insensitively; the retention filter
/// ([`usable_term`]) runs at observation time so nothing unusable ever
/// enters the pool.
#[derive(Debug)]
pub struct CandidatePool {
    locale: LocaleTarget,
    by_key: HashMap<String, usize>,
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    #[must_use]
    pub fn new(locale: LocaleTarget) -> Self {
        Self {
            locale,
            by_key: HashMap::new(),
            candidates: Vec::new(),
        }
    }

    /// Fold in one observation. Unusable terms are silently dropped.
    pub fn observe(&mut self, term: &str, weight: f64, source: &str) {
        let term = term.trim();
        if !usable_term(term, &self.locale) {
            return;
        }
        let contribution = weight * source_trust(source);
        let key = term.to_lowercase();
        if let Some(&idx) = self.by_key.get(&key) {
            let candidate = &mut self.candidates[idx];
            candidate.raw_score += contribution;
            candidate.sources.insert(source.to_string());
        } else {
            self.by_key.insert(key, self.candidates.len());
            let mut sources = BTreeSet::new();
            sources.insert(source.to_string());
            self.candidates.push(Candidate {
                term: term.to_string(),
                raw_score: contribution,
                sources,
            });
        }
    }

    /// Fold a source's title list through tokenization and phrase
    /// extraction, weighting by position within the list.
    pub fn observe_titles(&mut self, titles: &[String], source: &str) {
        for (index, title) in titles.iter().enumerate() {
            let weight = positional_weight(index, titles.len());
            for phrase in extract_phrases(title) {
                self.observe(&phrase.phrase, weight * phrase.multiplier, source);
            }
        }
    }

    /// Fold a source whose entries already are keywords (trend feeds):
    /// no tokenization, position weight only.
    pub fn observe_terms(&mut self, terms: &[String], source: &str) {
        for (index, term) in terms.iter().enumerate() {
            self.observe(term, positional_weight(index, terms.len()), source);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Consume the pool, yielding candidates in first-observation order.
    #[must_use]
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// Within-title co-occurrence counts, used for related-term extraction.
#[derive(Debug, Default)]
pub struct CooccurrenceIndex {
    counts: HashMap<String, HashMap<String, u32>>,
    display: HashMap<String, String>,
}

impl CooccurrenceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every ordered token pair within one title.
    pub fn ingest_title(&mut self, title: &str) {
        let tokens = tokenize(title);
        for a in &tokens {
            let key_a = a.to_lowercase();
            self.display.entry(key_a.clone()).or_insert_with(|| a.clone());
            for b in &tokens {
                if a == b {
                    continue;
                }
                *self
                    .counts
                    .entry(key_a.clone())
                    .or_default()
                    .entry(b.to_lowercase())
                    .or_insert(0) += 1;
            }
        }
    }

    /// Top co-occurring terms for `term`, excluding the term's own tokens
    /// and anything failing the usability filter. Deterministic order:
    /// count descending, then alphabetical.
    #[must_use]
    pub fn related(&self, term: &str, locale: &LocaleTarget, cap: usize) -> Vec<String> {
        let own_tokens: BTreeSet<String> =
            term.split_whitespace().map(str::to_lowercase).collect();

        let mut merged: HashMap<&str, u32> = HashMap::new();
        for token in &own_tokens {
            if let Some(neighbors) = self.counts.get(token) {
                for (neighbor, count) in neighbors {
                    if own_tokens.contains(neighbor) {
                        continue;
                    }
                    *merged.entry(neighbor.as_str()).or_insert(0) += count;
                }
            }
        }

        let mut ranked: Vec<(&str, u32)> = merged.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        ranked
            .into_iter()
            .filter_map(|(key, _)| self.display.get(key).cloned())
            .filter(|t| usable_term(t, locale))
            .take(cap)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ko() -> LocaleTarget {
        LocaleTarget::new("KR", "ko")
    }

    #[test]
    fn trust_multipliers_are_pinned() {
        // Tuned constants: drift here is a behavior change, not a bug fix.
        assert_eq!(source_trust("trends"), 3.0);
        assert_eq!(source_trust("videos"), 2.0);
        assert_eq!(source_trust("news"), 1.5);
        assert_eq!(source_trust("forum"), 1.0);
        assert_eq!(source_trust("autocomplete"), 1.2);
        assert_eq!(source_trust("somewhere-else"), 1.0);
    }

    #[test]
    fn positional_weight_is_front_loaded() {
        let first = positional_weight(0, 10);
        let fifth = positional_weight(4, 10);
        let last = positional_weight(9, 10);
        assert_eq!(first, 1.0);
        assert!(first > fifth && fifth > last);
        assert!(last >= 0.2);
    }

    #[test]
    fn repeated_observation_strictly_increases_score_and_sources() {
        let mut pool = CandidatePool::new(ko());
        pool.observe("소개팅", 1.0, "news");
        let after_first = pool.candidates[0].raw_score;

        pool.observe("소개팅", 0.5, "forum");
        let candidate = &pool.candidates[0];
        assert!(candidate.raw_score > after_first);
        assert_eq!(candidate.sources.len(), 2);

        // Same source again: score rises, source set does not.
        pool.observe("소개팅", 0.5, "forum");
        let candidate = &pool.candidates[0];
        assert_eq!(candidate.sources.len(), 2);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn case_insensitive_dedup_keeps_first_spelling() {
        let mut pool = CandidatePool::new(ko());
        pool.observe("NewJeans", 1.0, "news");
        pool.observe("newjeans", 1.0, "forum");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.candidates[0].term, "NewJeans");
    }

    #[test]
    fn two_source_scenario_beats_single_source() {
        let mut pool = CandidatePool::new(ko());
        let source_a = vec!["소개팅 잠수 썰".to_string(), "환승 이별 썰".to_string()];
        let source_b = vec!["소개팅 잠수".to_string()];
        pool.observe_titles(&source_a, "news");
        pool.observe_titles(&source_b, "forum");

        let candidates = pool.into_candidates();
        let get = |t: &str| candidates.iter().find(|c| c.term == t).expect("present");

        let shared = get("소개팅");
        assert_eq!(shared.sources.len(), 2, "observed by both A and B");
        assert!(shared.sources.contains("news") && shared.sources.contains("forum"));

        let single = get("환승");
        assert_eq!(single.sources.len(), 1);
        assert!(shared.raw_score > single.raw_score);
    }

    #[test]
    fn unusable_terms_never_enter_the_pool() {
        let mut pool = CandidatePool::new(ko());
        pool.observe("소\u{FFFD}개", 1.0, "news");
        pool.observe("1", 1.0, "news");
        pool.observe("공식", 1.0, "news");
        pool.observe("Привет", 1.0, "news");
        assert!(pool.is_empty());
    }

    #[test]
    fn trends_terms_outweigh_forum_terms_at_equal_position() {
        let mut trends_pool = CandidatePool::new(ko());
        trends_pool.observe_terms(&["월드컵".to_string()], "trends");
        let mut forum_pool = CandidatePool::new(ko());
        forum_pool.observe_terms(&["월드컵".to_string()], "forum");
        assert!(
            trends_pool.candidates[0].raw_score > forum_pool.candidates[0].raw_score,
            "trust hierarchy must hold"
        );
    }

    #[test]
    fn related_terms_exclude_self_and_cap() {
        let mut index = CooccurrenceIndex::new();
        index.ingest_title("손흥민 복귀 인터뷰");
        index.ingest_title("손흥민 복귀 소식");
        index.ingest_title("손흥민 부상");

        let related = index.related("손흥민", &ko(), 2);
        assert_eq!(related.len(), 2);
        assert!(!related.contains(&"손흥민".to_string()));
        assert_eq!(related[0], "복귀", "highest co-occurrence first");
    }

    #[test]
    fn related_terms_for_phrases_exclude_member_tokens() {
        let mut index = CooccurrenceIndex::new();
        index.ingest_title("손흥민 복귀 인터뷰");
        let related = index.related("손흥민 복귀", &ko(), 8);
        assert_eq!(related, vec!["인터뷰"]);
    }
}
