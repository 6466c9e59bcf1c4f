//! Title tokenization and n-gram phrase extraction.
//!
//! Two parallel extraction rules: Hangul runs of two or more syllables
//! (no inter-word whitespace assumed) and Latin/digit runs (lowercased).
//! First-appearance order is preserved and within-title duplicates are
//! collapsed — later stages weight early tokens more heavily.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use trendpulse_core::LocaleTarget;

/// Minimum token/term length in characters.
pub const MIN_TERM_CHARS: usize = 2;

/// Longest phrase retained by the n-gram extractor, in characters.
const MAX_PHRASE_CHARS: usize = 30;

/// Weight multipliers for 1/2/3-gram phrases. Multi-word named entities
/// outrank the generic single words they contain.
pub const UNIGRAM_MULTIPLIER: f64 = 1.0;
pub const BIGRAM_MULTIPLIER: f64 = 1.5;
pub const TRIGRAM_MULTIPLIER: f64 = 2.0;

/// Korean stop list: function words plus source boilerplate that headline
/// feeds repeat endlessly.
const STOP_WORDS_KO: &[&str] = &[
    "그리고", "하지만", "그래서", "그런데", "이번", "오늘", "내일", "어제", "지금", "진짜",
    "정말", "완전", "결국", "최초", "최신", "공식", "예고", "티저", "속보", "단독", "영상",
    "뉴스", "기자", "사진", "전격", "충격", "근황", "논란", "모음", "하이라이트", "쇼츠",
];

/// English stop list: function words plus platform boilerplate.
const STOP_WORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "from",
    "is", "are", "was", "were", "be", "been", "this", "that", "these", "those", "it", "its",
    "you", "we", "they", "he", "she", "new", "vs", "how", "what", "why", "when", "where",
    "official", "breaking", "teaser", "trailer", "shorts", "live", "video", "news", "full",
    "episode", "ep", "update", "watch", "best", "top", "mv",
];

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Hangul}{2,}|[A-Za-z0-9]+").expect("token regex compiles"));

static HANGUL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Hangul}").expect("hangul regex compiles"));

/// A weighted n-gram phrase candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub phrase: String,
    pub multiplier: f64,
}

/// Returns true if `token` appears on either stop list.
///
/// Korean feeds mix English boilerplate freely ("MV teaser", "shorts"), so
/// both lists always apply regardless of the target language.
#[must_use]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS_KO.contains(&token) || STOP_WORDS_EN.contains(&token)
}

/// Split a sanitized title into filtered tokens, first-appearance order,
/// duplicates collapsed.
///
/// Tokens shorter than [`MIN_TERM_CHARS`], purely numeric tokens, and
/// stop-list tokens are discarded. Latin tokens are lowercased; Hangul runs
/// pass through unchanged.
#[must_use]
pub fn tokenize(title: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut tokens = Vec::new();

    for m in TOKEN_RE.find_iter(title) {
        let raw = m.as_str();
        let token = if HANGUL_RE.is_match(raw) {
            raw.to_string()
        } else {
            raw.to_ascii_lowercase()
        };

        if token.chars().count() < MIN_TERM_CHARS {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if is_stop_word(&token) {
            continue;
        }
        if seen.insert(token.clone()) {
            tokens.push(token);
        }
    }

    tokens
}

/// Extract weighted 1/2/3-gram phrases from a title.
///
/// N-grams span adjacent tokens of the filtered sequence; longer spans carry
/// higher multipliers. Phrases over [`MAX_PHRASE_CHARS`] characters are
/// dropped.
#[must_use]
pub fn extract_phrases(title: &str) -> Vec<Phrase> {
    let tokens = tokenize(title);
    let mut phrases = Vec::new();

    for token in &tokens {
        phrases.push(Phrase {
            phrase: token.clone(),
            multiplier: UNIGRAM_MULTIPLIER,
        });
    }
    for window in tokens.windows(2) {
        let joined = window.join(" ");
        if joined.chars().count() <= MAX_PHRASE_CHARS {
            phrases.push(Phrase {
                phrase: joined,
                multiplier: BIGRAM_MULTIPLIER,
            });
        }
    }
    for window in tokens.windows(3) {
        let joined = window.join(" ");
        if joined.chars().count() <= MAX_PHRASE_CHARS {
            phrases.push(Phrase {
                phrase: joined,
                multiplier: TRIGRAM_MULTIPLIER,
            });
        }
    }

    phrases
}

/// The usability filter applied to every term, related term, and candidate.
///
/// Rejects short, numeric, stop-listed (single tokens only), and garbled
/// strings. When the locale expects Hangul, terms must contain Hangul or be
/// plain ASCII alphanumerics/spaces — Korean feeds legitimately mix Latin
/// brand names, but other scripts are foreign-script noise there.
#[must_use]
pub fn usable_term(term: &str, locale: &LocaleTarget) -> bool {
    if term.chars().count() < MIN_TERM_CHARS {
        return false;
    }
    if term.contains('\u{FFFD}') {
        return false;
    }
    if term.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if !term.contains(' ') && is_stop_word(&term.to_ascii_lowercase()) {
        return false;
    }
    if locale.requires_hangul() {
        let has_hangul = HANGUL_RE.is_match(term);
        let plain_ascii = term
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ');
        if !has_hangul && !plain_ascii {
            return false;
        }
    }
    true
}
