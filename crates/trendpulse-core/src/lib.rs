use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod app_config;
mod config;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Display window requested by the client.
///
/// The timeframe does not change what the upstream feeds return — trend
/// feeds have no historical query surface — it only selects how many
/// buckets the synthetic display series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Hour,
    Day,
    Week,
    Month,
}

impl Timeframe {
    /// Parse a `tf`/`timeframe` query value. Unrecognized values map to `Day`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hour" => Self::Hour,
            "week" => Self::Week,
            "month" => Self::Month,
            _ => Self::Day,
        }
    }

    /// Number of points in the display-only series for this window.
    #[must_use]
    pub const fn series_buckets(self) -> usize {
        match self {
            Self::Hour => 24,
            Self::Day => 7,
            Self::Week => 8,
            Self::Month => 12,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::Day
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized locale pair for one request: upper-cased region, lower-cased
/// language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocaleTarget {
    pub geo: String,
    pub lang: String,
}

impl LocaleTarget {
    #[must_use]
    pub fn new(geo: &str, lang: &str) -> Self {
        Self {
            geo: geo.trim().to_ascii_uppercase(),
            lang: lang.trim().to_ascii_lowercase(),
        }
    }

    /// Korean-language targets require at least one Hangul character in
    /// every retained keyword; other locales accept any script.
    #[must_use]
    pub fn requires_hangul(&self) -> bool {
        self.lang == "ko"
    }
}

impl Default for LocaleTarget {
    fn default() -> Self {
        Self::new("KR", "ko")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_parse_maps_known_values() {
        assert_eq!(Timeframe::parse("hour"), Timeframe::Hour);
        assert_eq!(Timeframe::parse("Week"), Timeframe::Week);
        assert_eq!(Timeframe::parse("MONTH"), Timeframe::Month);
        assert_eq!(Timeframe::parse("day"), Timeframe::Day);
    }

    #[test]
    fn timeframe_parse_falls_back_to_day() {
        assert_eq!(Timeframe::parse("fortnight"), Timeframe::Day);
        assert_eq!(Timeframe::parse(""), Timeframe::Day);
    }

    #[test]
    fn series_buckets_per_timeframe() {
        assert_eq!(Timeframe::Hour.series_buckets(), 24);
        assert_eq!(Timeframe::Day.series_buckets(), 7);
        assert_eq!(Timeframe::Week.series_buckets(), 8);
        assert_eq!(Timeframe::Month.series_buckets(), 12);
    }

    #[test]
    fn locale_target_normalizes_case() {
        let target = LocaleTarget::new("kr", "KO");
        assert_eq!(target.geo, "KR");
        assert_eq!(target.lang, "ko");
        assert!(target.requires_hangul());
    }

    #[test]
    fn non_korean_locale_does_not_require_hangul() {
        assert!(!LocaleTarget::new("US", "en").requires_hangul());
    }
}
