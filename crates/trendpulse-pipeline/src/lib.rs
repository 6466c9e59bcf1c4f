//! Trending-keyword aggregation pipeline.
//!
//! Pulls titles from trend/news/video/forum feeds, tokenizes them into
//! keyword and phrase candidates, fuses observations across sources with a
//! weighted trust hierarchy, ranks and grades the survivors, and serves the
//! result through a two-tier cache that degrades gracefully when upstreams
//! fail.

pub mod aggregate;
pub mod cache;
pub mod demand;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod grade;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod score;
pub mod tokenize;
pub mod types;

pub use cache::TrendCache;
pub use error::PipelineError;
pub use pipeline::TrendPipeline;
pub use providers::{Endpoints, ProviderContext, ProviderKind};
pub use types::{RankedItem, TrendMeta, TrendQuery, TrendResponse};
