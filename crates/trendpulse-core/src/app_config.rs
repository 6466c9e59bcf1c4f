use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, read once at startup and passed down by reference.
///
/// Everything has a default so the server starts with an empty environment;
/// the `TRENDPULSE_*` variables exist to tune deployments, not to gate them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Hard per-request wait for any upstream fetch.
    pub fetch_timeout_secs: u64,
    pub fetch_user_agent: String,
    /// Fresh-tier cache TTL; also advertised via Cache-Control.
    pub fresh_ttl_secs: u64,
    /// TTL for cached autocomplete demand lookups.
    pub demand_cache_ttl_secs: u64,
    /// Width of the bounded worker pool for demand lookups.
    pub demand_pool_width: usize,
    pub default_geo: String,
    pub default_lang: String,
}
