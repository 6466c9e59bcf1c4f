use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing logic is decoupled from the actual environment so tests can
/// drive it with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = match or_default("TRENDPULSE_ENV", "development").as_str() {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    };

    Ok(AppConfig {
        env,
        bind_addr: parse_addr("TRENDPULSE_BIND_ADDR", "0.0.0.0:8787")?,
        log_level: or_default("TRENDPULSE_LOG_LEVEL", "info"),
        fetch_timeout_secs: parse_u64("TRENDPULSE_FETCH_TIMEOUT_SECS", "8")?,
        fetch_user_agent: or_default(
            "TRENDPULSE_USER_AGENT",
            "trendpulse/0.1 (+https://github.com/trendpulse)",
        ),
        fresh_ttl_secs: parse_u64("TRENDPULSE_FRESH_TTL_SECS", "45")?,
        demand_cache_ttl_secs: parse_u64("TRENDPULSE_DEMAND_CACHE_TTL_SECS", "14400")?,
        demand_pool_width: parse_usize("TRENDPULSE_DEMAND_POOL_WIDTH", "6")?,
        default_geo: or_default("TRENDPULSE_DEFAULT_GEO", "KR"),
        default_lang: or_default("TRENDPULSE_DEFAULT_LANG", "ko"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, std::env::VarError> + 'a {
        move |key: &str| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn empty_env_yields_defaults() {
        let map = HashMap::new();
        let config = build_app_config(lookup_from(&map)).expect("defaults should parse");
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.fetch_timeout_secs, 8);
        assert_eq!(config.fresh_ttl_secs, 45);
        assert_eq!(config.demand_pool_width, 6);
        assert_eq!(config.default_geo, "KR");
        assert_eq!(config.default_lang, "ko");
    }

    #[test]
    fn overrides_are_honored() {
        let map = HashMap::from([
            ("TRENDPULSE_ENV", "production"),
            ("TRENDPULSE_BIND_ADDR", "127.0.0.1:9000"),
            ("TRENDPULSE_FRESH_TTL_SECS", "60"),
            ("TRENDPULSE_DEMAND_POOL_WIDTH", "4"),
        ]);
        let config = build_app_config(lookup_from(&map)).expect("overrides should parse");
        assert_eq!(config.env, Environment::Production);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.fresh_ttl_secs, 60);
        assert_eq!(config.demand_pool_width, 4);
    }

    #[test]
    fn invalid_number_is_rejected_with_var_name() {
        let map = HashMap::from([("TRENDPULSE_FETCH_TIMEOUT_SECS", "soon")]);
        let err = build_app_config(lookup_from(&map)).expect_err("should reject");
        match err {
            ConfigError::InvalidEnvVar { var, .. } => {
                assert_eq!(var, "TRENDPULSE_FETCH_TIMEOUT_SECS");
            }
            ConfigError::MissingEnvVar(v) => panic!("unexpected missing-var error: {v}"),
        }
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let map = HashMap::from([("TRENDPULSE_BIND_ADDR", "not-an-addr")]);
        assert!(build_app_config(lookup_from(&map)).is_err());
    }
}
