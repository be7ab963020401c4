use crate::app_config::{AppConfig, Environment};
use crate::geo::GeoPoint;
use crate::radius::SearchRadius;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_coord = |var: &str, default: &str, limit: f64| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !value.is_finite() || value.abs() > limit {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be within ±{limit}"),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("POIMAP_ENV", "development"))?;
    let log_level = or_default("POIMAP_LOG_LEVEL", "info");

    let search_base_url = require("POIMAP_SEARCH_BASE_URL")?;
    let enrichment_base_url = lookup("POIMAP_ENRICHMENT_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| search_base_url.clone());
    let locale = or_default("POIMAP_LOCALE", "en");

    let request_timeout_secs = parse_u64("POIMAP_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("POIMAP_USER_AGENT", "poimap/0.1 (poi-discovery)");
    let max_concurrent_enrichments = parse_usize("POIMAP_MAX_CONCURRENT_ENRICHMENTS", "16")?;
    let max_retries = parse_u32("POIMAP_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("POIMAP_RETRY_BACKOFF_BASE_MS", "250")?;

    let default_center = GeoPoint::new(
        parse_coord("POIMAP_DEFAULT_LAT", "45.4642", 90.0)?,
        parse_coord("POIMAP_DEFAULT_LNG", "9.19", 180.0)?,
    );
    let default_radius = SearchRadius::clamped(i64::from(parse_u32(
        "POIMAP_DEFAULT_RADIUS_M",
        "5000",
    )?));
    let animation_window_ms = parse_u64("POIMAP_ANIMATION_WINDOW_MS", "600")?;

    Ok(AppConfig {
        env,
        log_level,
        search_base_url,
        enrichment_base_url,
        locale,
        request_timeout_secs,
        user_agent,
        max_concurrent_enrichments,
        max_retries,
        retry_backoff_base_ms,
        default_center,
        default_radius,
        animation_window_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POIMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
