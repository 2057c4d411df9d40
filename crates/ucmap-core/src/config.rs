use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://ledax-uc.onrender.com";
const OVERLAY_RELATIVE_PATH: &str = "/static/brasil_estados.geojson";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// configuration pointed at the production backend.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let env = parse_environment(&or_default("UCMAP_ENV", "development"))?;
    let log_level = or_default("UCMAP_LOG_LEVEL", "info");

    let api_base_url = parse_base_url(&or_default("UCMAP_API_BASE_URL", DEFAULT_API_BASE_URL))?;
    let overlay_url = lookup("UCMAP_OVERLAY_URL")
        .unwrap_or_else(|_| format!("{api_base_url}{OVERLAY_RELATIVE_PATH}"));

    let request_timeout_secs = parse_u64("UCMAP_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "UCMAP_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    let max_retries = parse_u32("UCMAP_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("UCMAP_RETRY_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default("UCMAP_USER_AGENT", "ucmap/0.1 (unit-map)");

    let palette_path = lookup("UCMAP_PALETTE_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let token_path = PathBuf::from(or_default("UCMAP_TOKEN_PATH", "./.ucmap/user_token"));

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        overlay_url,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        user_agent,
        palette_path,
        token_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "UCMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Accepts only `http(s)://` origins and strips trailing slashes.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "UCMAP_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
