use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_GRAPHQL_URL: &str = "https://www.ratemyprofessors.com/graphql";

/// Foothill College on RateMyProfessors.
pub const DEFAULT_SCHOOL_ID: i64 = 1581;

pub const DEFAULT_SCRAPER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PROFRATE_ENV", "development"))?;

    let bind_addr = parse_addr("PROFRATE_BIND_ADDR", "0.0.0.0:5001")?;
    let log_level = or_default("PROFRATE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PROFRATE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PROFRATE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PROFRATE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("PROFRATE_SCRAPER_REQUEST_TIMEOUT_SECS", "10")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "PROFRATE_SCRAPER_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let scraper_user_agent = or_default("PROFRATE_SCRAPER_USER_AGENT", DEFAULT_SCRAPER_USER_AGENT);
    let graphql_url = or_default("PROFRATE_GRAPHQL_URL", DEFAULT_GRAPHQL_URL);

    let default_school_id = or_default(
        "PROFRATE_DEFAULT_SCHOOL_ID",
        &DEFAULT_SCHOOL_ID.to_string(),
    )
    .parse::<i64>()
    .map_err(|e| invalid("PROFRATE_DEFAULT_SCHOOL_ID", e.to_string()))?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        graphql_url,
        default_school_id,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PROFRATE_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
