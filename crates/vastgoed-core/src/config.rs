use crate::app_config::{AppConfig, Environment};
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
/// Unlike [`load_app_config`], this does NOT load `.env` files; use it in tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional =
        |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.trim().is_empty()) };

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected true or false, got '{other}'"))),
        }
    };

    let altum_api_key = require("ALTUM_API_KEY")?;
    let ep_online_api_key = require("EP_ONLINE_API_KEY")?;
    let altum_sandbox_api_key = optional("ALTUM_SANDBOX_API_KEY");
    let gemini_api_key = optional("GEMINI_API_KEY");

    let env = parse_environment(&or_default("VASTGOED_ENV", "development"))?;
    let bind_addr = parse_addr("VASTGOED_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VASTGOED_LOG_LEVEL", "info");

    let use_sandbox = parse_bool("VASTGOED_USE_SANDBOX", "false")?;
    let altum_base_url = or_default("VASTGOED_ALTUM_BASE_URL", "https://api.altum.ai");
    let ep_online_base_url = or_default(
        "VASTGOED_EP_ONLINE_BASE_URL",
        "https://public.ep-online.nl/api/v5",
    );
    let gemini_base_url = or_default(
        "VASTGOED_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com/v1beta",
    );
    let gemini_model = or_default("VASTGOED_GEMINI_MODEL", "gemini-2.5-pro");
    let user_agent = or_default("VASTGOED_USER_AGENT", "vastgoed/0.1 (property-analysis)");

    let provider_timeout_secs = parse_u64("VASTGOED_PROVIDER_TIMEOUT_SECS", "30")?;
    let summarizer_timeout_secs = parse_u64("VASTGOED_SUMMARIZER_TIMEOUT_SECS", "120")?;

    let energy_label_batch_size = parse_usize("VASTGOED_ENERGY_LABEL_BATCH_SIZE", "3")?;
    if energy_label_batch_size == 0 {
        return Err(invalid(
            "VASTGOED_ENERGY_LABEL_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }
    let energy_label_batch_delay_ms = parse_u64("VASTGOED_ENERGY_LABEL_BATCH_DELAY_MS", "200")?;

    let area_result_limit = parse_u32("VASTGOED_AREA_RESULT_LIMIT", "15")?;
    let area_sort = or_default("VASTGOED_AREA_SORT", "datum");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        altum_api_key,
        altum_sandbox_api_key,
        use_sandbox,
        altum_base_url,
        ep_online_api_key,
        ep_online_base_url,
        gemini_api_key,
        gemini_base_url,
        gemini_model,
        user_agent,
        provider_timeout_secs,
        summarizer_timeout_secs,
        energy_label_batch_size,
        energy_label_batch_delay_ms,
        area_result_limit,
        area_sort,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VASTGOED_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
