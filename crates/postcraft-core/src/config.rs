use std::time::Duration;

use chrono::Weekday;

use crate::app_config::{AppConfig, Backoff, BestPostingTime, EngagementWeights, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
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
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let env = parse_environment(&or_default("POSTCRAFT_ENV", "development"))?;
    let log_level = or_default("POSTCRAFT_LOG_LEVEL", "info");
    let profiles_path = PathBuf::from(or_default(
        "POSTCRAFT_PROFILES_PATH",
        "./config/profiles.yaml",
    ));
    let data_dir = PathBuf::from(or_default("POSTCRAFT_DATA_DIR", "./data"));
    let feed_base_url = or_default("POSTCRAFT_FEED_BASE_URL", "https://www.linkedin.com");
    let session_cookie = optional("POSTCRAFT_SESSION_COOKIE");

    let scraper_request_timeout_secs = parse_u64("POSTCRAFT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("POSTCRAFT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_pages = parse_usize("POSTCRAFT_SCRAPER_MAX_PAGES", "10")?;
    let scraper_inter_request_delay_ms =
        parse_u64("POSTCRAFT_SCRAPER_INTER_REQUEST_DELAY_MS", "3000")?;
    let scraper_inter_profile_delay_ms =
        parse_u64("POSTCRAFT_SCRAPER_INTER_PROFILE_DELAY_MS", "5000")?;

    let retry_max_attempts = parse_u32("POSTCRAFT_RETRY_MAX_ATTEMPTS", "3")?;
    if retry_max_attempts == 0 {
        return Err(invalid(
            "POSTCRAFT_RETRY_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let backoff_base_ms = parse_u64("POSTCRAFT_RETRY_BACKOFF_BASE_MS", "1000")?;
    let backoff_max_ms = parse_u64("POSTCRAFT_RETRY_BACKOFF_MAX_MS", "60000")?;
    let retry_backoff = parse_backoff(
        &or_default("POSTCRAFT_RETRY_BACKOFF", "exponential"),
        backoff_base_ms,
        backoff_max_ms,
    )?;

    let engagement_weights =
        parse_engagement_weights(&or_default("POSTCRAFT_ENGAGEMENT_WEIGHTS", "1.0,1.0,1.0"))?;

    let candidate_count = parse_usize("POSTCRAFT_CANDIDATE_COUNT", "3")?;
    if candidate_count == 0 {
        return Err(invalid(
            "POSTCRAFT_CANDIDATE_COUNT",
            "must be at least 1".to_string(),
        ));
    }

    let best_posting_time = optional("POSTCRAFT_BEST_POSTING_TIME")
        .map(|raw| parse_best_posting_time(&raw))
        .transpose()?;

    let completion_api_key =
        optional("POSTCRAFT_COMPLETION_API_KEY").or_else(|| optional("GROQ_API_KEY"));
    let completion_base_url = or_default(
        "POSTCRAFT_COMPLETION_BASE_URL",
        "https://api.groq.com/openai/v1",
    );
    let completion_model = or_default("POSTCRAFT_COMPLETION_MODEL", "llama-3.3-70b-versatile");
    let completion_temperature = or_default("POSTCRAFT_COMPLETION_TEMPERATURE", "0.7")
        .parse::<f32>()
        .map_err(|e| invalid("POSTCRAFT_COMPLETION_TEMPERATURE", e.to_string()))?;
    let completion_max_tokens = parse_u32("POSTCRAFT_COMPLETION_MAX_TOKENS", "1500")?;

    Ok(AppConfig {
        env,
        log_level,
        profiles_path,
        data_dir,
        feed_base_url,
        session_cookie,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_pages,
        scraper_inter_request_delay_ms,
        scraper_inter_profile_delay_ms,
        retry_max_attempts,
        retry_backoff,
        engagement_weights,
        candidate_count,
        best_posting_time,
        completion_api_key,
        completion_base_url,
        completion_model,
        completion_temperature,
        completion_max_tokens,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POSTCRAFT_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_backoff(kind: &str, base_ms: u64, max_ms: u64) -> Result<Backoff, ConfigError> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "fixed" => Ok(Backoff::Fixed {
            delay: Duration::from_millis(base_ms),
        }),
        "exponential" => Ok(Backoff::Exponential {
            base: Duration::from_millis(base_ms),
            max: Duration::from_millis(max_ms.max(base_ms)),
            jitter: true,
        }),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POSTCRAFT_RETRY_BACKOFF".to_string(),
            reason: format!("expected fixed or exponential; got '{other}'"),
        }),
    }
}

fn parse_engagement_weights(raw: &str) -> Result<EngagementWeights, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "POSTCRAFT_ENGAGEMENT_WEIGHTS".to_string(),
        reason,
    };

    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| invalid(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    let [likes, comments, shares] = parts[..] else {
        return Err(invalid(format!(
            "expected three comma-separated numbers (likes,comments,shares); got '{raw}'"
        )));
    };

    if [likes, comments, shares]
        .iter()
        .any(|w| !w.is_finite() || *w < 0.0)
    {
        return Err(invalid(format!(
            "weights must be finite and non-negative; got '{raw}'"
        )));
    }

    Ok(EngagementWeights {
        likes,
        comments,
        shares,
    })
}

fn parse_best_posting_time(raw: &str) -> Result<BestPostingTime, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "POSTCRAFT_BEST_POSTING_TIME".to_string(),
        reason,
    };

    let mut parts = raw.split_whitespace();
    let (Some(day_raw), Some(hour_raw), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid(format!(
            "expected '<weekday> <hour>', e.g. 'Tuesday 15'; got '{raw}'"
        )));
    };

    let day = day_raw
        .parse::<Weekday>()
        .map_err(|_| invalid(format!("unknown weekday '{day_raw}'")))?;
    let hour = hour_raw
        .parse::<u32>()
        .map_err(|e| invalid(e.to_string()))?;
    if hour > 23 {
        return Err(invalid(format!("hour must be 0-23; got {hour}")));
    }

    Ok(BestPostingTime { day, hour })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
