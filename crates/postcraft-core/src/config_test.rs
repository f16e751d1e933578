use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "POSTCRAFT_ENV"));
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_dir.to_str(), Some("./data"));
    assert_eq!(cfg.profiles_path.to_str(), Some("./config/profiles.yaml"));
    assert_eq!(cfg.feed_base_url, "https://www.linkedin.com");
    assert!(cfg.session_cookie.is_none());
    assert_eq!(cfg.scraper_request_timeout_secs, 30);
    assert_eq!(cfg.scraper_max_pages, 10);
    assert_eq!(cfg.scraper_inter_request_delay_ms, 3000);
    assert_eq!(cfg.scraper_inter_profile_delay_ms, 5000);
    assert_eq!(cfg.retry_max_attempts, 3);
    assert_eq!(
        cfg.retry_backoff,
        Backoff::Exponential {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(60_000),
            jitter: true,
        }
    );
    assert_eq!(cfg.engagement_weights, EngagementWeights::default());
    assert_eq!(cfg.candidate_count, 3);
    assert!(cfg.best_posting_time.is_none());
    assert!(cfg.completion_api_key.is_none());
    assert_eq!(cfg.completion_model, "llama-3.3-70b-versatile");
    assert_eq!(cfg.completion_max_tokens, 1500);
}

#[test]
fn build_app_config_fails_on_invalid_env() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_ENV", "producton");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POSTCRAFT_ENV"),
        "expected InvalidEnvVar(POSTCRAFT_ENV), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_max_attempts() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_RETRY_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POSTCRAFT_RETRY_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(POSTCRAFT_RETRY_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_max_pages() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_SCRAPER_MAX_PAGES", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POSTCRAFT_SCRAPER_MAX_PAGES"),
        "expected InvalidEnvVar(POSTCRAFT_SCRAPER_MAX_PAGES), got: {result:?}"
    );
}

#[test]
fn build_app_config_fixed_backoff() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_RETRY_BACKOFF", "fixed");
    map.insert("POSTCRAFT_RETRY_BACKOFF_BASE_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.retry_backoff,
        Backoff::Fixed {
            delay: Duration::from_millis(250)
        }
    );
}

#[test]
fn build_app_config_unknown_backoff_fails() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_RETRY_BACKOFF", "linear");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POSTCRAFT_RETRY_BACKOFF"),
        "expected InvalidEnvVar(POSTCRAFT_RETRY_BACKOFF), got: {result:?}"
    );
}

#[test]
fn engagement_weights_override() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_ENGAGEMENT_WEIGHTS", "1, 2.5, 4");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.engagement_weights,
        EngagementWeights {
            likes: 1.0,
            comments: 2.5,
            shares: 4.0
        }
    );
}

#[test]
fn engagement_weights_wrong_arity_fails() {
    assert!(parse_engagement_weights("1,2").is_err());
    assert!(parse_engagement_weights("1,2,3,4").is_err());
}

#[test]
fn engagement_weights_negative_fails() {
    assert!(parse_engagement_weights("1,-2,3").is_err());
}

#[test]
fn candidate_count_zero_fails() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_CANDIDATE_COUNT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "POSTCRAFT_CANDIDATE_COUNT"),
        "expected InvalidEnvVar(POSTCRAFT_CANDIDATE_COUNT), got: {result:?}"
    );
}

#[test]
fn best_posting_time_parses_full_and_short_weekday() {
    assert_eq!(
        parse_best_posting_time("Tuesday 15").unwrap(),
        BestPostingTime {
            day: Weekday::Tue,
            hour: 15
        }
    );
    assert_eq!(
        parse_best_posting_time("fri 9").unwrap(),
        BestPostingTime {
            day: Weekday::Fri,
            hour: 9
        }
    );
}

#[test]
fn best_posting_time_rejects_bad_hour_and_shape() {
    assert!(parse_best_posting_time("Tuesday 24").is_err());
    assert!(parse_best_posting_time("Tuesday").is_err());
    assert!(parse_best_posting_time("Someday 10").is_err());
}

#[test]
fn completion_key_falls_back_to_groq_api_key() {
    let mut map = HashMap::new();
    map.insert("GROQ_API_KEY", "gsk-test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.completion_api_key.as_deref(), Some("gsk-test"));

    map.insert("POSTCRAFT_COMPLETION_API_KEY", "explicit");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.completion_api_key.as_deref(), Some("explicit"));
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("POSTCRAFT_SESSION_COOKIE", "li_at=super-secret");
    map.insert("GROQ_API_KEY", "gsk-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("super-secret"));
    assert!(!debug.contains("gsk-very-secret"));
    assert!(debug.contains("[redacted]"));
}
