use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Weekday;

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

/// Delay schedule between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed { delay: Duration },
    /// `base * 2^(retry - 1)`, capped at `max`, with ±25 % jitter when
    /// `jitter` is set.
    Exponential {
        base: Duration,
        max: Duration,
        jitter: bool,
    },
}

impl Backoff {
    /// Zero-delay schedule, used by tests and dry runs.
    #[must_use]
    pub const fn none() -> Self {
        Backoff::Fixed {
            delay: Duration::ZERO,
        }
    }
}

/// Coefficients of the engagement score
/// `likes * likes_weight + comments * comments_weight + shares * shares_weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementWeights {
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            likes: 1.0,
            comments: 1.0,
            shares: 1.0,
        }
    }
}

impl EngagementWeights {
    #[must_use]
    pub fn score(&self, likes: u64, comments: u64, shares: u64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let (l, c, s) = (likes as f64, comments as f64, shares as f64);
        l * self.likes + c * self.comments + s * self.shares
    }
}

/// A fixed weekday and hour (UTC) that overrides the trend-derived posting time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestPostingTime {
    pub day: Weekday,
    pub hour: u32,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub profiles_path: PathBuf,
    pub data_dir: PathBuf,
    pub feed_base_url: String,
    pub session_cookie: Option<String>,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_pages: usize,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_inter_profile_delay_ms: u64,
    pub retry_max_attempts: u32,
    pub retry_backoff: Backoff,
    pub engagement_weights: EngagementWeights,
    pub candidate_count: usize,
    pub best_posting_time: Option<BestPostingTime>,
    pub completion_api_key: Option<String>,
    pub completion_base_url: String,
    pub completion_model: String,
    pub completion_temperature: f32,
    pub completion_max_tokens: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("profiles_path", &self.profiles_path)
            .field("data_dir", &self.data_dir)
            .field("feed_base_url", &self.feed_base_url)
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_pages", &self.scraper_max_pages)
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field(
                "scraper_inter_profile_delay_ms",
                &self.scraper_inter_profile_delay_ms,
            )
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_backoff", &self.retry_backoff)
            .field("engagement_weights", &self.engagement_weights)
            .field("candidate_count", &self.candidate_count)
            .field("best_posting_time", &self.best_posting_time)
            .field(
                "completion_api_key",
                &self.completion_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("completion_base_url", &self.completion_base_url)
            .field("completion_model", &self.completion_model)
            .field("completion_temperature", &self.completion_temperature)
            .field("completion_max_tokens", &self.completion_max_tokens)
            .finish()
    }
}

impl AppConfig {
    #[must_use]
    pub fn data(&self) -> DataDir {
        DataDir::new(&self.data_dir)
    }

    #[must_use]
    pub fn posts_path(&self) -> PathBuf {
        self.data().posts()
    }

    #[must_use]
    pub fn analyzed_posts_path(&self) -> PathBuf {
        self.data().analyzed_posts()
    }

    #[must_use]
    pub fn trends_path(&self) -> PathBuf {
        self.data().trends()
    }

    #[must_use]
    pub fn generated_posts_path(&self) -> PathBuf {
        self.data().generated_posts()
    }

    #[must_use]
    pub fn feedback_path(&self) -> PathBuf {
        self.data().feedback()
    }

    #[must_use]
    pub fn diagnostics_dir(&self) -> PathBuf {
        self.data().diagnostics()
    }
}

/// File layout of the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn posts(&self) -> PathBuf {
        self.root.join("posts.csv")
    }

    #[must_use]
    pub fn analyzed_posts(&self) -> PathBuf {
        self.root.join("posts_analyzed.csv")
    }

    #[must_use]
    pub fn trends(&self) -> PathBuf {
        self.root.join("trends.csv")
    }

    #[must_use]
    pub fn generated_posts(&self) -> PathBuf {
        self.root.join("generated_posts.csv")
    }

    #[must_use]
    pub fn feedback(&self) -> PathBuf {
        self.root.join("feedback.csv")
    }

    #[must_use]
    pub fn diagnostics(&self) -> PathBuf {
        self.root.join("diagnostics")
    }
}
