//! Shared domain types and configuration for the postcraft workspace.

pub mod app_config;
pub mod config;
pub mod generated;
pub mod posts;
pub mod profiles;
pub mod trends;

use thiserror::Error;

pub use app_config::{
    AppConfig, Backoff, BestPostingTime, DataDir, EngagementWeights, Environment,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use generated::{FeedbackRecord, GeneratedPost, Variant};
pub use posts::{PostKey, PostRecord};
pub use profiles::{is_valid_profile_id, load_profiles, ProfileConfig, ProfilesFile};
pub use trends::{
    hashtag_count_bucket, weekday_name, LengthBucket, ScopeTrends, Tone, TrendRow, TrendSummary,
    SCOPE_ALL,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read profiles file {path}: {source}")]
    ProfilesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profiles file: {0}")]
    ProfilesFileParse(#[from] serde_yaml::Error),

    #[error("profiles validation error: {0}")]
    Validation(String),
}
