use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// What drove a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// User keywords without trend data.
    Keyword,
    /// Trend statistics, optionally combined with keywords.
    Trend,
    /// A re-generation with accumulated feedback folded in.
    Refine,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Variant::Keyword => "keyword",
            Variant::Trend => "trend",
            Variant::Refine => "refine",
        })
    }
}

/// A candidate post returned by the completion service, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPost {
    pub id: String,
    pub variant: Variant,
    pub text: String,
    pub explanation: String,
    pub source_keywords: Vec<String>,
    /// Serialized trend excerpt the prompt was built from.
    pub source_trend_snapshot: Option<String>,
    /// IDs of the feedback records folded into the prompt.
    pub feedback_ids: Vec<String>,
    /// SHA-256 hex digest of the exact prompt text.
    pub prompt_digest: String,
    pub suggested_posting_day: Weekday,
    pub suggested_posting_hour: u32,
    pub generation_timestamp: DateTime<Utc>,
}

/// Free-text feedback on one generated post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub target_generated_post_id: String,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}
