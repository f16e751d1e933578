use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app_config::EngagementWeights;

/// A normalized post collected from a profile feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub like_count: u64,
    pub comment_count: u64,
    pub share_count: u64,
    /// Lowercased hashtags including the leading `#`.
    pub hashtags: BTreeSet<String>,
    pub source_profile: String,
}

/// Natural de-duplication key for a [`PostRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostKey {
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl PostRecord {
    #[must_use]
    pub fn key(&self) -> PostKey {
        PostKey {
            author: self.author.clone(),
            timestamp: self.timestamp,
        }
    }

    #[must_use]
    pub fn engagement(&self, weights: &EngagementWeights) -> f64 {
        weights.score(self.like_count, self.comment_count, self.share_count)
    }
}
