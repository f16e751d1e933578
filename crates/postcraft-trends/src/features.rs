//! Per-post features: topics, call-to-action, length, hashtags, posting time
//! and tone.

use std::sync::LazyLock;

use chrono::{Datelike, Timelike};
use postcraft_core::{weekday_name, EngagementWeights, LengthBucket, PostRecord, Tone};
use regex::Regex;

use crate::tone::ToneClassifier;

/// Topic bucket for posts that match no category.
pub const OTHER_TOPIC: &str = "Other";

/// Topic categories with their lowercase trigger keywords.
pub const TOPICS: &[(&str, &[&str])] = &[
    (
        "AI",
        &["ai", "genai", "llm", "chatgpt", "gpt", "automation", "machine learning"],
    ),
    (
        "Marketing",
        &["marketing", "brand", "branding", "content", "campaign", "audience"],
    ),
    ("Scaling", &["scale", "scaling", "scaled", "hiring", "team", "operations"]),
    ("Ads", &["ads", "ad", "meta", "facebook ads", "google ads", "tiktok", "cpm", "cpc"]),
    ("Creative", &["creative", "creatives", "ugc", "video", "design", "hook", "hooks"]),
    (
        "Performance",
        &["performance", "roas", "roi", "cac", "ltv", "conversion", "cvr", "ctr"],
    ),
    ("Growth", &["growth", "revenue", "retention", "acquisition", "funnel"]),
    ("DTC", &["dtc", "d2c", "ecommerce", "e-commerce", "shopify", "direct-to-consumer"]),
];

static CTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(learn more|comment below|check out|join us|click here|dm me|rsvp|apply now)\b",
    )
    .expect("valid regex")
});

/// Topic names whose keywords appear in `text`, in [`TOPICS`] order.
#[must_use]
pub fn topics_for(text: &str) -> Vec<&'static str> {
    let normalized = normalize_for_matching(text);
    TOPICS
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| normalized.contains(&format!(" {k} ")))
        })
        .map(|(name, _)| *name)
        .collect()
}

/// Lowercases, replaces punctuation other than `-` with spaces, and pads
/// with spaces so keyword matching can require word boundaries.
fn normalize_for_matching(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

#[must_use]
pub fn has_cta(text: &str) -> bool {
    CTA.is_match(text)
}

/// Derived attributes of one post used by every trend metric.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFeatures {
    pub engagement: f64,
    pub weekday: &'static str,
    pub hour: u32,
    /// `weekday_from_monday * 24 + hour`, UTC.
    pub hour_of_week: u32,
    pub tone: Tone,
    pub topics: Vec<&'static str>,
    pub has_cta: bool,
    pub length: usize,
    pub length_bucket: LengthBucket,
    pub hashtag_count: usize,
}

impl PostFeatures {
    #[must_use]
    pub fn extract(
        post: &PostRecord,
        weights: &EngagementWeights,
        classifier: &dyn ToneClassifier,
    ) -> Self {
        let day = post.timestamp.weekday();
        let hour = post.timestamp.hour();
        let length = post.text.chars().count();
        Self {
            engagement: post.engagement(weights),
            weekday: weekday_name(day),
            hour,
            hour_of_week: day.num_days_from_monday() * 24 + hour,
            tone: classifier.classify_tone(&post.text),
            topics: topics_for(&post.text),
            has_cta: has_cta(&post.text),
            length,
            length_bucket: LengthBucket::for_len(length),
            hashtag_count: post.hashtags.len(),
        }
    }

    /// Topics for grouping; [`OTHER_TOPIC`] when nothing matched.
    #[must_use]
    pub fn topic_keys(&self) -> Vec<&'static str> {
        if self.topics.is_empty() {
            vec![OTHER_TOPIC]
        } else {
            self.topics.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::tone::LexiconToneClassifier;

    #[test]
    fn topics_require_whole_words() {
        assert_eq!(topics_for("Our AI-first DTC playbook"), vec!["DTC"]);
        assert_eq!(topics_for("AI, creative and ROAS."), vec!["AI", "Creative", "Performance"]);
        // "paid" contains "ai" but is not the word
        assert!(topics_for("We paid for it").is_empty());
    }

    #[test]
    fn multi_word_keywords_match() {
        assert_eq!(topics_for("Intro to Machine Learning"), vec!["AI"]);
    }

    #[test]
    fn cta_detection_is_case_insensitive() {
        assert!(has_cta("DM me for details"));
        assert!(has_cta("Comment below with your take"));
        assert!(!has_cta("Just sharing a thought"));
    }

    #[test]
    fn extract_computes_time_buckets() {
        let post = PostRecord {
            author: "A".into(),
            text: "Excited to launch our DTC brand. Learn more!".into(),
            // Tuesday
            timestamp: Utc.with_ymd_and_hms(2024, 5, 7, 15, 20, 0).unwrap(),
            like_count: 10,
            comment_count: 4,
            share_count: 1,
            hashtags: BTreeSet::from(["#dtc".to_string(), "#launch".to_string()]),
            source_profile: "a".into(),
        };
        let f = PostFeatures::extract(&post, &EngagementWeights::default(), &LexiconToneClassifier);
        assert_eq!(f.weekday, "Tuesday");
        assert_eq!(f.hour, 15);
        assert_eq!(f.hour_of_week, 39);
        assert!((f.engagement - 15.0).abs() < f64::EPSILON);
        assert_eq!(f.tone, Tone::Positive);
        assert_eq!(f.topics, vec!["Marketing", "DTC"]);
        assert!(f.has_cta);
        assert_eq!(f.length_bucket, LengthBucket::Short);
        assert_eq!(f.hashtag_count, 2);
    }

    #[test]
    fn unmatched_posts_group_under_other() {
        let f = PostFeatures {
            engagement: 0.0,
            weekday: "Monday",
            hour: 0,
            hour_of_week: 0,
            tone: Tone::Neutral,
            topics: vec![],
            has_cta: false,
            length: 0,
            length_bucket: LengthBucket::Short,
            hashtag_count: 0,
        };
        assert_eq!(f.topic_keys(), vec![OTHER_TOPIC]);
    }
}
