use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Full English weekday name, e.g. `Tuesday`.
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Coarse sentiment label attached to a post's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post length bucket by character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl LengthBucket {
    #[must_use]
    pub fn for_len(chars: usize) -> Self {
        match chars {
            0..=100 => LengthBucket::Short,
            101..=500 => LengthBucket::Medium,
            501..=1000 => LengthBucket::Long,
            _ => LengthBucket::VeryLong,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LengthBucket::Short => "short",
            LengthBucket::Medium => "medium",
            LengthBucket::Long => "long",
            LengthBucket::VeryLong => "very_long",
        }
    }
}

/// One row of the trends table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    /// `all`, or a source profile id.
    pub scope: String,
    pub metric: String,
    pub key: String,
    pub value: f64,
}

/// Aggregate statistics for one scope (all posts, or one profile).
///
/// Frequencies are counts; every other map holds mean engagement rounded to
/// two decimals. Keys are strings so the summary round-trips through the
/// trends table unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeTrends {
    pub post_count: usize,
    /// Mean engagement across every post in the scope.
    pub engagement_mean: f64,
    pub topic_frequency: BTreeMap<String, u64>,
    pub hashtag_frequency: BTreeMap<String, u64>,
    /// Key is `weekday_from_monday * 24 + hour`, zero padded to three digits.
    pub engagement_by_hour_of_week: BTreeMap<String, f64>,
    pub engagement_by_weekday: BTreeMap<String, f64>,
    pub engagement_by_hour: BTreeMap<String, f64>,
    pub engagement_by_tone: BTreeMap<String, f64>,
    pub engagement_by_topic: BTreeMap<String, f64>,
    pub engagement_by_cta: BTreeMap<String, f64>,
    pub engagement_by_length: BTreeMap<String, f64>,
    /// Key is a [`hashtag_count_bucket`].
    pub engagement_by_hashtag_count: BTreeMap<String, f64>,
}

/// Bucket label for a post's hashtag count: `0`, `1`, `2`, or `3+`.
#[must_use]
pub fn hashtag_count_bucket(count: usize) -> &'static str {
    match count {
        0 => "0",
        1 => "1",
        2 => "2",
        _ => "3+",
    }
}

/// Trend statistics keyed by scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendSummary {
    pub scopes: BTreeMap<String, ScopeTrends>,
}

pub const SCOPE_ALL: &str = "all";

pub mod metric {
    pub const POST_COUNT: &str = "post_count";
    pub const ENGAGEMENT_MEAN: &str = "engagement_mean";
    pub const TOPIC_FREQUENCY: &str = "topic_frequency";
    pub const HASHTAG_FREQUENCY: &str = "hashtag_frequency";
    pub const ENGAGEMENT_BY_HOUR_OF_WEEK: &str = "engagement_by_hour_of_week";
    pub const ENGAGEMENT_BY_WEEKDAY: &str = "engagement_by_weekday";
    pub const ENGAGEMENT_BY_HOUR: &str = "engagement_by_hour";
    pub const ENGAGEMENT_BY_TONE: &str = "engagement_by_tone";
    pub const ENGAGEMENT_BY_TOPIC: &str = "engagement_by_topic";
    pub const ENGAGEMENT_BY_CTA: &str = "engagement_by_cta";
    pub const ENGAGEMENT_BY_LENGTH: &str = "engagement_by_length";
    pub const ENGAGEMENT_BY_HASHTAG_COUNT: &str = "engagement_by_hashtag_count";
}

impl TrendSummary {
    #[must_use]
    pub fn all(&self) -> Option<&ScopeTrends> {
        self.scopes.get(SCOPE_ALL)
    }

    #[must_use]
    pub fn scope(&self, scope: &str) -> Option<&ScopeTrends> {
        self.scopes.get(scope)
    }

    /// Flatten into table rows, ordered by scope, then metric, then key.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_rows(&self) -> Vec<TrendRow> {
        let mut rows = Vec::new();
        for (scope, t) in &self.scopes {
            let mut push = |metric: &str, key: &str, value: f64| {
                rows.push(TrendRow {
                    scope: scope.clone(),
                    metric: metric.to_string(),
                    key: key.to_string(),
                    value,
                });
            };

            push(metric::POST_COUNT, "", t.post_count as f64);
            push(metric::ENGAGEMENT_MEAN, "", t.engagement_mean);
            for (k, v) in &t.topic_frequency {
                push(metric::TOPIC_FREQUENCY, k, *v as f64);
            }
            for (k, v) in &t.hashtag_frequency {
                push(metric::HASHTAG_FREQUENCY, k, *v as f64);
            }
            for (name, map) in [
                (metric::ENGAGEMENT_BY_HOUR_OF_WEEK, &t.engagement_by_hour_of_week),
                (metric::ENGAGEMENT_BY_WEEKDAY, &t.engagement_by_weekday),
                (metric::ENGAGEMENT_BY_HOUR, &t.engagement_by_hour),
                (metric::ENGAGEMENT_BY_TONE, &t.engagement_by_tone),
                (metric::ENGAGEMENT_BY_TOPIC, &t.engagement_by_topic),
                (metric::ENGAGEMENT_BY_CTA, &t.engagement_by_cta),
                (metric::ENGAGEMENT_BY_LENGTH, &t.engagement_by_length),
                (metric::ENGAGEMENT_BY_HASHTAG_COUNT, &t.engagement_by_hashtag_count),
            ] {
                for (k, v) in map {
                    push(name, k, *v);
                }
            }
        }
        rows
    }

    /// Rebuild a summary from table rows. Unknown metrics are ignored.
    #[must_use]
    pub fn from_rows(rows: &[TrendRow]) -> Self {
        let mut summary = TrendSummary::default();
        for row in rows {
            let t = summary.scopes.entry(row.scope.clone()).or_default();
            let key = row.key.clone();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let count = row.value.max(0.0).round() as u64;
            match row.metric.as_str() {
                metric::POST_COUNT => t.post_count = usize::try_from(count).unwrap_or(usize::MAX),
                metric::ENGAGEMENT_MEAN => t.engagement_mean = row.value,
                metric::TOPIC_FREQUENCY => {
                    t.topic_frequency.insert(key, count);
                }
                metric::HASHTAG_FREQUENCY => {
                    t.hashtag_frequency.insert(key, count);
                }
                metric::ENGAGEMENT_BY_HOUR_OF_WEEK => {
                    t.engagement_by_hour_of_week.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_WEEKDAY => {
                    t.engagement_by_weekday.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_HOUR => {
                    t.engagement_by_hour.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_TONE => {
                    t.engagement_by_tone.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_TOPIC => {
                    t.engagement_by_topic.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_CTA => {
                    t.engagement_by_cta.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_LENGTH => {
                    t.engagement_by_length.insert(key, row.value);
                }
                metric::ENGAGEMENT_BY_HASHTAG_COUNT => {
                    t.engagement_by_hashtag_count.insert(key, row.value);
                }
                _ => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_buckets_follow_boundaries() {
        assert_eq!(LengthBucket::for_len(0), LengthBucket::Short);
        assert_eq!(LengthBucket::for_len(100), LengthBucket::Short);
        assert_eq!(LengthBucket::for_len(101), LengthBucket::Medium);
        assert_eq!(LengthBucket::for_len(1000), LengthBucket::Long);
        assert_eq!(LengthBucket::for_len(1001), LengthBucket::VeryLong);
    }

    #[test]
    fn rows_round_trip_preserves_summary() {
        let mut t = ScopeTrends {
            post_count: 4,
            ..ScopeTrends::default()
        };
        t.hashtag_frequency.insert("#ai".into(), 3);
        t.engagement_by_tone.insert("positive".into(), 12.5);
        t.engagement_by_hour_of_week.insert("033".into(), 40.0);
        let mut summary = TrendSummary::default();
        summary.scopes.insert(SCOPE_ALL.into(), t);

        let rows = summary.to_rows();
        assert_eq!(rows[0].metric, metric::POST_COUNT);
        assert_eq!(TrendSummary::from_rows(&rows), summary);
    }

    #[test]
    fn engagement_mean_is_a_keyless_row() {
        let mut owner = ScopeTrends {
            post_count: 2,
            engagement_mean: 1.5,
            ..ScopeTrends::default()
        };
        owner.engagement_by_hashtag_count.insert("3+".into(), 7.25);
        let mut summary = TrendSummary::default();
        summary.scopes.insert("archit-anand".into(), owner);

        let rows = summary.to_rows();
        assert_eq!(
            rows[1],
            TrendRow {
                scope: "archit-anand".into(),
                metric: metric::ENGAGEMENT_MEAN.into(),
                key: String::new(),
                value: 1.5,
            }
        );
        assert!(rows.iter().any(|r| r.metric == metric::ENGAGEMENT_BY_HASHTAG_COUNT
            && r.key == "3+"
            && (r.value - 7.25).abs() < f64::EPSILON));

        let back = TrendSummary::from_rows(&rows);
        assert_eq!(back, summary);
        assert!((back.scope("archit-anand").unwrap().engagement_mean - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn hashtag_count_buckets_cap_at_three() {
        assert_eq!(hashtag_count_bucket(0), "0");
        assert_eq!(hashtag_count_bucket(2), "2");
        assert_eq!(hashtag_count_bucket(3), "3+");
        assert_eq!(hashtag_count_bucket(12), "3+");
    }

    #[test]
    fn from_rows_ignores_unknown_metrics() {
        let rows = vec![TrendRow {
            scope: "all".into(),
            metric: "something_new".into(),
            key: "x".into(),
            value: 1.0,
        }];
        let summary = TrendSummary::from_rows(&rows);
        assert_eq!(summary.all(), Some(&ScopeTrends::default()));
    }
}
