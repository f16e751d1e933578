//! Trend analysis over the post store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use postcraft_core::{
    hashtag_count_bucket, AppConfig, DataDir, EngagementWeights, PostRecord, ScopeTrends,
    TrendSummary, SCOPE_ALL,
};
use postcraft_store::{CsvTable, PostStore, TrendStore};
use serde::{Deserialize, Serialize};

use crate::error::TrendError;
use crate::features::PostFeatures;
use crate::tone::{LexiconToneClassifier, ToneClassifier};

/// One row of `posts_analyzed.csv`: the stored post plus its features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPostRow {
    pub source_profile: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub weekday: String,
    pub hour: u32,
    pub hour_of_week: u32,
    pub like_count: u64,
    pub comment_count: u64,
    pub share_count: u64,
    pub engagement: f64,
    pub tone: String,
    pub topics: String,
    pub has_cta: bool,
    pub length: usize,
    pub length_bucket: String,
    pub hashtag_count: usize,
    pub hashtags: String,
    pub text: String,
}

impl AnalyzedPostRow {
    fn new(post: &PostRecord, f: &PostFeatures) -> Self {
        Self {
            source_profile: post.source_profile.clone(),
            author: post.author.clone(),
            timestamp: post.timestamp,
            weekday: f.weekday.to_string(),
            hour: f.hour,
            hour_of_week: f.hour_of_week,
            like_count: post.like_count,
            comment_count: post.comment_count,
            share_count: post.share_count,
            engagement: round2(f.engagement),
            tone: f.tone.to_string(),
            topics: f.topics.join(";"),
            has_cta: f.has_cta,
            length: f.length,
            length_bucket: f.length_bucket.as_str().to_string(),
            hashtag_count: f.hashtag_count,
            hashtags: post
                .hashtags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            text: post.text.clone(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Running sum and count for one group key.
#[derive(Default)]
struct Mean {
    sum: f64,
    n: u32,
}

impl Mean {
    fn add(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn value(&self) -> f64 {
        round2(self.sum / f64::from(self.n.max(1)))
    }
}

#[derive(Default)]
struct ScopeAccumulator {
    post_count: usize,
    overall: Mean,
    topic_frequency: BTreeMap<String, u64>,
    hashtag_frequency: BTreeMap<String, u64>,
    by_hour_of_week: BTreeMap<String, Mean>,
    by_weekday: BTreeMap<String, Mean>,
    by_hour: BTreeMap<String, Mean>,
    by_tone: BTreeMap<String, Mean>,
    by_topic: BTreeMap<String, Mean>,
    by_cta: BTreeMap<String, Mean>,
    by_length: BTreeMap<String, Mean>,
    by_hashtag_count: BTreeMap<String, Mean>,
}

impl ScopeAccumulator {
    fn add(&mut self, post: &PostRecord, f: &PostFeatures) {
        let e = f.engagement;
        self.post_count += 1;
        self.overall.add(e);
        for topic in &f.topics {
            *self.topic_frequency.entry((*topic).to_string()).or_default() += 1;
        }
        for tag in &post.hashtags {
            *self.hashtag_frequency.entry(tag.clone()).or_default() += 1;
        }
        self.by_hour_of_week
            .entry(format!("{:03}", f.hour_of_week))
            .or_default()
            .add(e);
        self.by_weekday.entry(f.weekday.to_string()).or_default().add(e);
        self.by_hour.entry(format!("{:02}", f.hour)).or_default().add(e);
        self.by_tone.entry(f.tone.to_string()).or_default().add(e);
        for topic in f.topic_keys() {
            self.by_topic.entry(topic.to_string()).or_default().add(e);
        }
        self.by_cta.entry(f.has_cta.to_string()).or_default().add(e);
        self.by_length
            .entry(f.length_bucket.as_str().to_string())
            .or_default()
            .add(e);
        self.by_hashtag_count
            .entry(hashtag_count_bucket(f.hashtag_count).to_string())
            .or_default()
            .add(e);
    }

    fn finish(self) -> ScopeTrends {
        let means = |m: BTreeMap<String, Mean>| -> BTreeMap<String, f64> {
            m.into_iter().map(|(k, v)| (k, v.value())).collect()
        };
        ScopeTrends {
            post_count: self.post_count,
            engagement_mean: self.overall.value(),
            topic_frequency: self.topic_frequency,
            hashtag_frequency: self.hashtag_frequency,
            engagement_by_hour_of_week: means(self.by_hour_of_week),
            engagement_by_weekday: means(self.by_weekday),
            engagement_by_hour: means(self.by_hour),
            engagement_by_tone: means(self.by_tone),
            engagement_by_topic: means(self.by_topic),
            engagement_by_cta: means(self.by_cta),
            engagement_by_length: means(self.by_length),
            engagement_by_hashtag_count: means(self.by_hashtag_count),
        }
    }
}

/// Computes trends over all posts (scope `all`) and per source profile.
#[must_use]
pub fn analyze(
    posts: &[PostRecord],
    weights: &EngagementWeights,
    classifier: &dyn ToneClassifier,
) -> TrendSummary {
    analyze_with_features(posts, weights, classifier).0
}

fn analyze_with_features(
    posts: &[PostRecord],
    weights: &EngagementWeights,
    classifier: &dyn ToneClassifier,
) -> (TrendSummary, Vec<PostFeatures>) {
    let mut scopes: BTreeMap<String, ScopeAccumulator> = BTreeMap::new();
    let mut features = Vec::with_capacity(posts.len());

    for post in posts {
        let f = PostFeatures::extract(post, weights, classifier);
        scopes.entry(SCOPE_ALL.to_string()).or_default().add(post, &f);
        scopes
            .entry(post.source_profile.clone())
            .or_default()
            .add(post, &f);
        features.push(f);
    }

    let summary = TrendSummary {
        scopes: scopes.into_iter().map(|(k, acc)| (k, acc.finish())).collect(),
    };
    (summary, features)
}

/// What one analysis run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub posts_analyzed: usize,
    pub trend_rows: usize,
    pub summary: TrendSummary,
}

/// Reads the post store and rewrites the trends and analyzed-posts tables.
pub struct TrendAnalyzer {
    posts: PostStore,
    trends: TrendStore,
    analyzed: CsvTable<AnalyzedPostRow>,
    weights: EngagementWeights,
    classifier: Box<dyn ToneClassifier>,
}

impl TrendAnalyzer {
    #[must_use]
    pub fn new(data: &DataDir, weights: EngagementWeights) -> Self {
        Self {
            posts: PostStore::new(data.posts()),
            trends: TrendStore::new(data.trends()),
            analyzed: CsvTable::new(data.analyzed_posts()),
            weights,
            classifier: Box::new(LexiconToneClassifier),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.data(), config.engagement_weights)
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn ToneClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// # Errors
    ///
    /// Returns [`TrendError::PostsMissing`] if the post store does not exist,
    /// or [`TrendError::Store`] if a table cannot be read or written.
    pub fn run(&self) -> Result<AnalysisReport, TrendError> {
        if !self.posts.exists() {
            return Err(TrendError::PostsMissing {
                path: self.posts.path().to_path_buf(),
            });
        }

        let posts = self.posts.load_all()?;
        tracing::info!(posts = posts.len(), "analyzing posts");

        let (summary, features) =
            analyze_with_features(&posts, &self.weights, self.classifier.as_ref());

        let trend_rows = self.trends.write(&summary)?;
        let rows: Vec<AnalyzedPostRow> = posts
            .iter()
            .zip(&features)
            .map(|(p, f)| AnalyzedPostRow::new(p, f))
            .collect();
        self.analyzed.replace(&rows)?;

        tracing::info!(
            posts = rows.len(),
            trend_rows,
            scopes = summary.scopes.len(),
            "trends written"
        );
        Ok(AnalysisReport {
            posts_analyzed: rows.len(),
            trend_rows,
            summary,
        })
    }
}

/// Runs the analyzer over the configured data directory.
///
/// # Errors
///
/// See [`TrendAnalyzer::run`].
pub fn run_analysis(config: &AppConfig) -> Result<AnalysisReport, TrendError> {
    TrendAnalyzer::from_config(config).run()
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
