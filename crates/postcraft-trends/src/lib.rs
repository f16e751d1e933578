//! Trend analysis: per-post features, tone classification, and aggregate
//! engagement metrics over the post store.

pub mod analyzer;
pub mod error;
pub mod features;
pub mod tone;

pub use analyzer::{analyze, run_analysis, AnalysisReport, AnalyzedPostRow, TrendAnalyzer};
pub use error::TrendError;
pub use features::{has_cta, topics_for, PostFeatures, TOPICS};
pub use tone::{lexicon_score, LexiconToneClassifier, ToneClassifier};
