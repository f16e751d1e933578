//! Prompt assembly and candidate parsing.

use chrono::Weekday;
use postcraft_core::{FeedbackRecord, PostRecord, ScopeTrends, Tone, TrendSummary, SCOPE_ALL};
use serde::{Deserialize, Serialize};

const TOP_HASHTAGS: usize = 5;
const TOP_TOPICS: usize = 3;
const BEST_DAYS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaPreference {
    Explicit,
    Subtle,
}

impl CtaPreference {
    fn instruction(self) -> &'static str {
        match self {
            CtaPreference::Explicit => "an explicit call to action (e.g. 'DM me for details')",
            CtaPreference::Subtle => "a subtle call to action (e.g. 'Comment your thoughts below')",
        }
    }
}

/// The slice of trend statistics a prompt is built from. Serialized as JSON
/// into each generated post's `source_trend_snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendExcerpt {
    /// Scope the statistics came from: the owner profile id, or `all`.
    pub scope: String,
    pub top_hashtags: Vec<String>,
    pub top_topics: Vec<String>,
    pub best_tone: Tone,
    pub cta_preference: CtaPreference,
    pub best_days: Vec<String>,
    pub best_hour: Option<u32>,
}

impl TrendExcerpt {
    /// Builds an excerpt from the owner's scope, falling back to `all`.
    /// Returns `None` when neither scope exists.
    #[must_use]
    pub fn from_summary(summary: &TrendSummary, owner: Option<&str>) -> Option<Self> {
        let (scope, trends) = owner
            .and_then(|id| summary.scope(id).map(|t| (id, t)))
            .or_else(|| summary.all().map(|t| (SCOPE_ALL, t)))?;
        Some(Self::from_scope(scope, trends))
    }

    fn from_scope(scope: &str, trends: &ScopeTrends) -> Self {
        let tone_mean = |tone: Tone| {
            trends
                .engagement_by_tone
                .get(tone.as_str())
                .copied()
                .unwrap_or(0.0)
        };
        let best_tone = if tone_mean(Tone::Positive) >= tone_mean(Tone::Negative) {
            Tone::Positive
        } else {
            Tone::Negative
        };

        let cta_mean = |key: &str| trends.engagement_by_cta.get(key).copied().unwrap_or(0.0);
        let cta_preference = if cta_mean("true") > cta_mean("false") {
            CtaPreference::Explicit
        } else {
            CtaPreference::Subtle
        };

        Self {
            scope: scope.to_string(),
            top_hashtags: top_by(&trends.hashtag_frequency, TOP_HASHTAGS),
            top_topics: top_by(&trends.topic_frequency, TOP_TOPICS),
            best_tone,
            cta_preference,
            best_days: top_by(&trends.engagement_by_weekday, BEST_DAYS),
            best_hour: top_by(&trends.engagement_by_hour, 1)
                .first()
                .and_then(|h| h.parse().ok()),
        }
    }

    /// First entry of `best_days` as a weekday, if it parses.
    #[must_use]
    pub fn best_day(&self) -> Option<Weekday> {
        self.best_days.first().and_then(|d| d.parse().ok())
    }
}

/// Keys of `map` with the highest values, ties broken by key order.
fn top_by<V: PartialOrd + Copy>(map: &std::collections::BTreeMap<String, V>, n: usize) -> Vec<String> {
    let mut entries: Vec<(&String, V)> = map.iter().map(|(k, v)| (k, *v)).collect();
    // Stable sort keeps BTreeMap key order among equal values.
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().take(n).map(|(k, _)| k.clone()).collect()
}

/// Everything a single generation prompt is assembled from.
#[derive(Debug, Default)]
pub struct PromptInputs<'a> {
    /// Display name of the owner profile.
    pub author: Option<&'a str>,
    pub exemplars: &'a [PostRecord],
    pub keywords: &'a [String],
    pub excerpt: Option<&'a TrendExcerpt>,
    pub feedback: &'a [FeedbackRecord],
}

#[must_use]
pub fn build_prompt(inputs: &PromptInputs<'_>) -> String {
    let author = inputs.author.unwrap_or("a marketing and AI practitioner");
    let mut prompt = format!(
        "You are a professional LinkedIn ghostwriter writing for {author}. \
         Write one post in their voice: insightful, data-driven, conversational.\n"
    );

    if !inputs.exemplars.is_empty() {
        prompt.push_str("\nBest-performing posts to emulate for style:\n");
        for (i, post) in inputs.exemplars.iter().enumerate() {
            prompt.push_str(&format!("{}. \"\"\"{}\"\"\"\n", i + 1, post.text.trim()));
        }
    }

    if inputs.keywords.is_empty() && inputs.excerpt.is_none() {
        prompt.push_str("\nTopic: AI in performance marketing.\n");
    }
    if !inputs.keywords.is_empty() {
        prompt.push_str(&format!(
            "\nFocus the post on: {}.\n",
            inputs.keywords.join(", ")
        ));
    }

    if let Some(excerpt) = inputs.excerpt {
        prompt.push_str("\nWhat engages this audience:\n");
        if !excerpt.top_topics.is_empty() {
            prompt.push_str(&format!("- Topics: {}.\n", excerpt.top_topics.join(", ")));
        }
        if !excerpt.top_hashtags.is_empty() {
            prompt.push_str(&format!("- Hashtags: {}.\n", excerpt.top_hashtags.join(" ")));
        }
        prompt.push_str(&format!("- A {} tone performs best.\n", excerpt.best_tone));
        prompt.push_str(&format!(
            "- Close with {}.\n",
            excerpt.cta_preference.instruction()
        ));
        if !excerpt.best_days.is_empty() {
            prompt.push_str(&format!(
                "- Posts on {} get the most engagement.\n",
                excerpt.best_days.join(" and ")
            ));
        }
    }

    if !inputs.feedback.is_empty() {
        prompt.push_str("\nApply this feedback on earlier drafts:\n");
        for record in inputs.feedback {
            prompt.push_str(&format!("- {}\n", record.comment.trim()));
        }
    }

    prompt.push_str(
        "\nAim for 500 to 1000 characters and end with relevant hashtags.\n\
         Respond with a single JSON object and nothing else, with exactly two keys:\n\
         {\"post_text\": \"<the complete post>\", \
         \"explanation\": \"<the choices you made and why>\"}\n",
    );
    prompt
}

/// One usable post parsed from a completion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    pub post_text: String,
    #[serde(default)]
    pub explanation: String,
}

/// Parses a raw completion into a [`Candidate`].
///
/// Strips Markdown code fences, takes the outermost `{...}`, and decodes it.
/// Returns `None` unless `post_text` is present and non-blank.
#[must_use]
pub fn parse_candidate(raw: &str) -> Option<Candidate> {
    let cleaned = strip_fences(raw);
    let json = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned,
    };
    let mut candidate: Candidate = serde_json::from_str(json).ok()?;
    candidate.post_text = candidate.post_text.trim().to_string();
    candidate.explanation = candidate.explanation.trim().to_string();
    (!candidate.post_text.is_empty()).then_some(candidate)
}

fn strip_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop the info string, e.g. "json".
        s = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    s.trim_end().trim_end_matches("```").trim()
}
