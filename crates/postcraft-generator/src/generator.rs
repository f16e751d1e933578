//! Candidate post generation from exemplars, keywords, trends, and feedback.

use chrono::{DateTime, Utc, Weekday};
use postcraft_core::{
    AppConfig, BestPostingTime, DataDir, EngagementWeights, FeedbackRecord, GeneratedPost,
    PostRecord, ProfileConfig, ProfilesFile, Variant,
};
use postcraft_store::{FeedbackStore, GeneratedPostStore, PostStore, TrendStore};
use sha2::{Digest, Sha256};

use crate::completion::CompletionService;
use crate::error::GeneratorError;
use crate::prompt::{build_prompt, parse_candidate, PromptInputs, TrendExcerpt};

pub const DEFAULT_POSTING_TIME: BestPostingTime = BestPostingTime {
    day: Weekday::Tue,
    hour: 15,
};
const EXEMPLAR_COUNT: usize = 3;

/// Which inputs a generation run folds into its prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub variant: Variant,
    pub keywords: Vec<String>,
}

impl GenerationRequest {
    /// Keywords only; trend statistics are not consulted.
    #[must_use]
    pub fn keyword(keywords: Vec<String>) -> Self {
        Self {
            variant: Variant::Keyword,
            keywords,
        }
    }

    /// Trend statistics plus any keywords.
    #[must_use]
    pub fn trend(keywords: Vec<String>) -> Self {
        Self {
            variant: Variant::Trend,
            keywords,
        }
    }

    /// Trend statistics, keywords, and all accumulated feedback.
    #[must_use]
    pub fn refine(keywords: Vec<String>) -> Self {
        Self {
            variant: Variant::Refine,
            keywords,
        }
    }

    fn uses_trends(&self) -> bool {
        self.variant != Variant::Keyword
    }

    fn uses_feedback(&self) -> bool {
        self.variant == Variant::Refine
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Profile whose posts serve as style exemplars.
    pub owner: Option<ProfileConfig>,
    pub candidate_count: usize,
    pub engagement_weights: EngagementWeights,
    /// Overrides the trend-derived posting time when set.
    pub best_posting_time: Option<BestPostingTime>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            owner: None,
            candidate_count: 3,
            engagement_weights: EngagementWeights::default(),
            best_posting_time: None,
        }
    }
}

impl GeneratorOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig, profiles: &ProfilesFile) -> Self {
        Self {
            owner: profiles.owner().cloned(),
            candidate_count: config.candidate_count.max(1),
            engagement_weights: config.engagement_weights,
            best_posting_time: config.best_posting_time,
        }
    }
}

pub struct PostGenerator<'a> {
    completion: &'a dyn CompletionService,
    posts: PostStore,
    trends: TrendStore,
    feedback: FeedbackStore,
    generated: GeneratedPostStore,
    options: GeneratorOptions,
}

impl<'a> PostGenerator<'a> {
    #[must_use]
    pub fn new(
        data: &DataDir,
        completion: &'a dyn CompletionService,
        options: GeneratorOptions,
    ) -> Self {
        Self {
            completion,
            posts: PostStore::new(data.posts()),
            trends: TrendStore::new(data.trends()),
            feedback: FeedbackStore::new(data.feedback()),
            generated: GeneratedPostStore::new(data.generated_posts()),
            options,
        }
    }

    /// Generates and persists `candidate_count` posts.
    ///
    /// # Errors
    ///
    /// See [`PostGenerator::generate_at`].
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedPost>, GeneratorError> {
        self.generate_at(request, Utc::now()).await
    }

    /// Generates posts stamped with `now`. Nothing is persisted unless every
    /// requested candidate is usable.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Completion`] if the completion service fails,
    /// [`GeneratorError::Generation`] if fewer than `candidate_count` usable
    /// candidates came back, or [`GeneratorError::Store`] on I/O failure.
    pub async fn generate_at(
        &self,
        request: &GenerationRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<GeneratedPost>, GeneratorError> {
        let requested = self.options.candidate_count;
        let exemplars = self.exemplars()?;
        let excerpt = if request.uses_trends() {
            self.trend_excerpt()?
        } else {
            None
        };
        let feedback: Vec<FeedbackRecord> = if request.uses_feedback() {
            self.feedback.load_all()?
        } else {
            Vec::new()
        };
        if request.uses_feedback() && feedback.is_empty() {
            tracing::warn!("refining without any recorded feedback");
        }

        let prompt = build_prompt(&PromptInputs {
            author: self.options.owner.as_ref().map(ProfileConfig::display_name),
            exemplars: &exemplars,
            keywords: &request.keywords,
            excerpt: excerpt.as_ref(),
            feedback: &feedback,
        });
        let prompt_digest = format!("{:x}", Sha256::digest(prompt.as_bytes()));

        tracing::info!(
            variant = %request.variant,
            requested,
            exemplars = exemplars.len(),
            feedback = feedback.len(),
            trends = excerpt.is_some(),
            prompt_digest = %prompt_digest,
            "generating posts"
        );

        let raw = self.completion.complete(&prompt, requested).await?;
        let candidates: Vec<_> = raw
            .iter()
            .filter_map(|r| parse_candidate(r))
            .take(requested)
            .collect();
        if candidates.len() < requested {
            tracing::error!(
                requested,
                returned = raw.len(),
                usable = candidates.len(),
                "incomplete candidate set, nothing persisted"
            );
            return Err(GeneratorError::Generation {
                requested,
                usable: candidates.len(),
            });
        }

        let posting_time = self.posting_time(excerpt.as_ref());
        let snapshot = excerpt.as_ref().map(serde_json::to_string).transpose()?;
        let feedback_ids: Vec<String> = feedback.iter().map(|f| f.id.clone()).collect();

        let generated: Vec<GeneratedPost> = candidates
            .into_iter()
            .map(|c| GeneratedPost {
                id: uuid::Uuid::new_v4().to_string(),
                variant: request.variant,
                text: c.post_text,
                explanation: c.explanation,
                source_keywords: request.keywords.clone(),
                source_trend_snapshot: snapshot.clone(),
                feedback_ids: feedback_ids.clone(),
                prompt_digest: prompt_digest.clone(),
                suggested_posting_day: posting_time.day,
                suggested_posting_hour: posting_time.hour,
                generation_timestamp: now,
            })
            .collect();

        let written = self.generated.append(&generated)?;
        tracing::info!(written, variant = %request.variant, "generated posts stored");
        Ok(generated)
    }

    /// The owner's highest-engagement posts, best first.
    fn exemplars(&self) -> Result<Vec<PostRecord>, GeneratorError> {
        let Some(owner) = &self.options.owner else {
            return Ok(Vec::new());
        };
        let weights = &self.options.engagement_weights;
        let mut posts: Vec<PostRecord> = self
            .posts
            .load_all()?
            .into_iter()
            .filter(|p| p.source_profile == owner.id)
            .collect();
        posts.sort_by(|a, b| {
            b.engagement(weights)
                .partial_cmp(&a.engagement(weights))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        posts.truncate(EXEMPLAR_COUNT);
        Ok(posts)
    }

    fn trend_excerpt(&self) -> Result<Option<TrendExcerpt>, GeneratorError> {
        let Some(summary) = self.trends.load()? else {
            tracing::warn!("no trends table found, generating without trend data");
            return Ok(None);
        };
        let owner = self.options.owner.as_ref().map(|o| o.id.as_str());
        Ok(TrendExcerpt::from_summary(&summary, owner))
    }

    fn posting_time(&self, excerpt: Option<&TrendExcerpt>) -> BestPostingTime {
        if let Some(fixed) = self.options.best_posting_time {
            return fixed;
        }
        match excerpt {
            Some(e) => BestPostingTime {
                day: e.best_day().unwrap_or(DEFAULT_POSTING_TIME.day),
                hour: e.best_hour.unwrap_or(DEFAULT_POSTING_TIME.hour),
            },
            None => DEFAULT_POSTING_TIME,
        }
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
