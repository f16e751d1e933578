//! Feedback on generated posts, folded into later `refine` runs.

use chrono::{DateTime, Utc};
use postcraft_core::{DataDir, FeedbackRecord};
use postcraft_store::{FeedbackStore, GeneratedPostStore};

use crate::error::FeedbackError;

pub struct FeedbackLoop {
    generated: GeneratedPostStore,
    feedback: FeedbackStore,
}

impl FeedbackLoop {
    #[must_use]
    pub fn new(data: &DataDir) -> Self {
        Self {
            generated: GeneratedPostStore::new(data.generated_posts()),
            feedback: FeedbackStore::new(data.feedback()),
        }
    }

    /// Records `comment` against a stored generated post.
    ///
    /// # Errors
    ///
    /// See [`FeedbackLoop::submit_feedback_at`].
    pub fn submit_feedback(
        &self,
        generated_post_id: &str,
        comment: &str,
    ) -> Result<FeedbackRecord, FeedbackError> {
        self.submit_feedback_at(generated_post_id, comment, Utc::now())
    }

    /// # Errors
    ///
    /// Returns [`FeedbackError::NotFound`] if no generated post has
    /// `generated_post_id`, [`FeedbackError::EmptyComment`] if `comment` is
    /// blank, or [`FeedbackError::Store`] on I/O failure. Nothing is appended
    /// on error.
    pub fn submit_feedback_at(
        &self,
        generated_post_id: &str,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<FeedbackRecord, FeedbackError> {
        let id = generated_post_id.trim();
        if !self.generated.contains(id)? {
            return Err(FeedbackError::NotFound(id.to_string()));
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(FeedbackError::EmptyComment);
        }

        let record = FeedbackRecord {
            id: uuid::Uuid::new_v4().to_string(),
            target_generated_post_id: id.to_string(),
            comment: comment.to_string(),
            timestamp: now,
        };
        self.feedback.append(&record)?;
        tracing::info!(feedback_id = %record.id, post_id = %id, "feedback recorded");
        Ok(record)
    }

    /// All feedback recorded so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::Store`] if the feedback table cannot be read.
    pub fn load_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        Ok(self.feedback.load_all()?)
    }
}
