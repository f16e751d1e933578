//! Bounded retry with configurable back-off for feed fetches.
//!
//! Each attempt is classified into an [`Attempt`]. Transient failures are
//! retried on the [`Backoff`] schedule until `max_attempts` is spent; the last
//! failing response is then handed to a [`DiagnosticsSink`] before the error
//! is returned. Auth and not-found failures are returned at once.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use postcraft_core::{AppConfig, Backoff};
use postcraft_store::{DiagnosticSnapshot, DiagnosticsSink};

use crate::error::FetchError;

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Success(T),
    Retryable(FetchError),
    Terminal(FetchError),
}

impl<T> From<Result<T, FetchError>> for Attempt<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Attempt::Success(value),
            Err(err) if err.is_retryable() => Attempt::Retryable(err),
            Err(err) => Attempt::Terminal(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// `max_attempts` counts every attempt including the first; values below
    /// one are raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.retry_max_attempts, config.retry_backoff)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed { delay } => delay,
            Backoff::Exponential { base, max, jitter } => {
                let factor = 1u32 << retry.saturating_sub(1).min(20);
                let capped = base.saturating_mul(factor).min(max);
                if jitter {
                    capped.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
                } else {
                    capped
                }
            }
        }
    }

    /// Runs `operation` for `profile_id` until it succeeds, fails terminally,
    /// or exhausts `max_attempts`.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`FetchError`], or the last transient one once
    /// every attempt has failed.
    pub async fn run<T, F, Fut>(
        &self,
        profile_id: &str,
        diagnostics: &dyn DiagnosticsSink,
        mut operation: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1u32;
        loop {
            match Attempt::from(operation().await) {
                Attempt::Success(value) => return Ok(value),
                Attempt::Terminal(err) => {
                    if err.body().is_some() {
                        save_snapshot(diagnostics, profile_id, attempt, &err);
                    }
                    return Err(err);
                }
                Attempt::Retryable(err) if attempt >= self.max_attempts => {
                    tracing::error!(
                        profile = %profile_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "retries exhausted"
                    );
                    save_snapshot(diagnostics, profile_id, attempt, &err);
                    return Err(err);
                }
                Attempt::Retryable(err) => {
                    let delay = self.delay_for(attempt);
                    #[allow(clippy::cast_possible_truncation)]
                    let delay_ms = delay.as_millis() as u64;
                    tracing::warn!(
                        profile = %profile_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms,
                        error = %err,
                        "transient fetch error, retrying after back-off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn save_snapshot(sink: &dyn DiagnosticsSink, profile_id: &str, attempt: u32, err: &FetchError) {
    let snapshot = DiagnosticSnapshot {
        profile_id: profile_id.to_owned(),
        timestamp: Utc::now(),
        attempt,
        reason: err.to_string(),
        body: err.body().map(str::to_owned),
    };
    if let Err(e) = sink.record(&snapshot) {
        tracing::error!(profile = %profile_id, attempt, error = %e, "failed to save diagnostic snapshot");
    }
}
