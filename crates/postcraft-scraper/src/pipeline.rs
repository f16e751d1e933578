//! Profile-by-profile scrape into the post store.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use postcraft_core::{AppConfig, PostKey, PostRecord, ProfileConfig, ProfilesFile};
use postcraft_store::{DiagnosticsSink, PostStore};

use crate::client::FeedSource;
use crate::error::{FetchError, ScraperError};
use crate::parse::parse_fragment;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub max_pages: usize,
    pub inter_request_delay: Duration,
    pub inter_profile_delay: Duration,
    /// Parse and de-duplicate but leave the post store untouched.
    pub dry_run: bool,
}

impl ScrapeOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_pages: config.scraper_max_pages,
            inter_request_delay: Duration::from_millis(config.scraper_inter_request_delay_ms),
            inter_profile_delay: Duration::from_millis(config.scraper_inter_profile_delay_ms),
            dry_run: false,
        }
    }
}

/// Result of scraping one profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileOutcome {
    pub profile_id: String,
    pub pages_fetched: usize,
    pub fragments_seen: usize,
    pub malformed: usize,
    pub duplicates: usize,
    pub new_posts: usize,
    /// Set when the profile failed; its records were discarded.
    pub error: Option<String>,
}

impl ProfileOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<ProfileOutcome>,
}

impl ScrapeSummary {
    #[must_use]
    pub fn total_new_posts(&self) -> usize {
        self.outcomes.iter().map(|o| o.new_posts).sum()
    }

    #[must_use]
    pub fn failed_profiles(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| o.profile_id.as_str())
            .collect()
    }
}

/// Records gathered for one profile before de-duplication.
struct Collected {
    records: Vec<PostRecord>,
    pages: usize,
    fragments: usize,
    malformed: usize,
}

pub struct ScrapePipeline<'a> {
    source: &'a dyn FeedSource,
    store: &'a PostStore,
    diagnostics: &'a dyn DiagnosticsSink,
    retry: RetryPolicy,
    options: ScrapeOptions,
}

impl<'a> ScrapePipeline<'a> {
    pub fn new(
        source: &'a dyn FeedSource,
        store: &'a PostStore,
        diagnostics: &'a dyn DiagnosticsSink,
        retry: RetryPolicy,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            source,
            store,
            diagnostics,
            retry,
            options,
        }
    }

    /// Scrapes `profiles` in order, anchoring relative post ages to now.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Store`] if the post store cannot be read or
    /// written. Fetch failures are recorded per profile instead.
    pub async fn run(&self, profiles: &[ProfileConfig]) -> Result<ScrapeSummary, ScraperError> {
        self.run_at(profiles, Utc::now()).await
    }

    /// Like [`Self::run`] with an explicit reference time.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub async fn run_at(
        &self,
        profiles: &[ProfileConfig],
        started_at: DateTime<Utc>,
    ) -> Result<ScrapeSummary, ScraperError> {
        let mut seen: HashSet<PostKey> = self.store.existing_keys()?;
        tracing::info!(
            profiles = profiles.len(),
            existing_posts = seen.len(),
            dry_run = self.options.dry_run,
            "starting scrape"
        );

        let mut outcomes = Vec::with_capacity(profiles.len());
        for (i, profile) in profiles.iter().enumerate() {
            if i > 0 && !self.options.inter_profile_delay.is_zero() {
                tokio::time::sleep(self.options.inter_profile_delay).await;
            }

            let mut outcome = ProfileOutcome {
                profile_id: profile.id.clone(),
                ..ProfileOutcome::default()
            };

            match self.collect_profile(&profile.id, started_at).await {
                Ok(collected) => {
                    outcome.pages_fetched = collected.pages;
                    outcome.fragments_seen = collected.fragments;
                    outcome.malformed = collected.malformed;

                    let mut fresh = Vec::with_capacity(collected.records.len());
                    for record in collected.records {
                        if seen.insert(record.key()) {
                            fresh.push(record);
                        } else {
                            outcome.duplicates += 1;
                        }
                    }
                    outcome.new_posts = fresh.len();
                    if !self.options.dry_run && !fresh.is_empty() {
                        self.store.append(&fresh)?;
                    }
                    tracing::info!(
                        profile = %profile.id,
                        pages = outcome.pages_fetched,
                        new_posts = outcome.new_posts,
                        duplicates = outcome.duplicates,
                        malformed = outcome.malformed,
                        "profile scraped"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        profile = %profile.id,
                        error = %e,
                        "profile scrape failed, discarding its records"
                    );
                    outcome.error = Some(e.to_string());
                }
            }
            outcomes.push(outcome);
        }

        Ok(ScrapeSummary {
            started_at,
            outcomes,
        })
    }

    async fn collect_profile(
        &self,
        profile_id: &str,
        reference: DateTime<Utc>,
    ) -> Result<Collected, FetchError> {
        let mut collected = Collected {
            records: Vec::new(),
            pages: 0,
            fragments: 0,
            malformed: 0,
        };
        let mut cursor: Option<String> = None;
        let mut visited: HashSet<String> = HashSet::new();

        while collected.pages < self.options.max_pages {
            if collected.pages > 0 && !self.options.inter_request_delay.is_zero() {
                tokio::time::sleep(self.options.inter_request_delay).await;
            }

            let current = cursor.as_deref();
            let page = self
                .retry
                .run(profile_id, self.diagnostics, || {
                    self.source.fetch_feed_page(profile_id, current)
                })
                .await?;
            collected.pages += 1;
            collected.fragments += page.fragments.len();

            for fragment in &page.fragments {
                match parse_fragment(fragment, profile_id, reference) {
                    Ok(record) => collected.records.push(record),
                    Err(reason) => {
                        collected.malformed += 1;
                        tracing::debug!(profile = %profile_id, %reason, "skipping malformed fragment");
                    }
                }
            }

            if let Some(current) = cursor.take() {
                visited.insert(current);
            }
            match page.next_cursor {
                Some(next) if visited.contains(&next) => {
                    tracing::warn!(profile = %profile_id, cursor = %next, "feed cursor already visited, stopping");
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(collected)
    }
}

/// Profiles to scrape: just `only` when given, else every configured one.
///
/// # Errors
///
/// Returns [`ScraperError::UnknownProfile`] if `only` is not configured.
pub fn select_profiles(
    profiles: &ProfilesFile,
    only: Option<&str>,
) -> Result<Vec<ProfileConfig>, ScraperError> {
    match only {
        Some(id) => profiles
            .get(id)
            .cloned()
            .map(|p| vec![p])
            .ok_or_else(|| ScraperError::UnknownProfile(id.to_owned())),
        None => Ok(profiles.profiles.clone()),
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
