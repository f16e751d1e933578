//! HTTP client for profile activity feeds.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postcraft_core::{is_valid_profile_id, AppConfig};
use reqwest::cookie::Jar;
use reqwest::{Client, StatusCode, Url};

use crate::error::{FetchError, ScraperError};
use crate::pagination::{extract_next_cursor, CURSOR_PARAM};
use crate::parse::extract_fragments;

/// Session cookie name used when the configured value is a bare token.
const SESSION_COOKIE_NAME: &str = "li_at";

/// Path segments that mean the session was bounced to a sign-in wall.
const AUTH_WALL_SEGMENTS: &[&str] = &["login", "checkpoint", "authwall"];

/// One page of a profile's activity feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    /// Outer HTML of each update card on the page.
    pub fragments: Vec<String>,
    pub next_cursor: Option<String>,
}

/// Source of raw feed pages.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches one page of `profile_id`'s feed, starting at `cursor`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Auth`] when the session is rejected.
    /// - [`FetchError::NotFound`] for an unknown or invalid profile id.
    /// - [`FetchError::Transient`] for throttling, server errors and network failures.
    async fn fetch_feed_page(
        &self,
        profile_id: &str,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FetchError>;
}

/// Feed client backed by `reqwest` with a cookie jar holding the session.
///
/// Use [`FeedClient::new`] for production or [`FeedClient::with_base_url`] to
/// point at a mock server in tests.
pub struct FeedClient {
    client: Client,
    base_url: Url,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingSessionCookie`] if no session cookie is
    /// configured, or any error from [`Self::with_base_url`].
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        let cookie = config
            .session_cookie
            .as_deref()
            .ok_or(ScraperError::MissingSessionCookie)?;
        Self::with_base_url(
            &config.feed_base_url,
            cookie,
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
        )
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        session_cookie: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        // A trailing slash keeps `join` from replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let jar = Jar::default();
        jar.add_cookie_str(&session_cookie_pair(session_cookie), &base_url);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .cookie_provider(Arc::new(jar))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn feed_url(&self, profile_id: &str, cursor: Option<&str>) -> Result<Url, FetchError> {
        let not_found = || FetchError::NotFound {
            profile_id: profile_id.to_owned(),
        };
        if !is_valid_profile_id(profile_id) {
            return Err(not_found());
        }
        let mut url = self
            .base_url
            .join(&format!("in/{profile_id}/recent-activity/all/"))
            .map_err(|_| not_found())?;
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair(CURSOR_PARAM, cursor);
        }
        Ok(url)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_feed_page(
        &self,
        profile_id: &str,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FetchError> {
        let url = self.feed_url(profile_id, cursor)?;
        tracing::debug!(profile = %profile_id, %url, "fetching feed page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transient_from_reqwest(&e))?;

        let status = response.status();
        if is_auth_wall(response.url()) {
            return Err(FetchError::Auth {
                profile_id: profile_id.to_owned(),
                reason: format!("redirected to {}", response.url().path()),
            });
        }
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(FetchError::Auth {
                profile_id: profile_id.to_owned(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                profile_id: profile_id.to_owned(),
            });
        }

        // Read the Link header before the body consumes the response.
        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| transient_from_reqwest(&e))?;

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FetchError::Transient {
                reason: format!("HTTP {}", status.as_u16()),
                body: Some(body),
            });
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                profile_id: profile_id.to_owned(),
                body: Some(body),
            });
        }

        Ok(FeedPage {
            fragments: extract_fragments(&body),
            next_cursor: extract_next_cursor(link_header.as_deref()),
        })
    }
}

fn session_cookie_pair(value: &str) -> String {
    if value.contains('=') {
        value.to_owned()
    } else {
        format!("{SESSION_COOKIE_NAME}={value}")
    }
}

fn is_auth_wall(url: &Url) -> bool {
    url.path_segments()
        .is_some_and(|mut segments| segments.any(|s| AUTH_WALL_SEGMENTS.contains(&s)))
}

fn transient_from_reqwest(err: &reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    FetchError::Transient {
        reason: format!("{kind}: {err}"),
        body: None,
    }
}
