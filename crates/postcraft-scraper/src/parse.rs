//! Feed HTML → [`PostRecord`] extraction.
//!
//! A feed page is split into raw fragments (the outer HTML of each update
//! card), and each fragment is parsed on its own so one malformed card never
//! spoils the rest of the page.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, DurationRound, Utc};
use postcraft_core::PostRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::MalformedFragment;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static UPDATE: LazyLock<Selector> = LazyLock::new(|| selector("div.feed-shared-update-v2"));
static TEXT: LazyLock<Selector> = LazyLock::new(|| selector("span.break-words"));
static AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| selector(".update-components-actor__name"));
static TIME: LazyLock<Selector> = LazyLock::new(|| selector("time[datetime]"));
static SUB_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(".update-components-actor__sub-description"));
static REACTIONS: LazyLock<Selector> =
    LazyLock::new(|| selector(".social-details-social-counts__reactions-count"));
static COMMENTS: LazyLock<Selector> =
    LazyLock::new(|| selector(".social-details-social-counts__comments"));
static SHARES: LazyLock<Selector> =
    LazyLock::new(|| selector(".social-details-social-counts__shares"));

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid regex"));
static RELATIVE_AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*(mo|yr|y|w|d|h|m|s)\b").expect("valid regex")
});

/// Returns the outer HTML of every feed update card in `html`.
#[must_use]
pub fn extract_fragments(html: &str) -> Vec<String> {
    Html::parse_document(html)
        .select(&UPDATE)
        .map(|el| el.html())
        .collect()
}

/// Parses one feed fragment.
///
/// `reference` anchors relative age labels such as `3d`; callers pass the
/// start time of the scrape run so every fragment in the run shares it.
///
/// # Errors
///
/// Returns [`MalformedFragment`] when the fragment has no text or no
/// resolvable timestamp.
pub fn parse_fragment(
    fragment: &str,
    profile_id: &str,
    reference: DateTime<Utc>,
) -> Result<PostRecord, MalformedFragment> {
    let doc = Html::parse_fragment(fragment);
    let root = doc.root_element();

    let text = root
        .select(&TEXT)
        .next()
        .map(|el| collapse_whitespace(&element_text(el)))
        .unwrap_or_default();
    if text.is_empty() {
        return Err(MalformedFragment::EmptyText);
    }

    let author = root
        .select(&AUTHOR)
        .next()
        .and_then(|el| el.text().map(str::trim).find(|t| !t.is_empty()))
        .map_or_else(|| profile_id.to_owned(), str::to_owned);

    let timestamp = parse_timestamp(root, reference)?;

    Ok(PostRecord {
        author,
        hashtags: extract_hashtags(&text),
        text,
        timestamp,
        like_count: count(root, &REACTIONS),
        comment_count: count(root, &COMMENTS),
        share_count: count(root, &SHARES),
        source_profile: profile_id.to_owned(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_timestamp(
    root: ElementRef<'_>,
    reference: DateTime<Utc>,
) -> Result<DateTime<Utc>, MalformedFragment> {
    if let Some(raw) = root
        .select(&TIME)
        .next()
        .and_then(|el| el.value().attr("datetime"))
    {
        return DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| MalformedFragment::BadTimestamp(raw.to_owned()));
    }

    let label = root
        .select(&SUB_DESCRIPTION)
        .next()
        .map(|el| collapse_whitespace(&element_text(el)))
        .filter(|s| !s.is_empty())
        .ok_or(MalformedFragment::MissingTimestamp)?;

    resolve_relative_age(&label, reference)
        .ok_or_else(|| MalformedFragment::BadTimestamp(label.clone()))
}

/// Resolves a relative age label (`5m`, `3h`, `2d`, `1w`, `4mo`, `1yr`)
/// against `reference`, truncated to the label's unit: minutes for `s`/`m`,
/// hours for `h`, UTC days for everything longer. The same card seen on a
/// later run of the same day (or hour) resolves to the same instant.
#[must_use]
pub fn resolve_relative_age(label: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = RELATIVE_AGE.captures(label)?;
    let amount: i64 = caps[1].parse().ok()?;
    let (age, unit) = match caps[2].to_ascii_lowercase().as_str() {
        "s" => (Duration::try_seconds(amount)?, Duration::minutes(1)),
        "m" => (Duration::try_minutes(amount)?, Duration::minutes(1)),
        "h" => (Duration::try_hours(amount)?, Duration::hours(1)),
        "d" => (Duration::try_days(amount)?, Duration::days(1)),
        "w" => (Duration::try_weeks(amount)?, Duration::days(1)),
        "mo" => (Duration::try_days(amount.checked_mul(30)?)?, Duration::days(1)),
        "yr" | "y" => (Duration::try_days(amount.checked_mul(365)?)?, Duration::days(1)),
        _ => return None,
    };
    let at = reference.checked_sub_signed(age)?;
    at.duration_trunc(unit).ok()
}

/// Digits of the first element matching `sel`; `1,234 comments` → 1234.
fn count(root: ElementRef<'_>, sel: &Selector) -> u64 {
    root.select(sel)
        .next()
        .map_or(0, |el| clean_number(&element_text(el)))
}

/// Keeps only ASCII digits; empty or overflowing input yields 0.
#[must_use]
pub fn clean_number(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Lowercased `#tag`s in `text`. Feed markup renders tags as `hashtag#tag`,
/// which glues a trailing `hashtag` onto the preceding tag once the text is
/// flattened; that suffix is dropped.
#[must_use]
pub fn extract_hashtags(text: &str) -> BTreeSet<String> {
    HASHTAG
        .captures_iter(text)
        .filter_map(|caps| {
            let tag = caps[1].to_lowercase();
            let tag = match tag.strip_suffix("hashtag") {
                Some(stripped) => stripped.to_owned(),
                None => tag,
            };
            (!tag.is_empty()).then(|| format!("#{tag}"))
        })
        .collect()
}
