//! Cursor pagination via the `Link` response header.
//!
//! ```text
//! <https://www.linkedin.com/in/jane/recent-activity/all/?cursor=PREV>; rel="previous",
//! <https://www.linkedin.com/in/jane/recent-activity/all/?cursor=NEXT>; rel="next"
//! ```

/// Query parameter carrying the page cursor.
pub const CURSOR_PARAM: &str = "cursor";

/// Extracts the cursor of the `rel="next"` link, if any.
#[must_use]
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    header
        .split(',')
        .map(str::trim)
        .find(|segment| segment.contains(r#"rel="next""#))
        .and_then(angle_bracket_url)
        .and_then(|url| query_param(url, CURSOR_PARAM))
}

fn angle_bracket_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    (start < end).then(|| &segment[start..end])
}

/// Decoded value of `param`. Relative link targets are resolved against a
/// placeholder origin since only the query matters.
fn query_param(url: &str, param: &str) -> Option<String> {
    let base = reqwest::Url::parse("http://link.invalid/").ok()?;
    let url = base.join(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
