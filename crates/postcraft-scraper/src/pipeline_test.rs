use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::TimeZone;
use postcraft_core::Backoff;
use postcraft_store::DiagnosticsDir;

use super::*;
use crate::client::FeedPage;

/// Serves canned pages keyed by `(profile, cursor)`; failures are produced
/// fresh on every call since `FetchError` is not `Clone`.
#[derive(Default)]
struct StubSource {
    pages: HashMap<(String, Option<String>), FeedPage>,
    auth_failures: HashSet<(String, Option<String>)>,
    always_transient: Vec<String>,
    calls: AtomicUsize,
}

impl StubSource {
    fn page(mut self, profile: &str, cursor: Option<&str>, cards: Vec<String>, next: Option<&str>) -> Self {
        self.pages.insert(
            (profile.to_owned(), cursor.map(str::to_owned)),
            FeedPage {
                fragments: cards,
                next_cursor: next.map(str::to_owned),
            },
        );
        self
    }

    fn auth_failure(mut self, profile: &str, cursor: Option<&str>) -> Self {
        self.auth_failures
            .insert((profile.to_owned(), cursor.map(str::to_owned)));
        self
    }
}

#[async_trait]
impl FeedSource for StubSource {
    async fn fetch_feed_page(
        &self,
        profile_id: &str,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (profile_id.to_owned(), cursor.map(str::to_owned));
        if self.always_transient.iter().any(|p| p == profile_id) {
            return Err(FetchError::Transient {
                reason: "HTTP 503".into(),
                body: Some("<html>down</html>".into()),
            });
        }
        if self.auth_failures.contains(&key) {
            return Err(FetchError::Auth {
                profile_id: profile_id.to_owned(),
                reason: "HTTP 401".into(),
            });
        }
        Ok(self.pages.get(&key).cloned().unwrap_or_default())
    }
}

fn card(author: &str, datetime: &str, text: &str) -> String {
    format!(
        r#"<div class="feed-shared-update-v2">
             <span class="update-components-actor__name">{author}</span>
             <time datetime="{datetime}"></time>
             <span class="break-words">{text}</span>
             <span class="social-details-social-counts__reactions-count">10</span>
           </div>"#
    )
}

fn malformed_card() -> String {
    r#"<div class="feed-shared-update-v2"><span class="break-words"></span></div>"#.to_owned()
}

fn profile(id: &str) -> ProfileConfig {
    ProfileConfig {
        id: id.to_owned(),
        name: None,
        owner: false,
    }
}

fn options() -> ScrapeOptions {
    ScrapeOptions {
        max_pages: 10,
        inter_request_delay: Duration::ZERO,
        inter_profile_delay: Duration::ZERO,
        dry_run: false,
    }
}

fn started() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

struct Fixture {
    dir: tempfile::TempDir,
    store: PostStore,
    diagnostics: DiagnosticsDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = PostStore::new(dir.path().join("posts.csv"));
    let diagnostics = DiagnosticsDir::new(dir.path().join("diagnostics"));
    Fixture {
        dir,
        store,
        diagnostics,
    }
}

#[tokio::test]
async fn deduplicates_against_store_pages_and_profiles() {
    let fx = fixture();
    let existing = parse_fragment(&card("Ann", "2024-05-01T09:00:00Z", "old"), "a", started()).unwrap();
    fx.store.append(&[existing]).unwrap();

    let source = StubSource::default()
        .page(
            "a",
            None,
            vec![
                card("Ann", "2024-05-01T09:00:00Z", "old again"),
                card("Ann", "2024-05-02T09:00:00Z", "x"),
            ],
            Some("p2"),
        )
        .page(
            "a",
            Some("p2"),
            vec![
                card("Ann", "2024-05-02T09:00:00Z", "x repeated"),
                card("Bob", "2024-05-03T09:00:00Z", "y"),
            ],
            None,
        )
        .page(
            "b",
            None,
            vec![
                card("Bob", "2024-05-03T09:00:00Z", "y reshared"),
                card("Bob", "2024-05-04T09:00:00Z", "z"),
            ],
            None,
        );

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(3, Backoff::none()),
        options(),
    );
    let summary = pipeline
        .run_at(&[profile("a"), profile("b")], started())
        .await
        .unwrap();

    let a = &summary.outcomes[0];
    assert_eq!((a.pages_fetched, a.new_posts, a.duplicates), (2, 2, 2));
    let b = &summary.outcomes[1];
    assert_eq!((b.pages_fetched, b.new_posts, b.duplicates), (1, 1, 1));
    assert_eq!(summary.total_new_posts(), 3);

    let stored = fx.store.load_all().unwrap();
    assert_eq!(stored.len(), 4);
    let keys: HashSet<PostKey> = stored.iter().map(PostRecord::key).collect();
    assert_eq!(keys.len(), stored.len());
}

#[tokio::test]
async fn failed_profile_is_all_or_nothing_and_run_continues() {
    let fx = fixture();
    let source = StubSource::default()
        .page("a", None, vec![card("Ann", "2024-05-02T09:00:00Z", "x")], Some("p2"))
        .auth_failure("a", Some("p2"))
        .page("b", None, vec![card("Bob", "2024-05-03T09:00:00Z", "y")], None);

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(3, Backoff::none()),
        options(),
    );
    let summary = pipeline
        .run_at(&[profile("a"), profile("b")], started())
        .await
        .unwrap();

    assert!(!summary.outcomes[0].succeeded());
    assert_eq!(summary.outcomes[0].new_posts, 0);
    assert!(summary.outcomes[1].succeeded());
    assert_eq!(summary.failed_profiles(), vec!["a"]);

    let stored = fx.store.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].author, "Bob");
    // auth failures are never retried
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_profile_leaves_one_snapshot() {
    let fx = fixture();
    let source = StubSource {
        always_transient: vec!["a".into()],
        ..StubSource::default()
    };

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(2, Backoff::none()),
        options(),
    );
    let summary = pipeline.run_at(&[profile("a")], started()).await.unwrap();

    assert_eq!(summary.failed_profiles(), vec!["a"]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    let files: Vec<_> = std::fs::read_dir(fx.dir.path().join("diagnostics"))
        .unwrap()
        .collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn malformed_fragments_are_counted_not_fatal() {
    let fx = fixture();
    let source = StubSource::default().page(
        "a",
        None,
        vec![malformed_card(), card("Ann", "2024-05-02T09:00:00Z", "x")],
        None,
    );

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(1, Backoff::none()),
        options(),
    );
    let summary = pipeline.run_at(&[profile("a")], started()).await.unwrap();

    let a = &summary.outcomes[0];
    assert!(a.succeeded());
    assert_eq!((a.fragments_seen, a.malformed, a.new_posts), (2, 1, 1));
}

#[tokio::test]
async fn stops_at_max_pages() {
    let fx = fixture();
    let source = StubSource::default()
        .page("a", None, vec![card("Ann", "2024-05-02T09:00:00Z", "x")], Some("p2"))
        .page("a", Some("p2"), vec![card("Ann", "2024-05-03T09:00:00Z", "y")], Some("p3"));

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(1, Backoff::none()),
        ScrapeOptions {
            max_pages: 1,
            ..options()
        },
    );
    let summary = pipeline.run_at(&[profile("a")], started()).await.unwrap();

    assert_eq!(summary.outcomes[0].pages_fetched, 1);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stops_when_cursor_cycles_back() {
    let fx = fixture();
    let source = StubSource::default()
        .page("a", None, vec![card("Ann", "2024-05-01T09:00:00Z", "w")], Some("A"))
        .page("a", Some("A"), vec![card("Ann", "2024-05-02T09:00:00Z", "x")], Some("B"))
        .page("a", Some("B"), vec![card("Ann", "2024-05-03T09:00:00Z", "y")], Some("A"));

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(1, Backoff::none()),
        options(),
    );
    let summary = pipeline.run_at(&[profile("a")], started()).await.unwrap();

    let a = &summary.outcomes[0];
    assert!(a.succeeded());
    assert_eq!((a.pages_fetched, a.new_posts), (3, 3));
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn stops_when_cursor_repeats_immediately() {
    let fx = fixture();
    let source = StubSource::default()
        .page("a", None, vec![card("Ann", "2024-05-01T09:00:00Z", "w")], Some("A"))
        .page("a", Some("A"), vec![card("Ann", "2024-05-02T09:00:00Z", "x")], Some("A"));

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(1, Backoff::none()),
        options(),
    );
    let summary = pipeline.run_at(&[profile("a")], started()).await.unwrap();

    assert_eq!(summary.outcomes[0].pages_fetched, 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dry_run_leaves_store_untouched() {
    let fx = fixture();
    let source =
        StubSource::default().page("a", None, vec![card("Ann", "2024-05-02T09:00:00Z", "x")], None);

    let pipeline = ScrapePipeline::new(
        &source,
        &fx.store,
        &fx.diagnostics,
        RetryPolicy::new(1, Backoff::none()),
        ScrapeOptions {
            dry_run: true,
            ..options()
        },
    );
    let summary = pipeline.run_at(&[profile("a")], started()).await.unwrap();

    assert_eq!(summary.total_new_posts(), 1);
    assert!(!fx.store.exists());
}

#[test]
fn select_profiles_filters_by_id() {
    let file = ProfilesFile {
        profiles: vec![profile("a"), profile("b")],
    };
    assert_eq!(select_profiles(&file, None).unwrap().len(), 2);
    assert_eq!(select_profiles(&file, Some("b")).unwrap()[0].id, "b");
    assert!(matches!(
        select_profiles(&file, Some("zed")),
        Err(ScraperError::UnknownProfile(_))
    ));
}
