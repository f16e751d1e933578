//! `scrape` command handler.
//!
//! Per-profile failures are recorded in the summary and skipped so one bad
//! profile does not abort the run.

use postcraft_core::{load_profiles, AppConfig};
use postcraft_scraper::{
    select_profiles, FeedClient, RetryPolicy, ScrapeOptions, ScrapePipeline, ScrapeSummary,
};
use postcraft_store::{DiagnosticsDir, PostStore};

/// # Errors
///
/// Returns an error if the profiles file or session cookie is missing, the
/// profile filter matches nothing, the post store fails, or every selected
/// profile failed.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    profile: Option<&str>,
    max_pages: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let profiles = load_profiles(&config.profiles_path)?;
    let selected = select_profiles(&profiles, profile)?;
    if selected.is_empty() {
        println!("no profiles configured in {}", config.profiles_path.display());
        return Ok(());
    }

    let client = FeedClient::new(config)?;
    let store = PostStore::new(config.posts_path());
    let diagnostics = DiagnosticsDir::new(config.diagnostics_dir());

    let mut options = ScrapeOptions::from_config(config);
    options.dry_run = dry_run;
    if let Some(n) = max_pages {
        options.max_pages = n.max(1);
    }

    let pipeline = ScrapePipeline::new(
        &client,
        &store,
        &diagnostics,
        RetryPolicy::from_config(config),
        options,
    );
    let summary = pipeline.run(&selected).await?;
    print_summary(&summary, dry_run);

    let failed = summary.failed_profiles();
    if !failed.is_empty() && failed.len() == summary.outcomes.len() {
        anyhow::bail!(
            "all {} profiles failed; see {} for snapshots",
            failed.len(),
            config.diagnostics_dir().display()
        );
    }
    Ok(())
}

fn print_summary(summary: &ScrapeSummary, dry_run: bool) {
    println!(
        "{:<28}{:>7}{:>7}{:>7}{:>7}{:>7}  STATUS",
        "PROFILE", "PAGES", "SEEN", "BAD", "DUPES", "NEW"
    );
    for o in &summary.outcomes {
        let status = o.error.as_deref().unwrap_or("ok");
        println!(
            "{:<28}{:>7}{:>7}{:>7}{:>7}{:>7}  {}",
            o.profile_id,
            o.pages_fetched,
            o.fragments_seen,
            o.malformed,
            o.duplicates,
            o.new_posts,
            status
        );
    }

    let verb = if dry_run { "would add" } else { "added" };
    println!(
        "{verb} {} new posts across {} profiles ({} failed)",
        summary.total_new_posts(),
        summary.outcomes.len(),
        summary.failed_profiles().len()
    );
}
