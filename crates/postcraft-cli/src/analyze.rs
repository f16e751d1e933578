use postcraft_core::{AppConfig, SCOPE_ALL};
use postcraft_trends::run_analysis;

/// Rewrites the trends and analyzed-posts tables and prints the headline
/// numbers for the all-profiles scope.
///
/// # Errors
///
/// Returns an error if the post store is missing or a table cannot be written.
pub(crate) fn run_analyze(config: &AppConfig) -> anyhow::Result<()> {
    let report = run_analysis(config)?;
    println!(
        "analyzed {} posts into {} trend rows across {} scopes",
        report.posts_analyzed,
        report.trend_rows,
        report.summary.scopes.len()
    );

    let Some(all) = report.summary.scope(SCOPE_ALL) else {
        return Ok(());
    };
    let best = |m: &std::collections::BTreeMap<String, f64>| {
        m.iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map_or_else(|| "-".to_string(), |(k, v)| format!("{k} ({v:.2})"))
    };
    println!("mean engagement: {:.2}", all.engagement_mean);
    println!("best weekday: {}", best(&all.engagement_by_weekday));
    println!("best hour:    {}", best(&all.engagement_by_hour));
    println!("best tone:    {}", best(&all.engagement_by_tone));
    println!("best topic:   {}", best(&all.engagement_by_topic));
    println!("best hashtag count: {}", best(&all.engagement_by_hashtag_count));
    Ok(())
}
