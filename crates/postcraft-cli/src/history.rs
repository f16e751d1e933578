use postcraft_core::{weekday_name, AppConfig};
use postcraft_store::GeneratedPostStore;

use crate::preview;

/// Prints the last `limit` generated posts, oldest first.
///
/// # Errors
///
/// Returns an error if the generated-posts store cannot be read.
pub(crate) fn run_history(config: &AppConfig, limit: usize) -> anyhow::Result<()> {
    let posts = GeneratedPostStore::new(config.generated_posts_path()).load_all()?;
    if posts.is_empty() {
        println!("no generated posts yet; run `generate` first");
        return Ok(());
    }

    let skip = posts.len().saturating_sub(limit);
    println!(
        "{:<38}{:<9}{:<18}{:<16}TEXT",
        "ID", "VARIANT", "GENERATED", "SUGGESTED"
    );
    for post in &posts[skip..] {
        let suggested = format!(
            "{} {:02}:00",
            &weekday_name(post.suggested_posting_day)[..3],
            post.suggested_posting_hour
        );
        let generated = post.generation_timestamp.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<38}{:<9}{:<18}{:<16}{}",
            post.id,
            post.variant,
            generated,
            suggested,
            preview(&post.text, 50)
        );
    }
    Ok(())
}
