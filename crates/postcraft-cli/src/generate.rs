//! `generate`, `refine`, and `feedback` command handlers.

use postcraft_core::{load_profiles, weekday_name, AppConfig, ProfilesFile};
use postcraft_generator::{
    ChatCompletionClient, FeedbackLoop, GenerationRequest, GeneratorOptions, PostGenerator,
};

/// Profiles are optional for generation; without them there are no exemplars.
fn profiles_or_empty(config: &AppConfig) -> anyhow::Result<ProfilesFile> {
    if !config.profiles_path.exists() {
        tracing::warn!(
            path = %config.profiles_path.display(),
            "profiles file not found, generating without style exemplars"
        );
        return Ok(ProfilesFile { profiles: vec![] });
    }
    Ok(load_profiles(&config.profiles_path)?)
}

/// # Errors
///
/// Returns an error if no completion API key is configured, the completion
/// service fails, fewer candidates than requested are usable, or a store
/// cannot be read or written.
pub(crate) async fn run_generate(
    config: &AppConfig,
    request: &GenerationRequest,
) -> anyhow::Result<()> {
    let profiles = profiles_or_empty(config)?;
    let client = ChatCompletionClient::new(config)?;
    let generator = PostGenerator::new(
        &config.data(),
        &client,
        GeneratorOptions::from_config(config, &profiles),
    );

    let posts = generator.generate(request).await?;
    for (i, post) in posts.iter().enumerate() {
        println!(
            "--- candidate {} of {} [{}] ---",
            i + 1,
            posts.len(),
            post.id
        );
        println!("{}", post.text);
        if !post.explanation.is_empty() {
            println!("\nwhy: {}", post.explanation);
        }
        println!(
            "suggested: {} {:02}:00 UTC\n",
            weekday_name(post.suggested_posting_day),
            post.suggested_posting_hour
        );
    }
    println!(
        "stored {} {} posts in {}",
        posts.len(),
        request.variant,
        config.generated_posts_path().display()
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if the post id is unknown, the comment is blank, or the
/// feedback store cannot be written.
pub(crate) fn run_feedback(
    config: &AppConfig,
    post_id: &str,
    comment: &str,
) -> anyhow::Result<()> {
    let record = FeedbackLoop::new(&config.data()).submit_feedback(post_id, comment)?;
    println!(
        "recorded feedback {} on post {}; run `refine` to apply it",
        record.id, record.target_generated_post_id
    );
    Ok(())
}
