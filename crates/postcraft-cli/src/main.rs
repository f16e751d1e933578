mod analyze;
mod generate;
mod history;
mod scrape;

use clap::{CommandFactory, Parser, Subcommand};
use postcraft_generator::GenerationRequest;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postcraft")]
#[command(about = "Scrape professional-network posts, mine trends, and draft new posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch recent posts for the configured profiles into the post store
    Scrape {
        /// Scrape only this profile id
        #[arg(long)]
        profile: Option<String>,

        /// Override the per-profile page limit
        #[arg(long)]
        max_pages: Option<usize>,

        /// Fetch and parse but do not write the post store
        #[arg(long)]
        dry_run: bool,
    },
    /// Recompute the trends table from the post store
    Analyze,
    /// Draft candidate posts
    Generate {
        /// Keyword to focus on (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Ignore trend statistics and draft from keywords only
        #[arg(long)]
        no_trends: bool,
    },
    /// Draft new candidates with all recorded feedback applied
    Refine {
        /// Keyword to focus on (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },
    /// Record feedback on a generated post
    Feedback {
        #[arg(long)]
        post_id: String,

        #[arg(long)]
        comment: String,
    },
    /// List generated posts, newest last
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = postcraft_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, data_dir = %config.data_dir.display(), "config loaded");

    match command {
        Commands::Scrape {
            profile,
            max_pages,
            dry_run,
        } => scrape::run_scrape(&config, profile.as_deref(), max_pages, dry_run).await,
        Commands::Analyze => analyze::run_analyze(&config),
        Commands::Generate {
            keywords,
            no_trends,
        } => {
            let request = if no_trends {
                GenerationRequest::keyword(keywords)
            } else {
                GenerationRequest::trend(keywords)
            };
            generate::run_generate(&config, &request).await
        }
        Commands::Refine { keywords } => {
            generate::run_generate(&config, &GenerationRequest::refine(keywords)).await
        }
        Commands::Feedback { post_id, comment } => {
            generate::run_feedback(&config, &post_id, &comment)
        }
        Commands::History { limit } => history::run_history(&config, limit),
    }
}

/// First `max` characters of `text` on one line, with `...` when cut.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        format!("{}...", flat.chars().take(max).collect::<String>())
    } else {
        flat
    }
}

#[cfg(test)]
mod tests;
