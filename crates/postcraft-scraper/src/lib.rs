pub mod client;
pub mod error;
pub mod pagination;
pub mod parse;
pub mod pipeline;
pub mod retry;

pub use client::{FeedClient, FeedPage, FeedSource};
pub use error::{FetchError, MalformedFragment, ScraperError};
pub use parse::{extract_fragments, parse_fragment};
pub use pipeline::{select_profiles, ProfileOutcome, ScrapeOptions, ScrapePipeline, ScrapeSummary};
pub use retry::{Attempt, RetryPolicy};
