//! Post generation: prompt assembly, the chat-completion client, and the
//! feedback loop.

pub mod completion;
pub mod error;
pub mod feedback;
pub mod generator;
pub mod prompt;

pub use completion::{ChatCompletionClient, ChatSettings, CompletionService};
pub use error::{CompletionError, FeedbackError, GeneratorError};
pub use feedback::FeedbackLoop;
pub use generator::{GenerationRequest, GeneratorOptions, PostGenerator, DEFAULT_POSTING_TIME};
pub use prompt::{
    build_prompt, parse_candidate, Candidate, CtaPreference, PromptInputs, TrendExcerpt,
};
