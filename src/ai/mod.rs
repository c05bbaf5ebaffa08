//! AI-assisted search.
//!
//! Everything that talks to the external chat-completion service lives
//! here:
//!
//! - `settings`: validated endpoint configuration
//! - `transport`: the completion call itself (OpenAI compatible)
//! - `response`: pulling JSON out of free-form completion text
//! - `semantic`: ranking bookmarks by meaning, with timeout and fallback
//! - `suggest`: query expansions for the suggestion list

mod response;
mod semantic;
mod settings;
mod suggest;
mod transport;

pub use semantic::{AiSearchOptions, AiSearchOutcome, AiSearcher};
pub use settings::{AiEndpoint, AiSettings};
pub use transport::{CompletionTransport, OpenAiTransport};

/// Default bound on a single AI call.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI search is not configured")]
    NotConfigured,

    #[error("AI request timed out after {0}ms")]
    Timeout(u64),

    #[error("AI transport error: {0}")]
    Transport(String),

    #[error("reqwest error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed AI response: {0}")]
    MalformedResponse(String),
}
