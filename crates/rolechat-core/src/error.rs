//! Errors raised at the generator boundary.

/// Errors produced by a text-generation call.
///
/// The chat session does not distinguish between variants: every failure is
/// rendered inline through its `Display` text.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request never produced a response.
    #[error("{0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("[{status}] {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The prompt or reply was blocked by the provider's safety filters.
    #[error("response was blocked due to {0}")]
    Blocked(String),

    /// The response contained no candidate text.
    #[error("response contained no candidates")]
    EmptyResponse,

    /// The background task driving the call ended before returning.
    #[error("generation task ended unexpectedly: {0}")]
    Interrupted(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}
