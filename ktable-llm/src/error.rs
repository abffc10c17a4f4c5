//! LLM error types.

use thiserror::Error;

/// Errors that can occur while building or running a structured query.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// The API rejected the credential.
    #[error("LLM API rejected the credential")]
    Authentication,

    /// The API asked us to slow down.
    #[error("LLM API rate limit reached")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("LLM API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// The completion carried no content.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The model declined to answer.
    #[error("LLM refused to answer: {0}")]
    Refused(String),

    /// LLM response was not valid JSON.
    #[error("Failed to parse LLM response as JSON: {0}")]
    ParseError(String),

    /// LLM response did not match expected schema.
    #[error("LLM output schema validation failed: {0}")]
    SchemaValidation(String),

    /// A prompt template could not be rendered.
    #[error("Prompt rendering failed: {0}")]
    Template(String),

    /// LLM provider is unavailable.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}
