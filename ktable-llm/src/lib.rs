//! # ktable-llm: structured LLM queries for knowledge tables
//!
//! Builds prompts from fixed templates, asks a remote structured-output
//! completion API for a specific response shape and maps the result onto the
//! mappings the table pipeline expects.
//!
//! Every query operation on [`QueryService`] is infallible from the caller's
//! point of view: any error while rendering the prompt, calling the API or
//! validating the output is logged and replaced by a fixed fallback.
//!
//! ```text
//! rules ──► rule lines ──► format instructions ──► base prompt
//!                                                      │
//!                        CompletionClient ◄────────────┘
//!                              │ JSON text
//!                              ▼
//!                  ResponseModel (validated) ──► canonical result / fallback
//! ```
//!
//! The client is injected: production code passes an [`OpenAiClient`], tests
//! pass a fake.

pub mod client;
pub mod error;
pub mod prompt;
pub mod response;
pub mod service;
pub mod types;

pub use client::{CompletionClient, NoopClient, OpenAiClient, parse_structured};
pub use error::LlmError;
pub use response::{Answer, AnswerResult, KeywordsResult, SchemaResult, SubQueriesResult};
pub use service::QueryService;
pub use types::{CompletionRequest, Message, ResponseFormat, Role};
