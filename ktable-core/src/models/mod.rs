//! Data model shared by the encoder and the LLM layer.
//!
//! - [`chunk`]: retrieval units handed back by the vector store.
//! - [`query`]: answer formats and the rules that constrain an answer.
//! - [`table`]: the table structure the extraction pipeline builds.

pub mod chunk;
pub mod query;
pub mod table;

pub use chunk::{Chunk, ChunkContent, ChunkMetadata};
pub use query::{AnswerFormat, Rule, RuleType};
pub use table::{Column, ColumnPrompt, Document, Row, Table};
