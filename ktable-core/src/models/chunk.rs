//! Retrieved text chunks.
//!
//! A chunk is the unit the retrieval layer returns: a slice of source text
//! (or a structured record), its embedding and provenance metadata.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chunk body: plain text or a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkContent {
    /// Plain text.
    Text(String),
    /// Structured record (e.g. a row from a CSV or JSON source).
    Object(Map<String, Value>),
}

impl Default for ChunkContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for ChunkContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ChunkContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Provenance of a chunk within its source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Language of the content (e.g. "en").
    pub language: Option<String>,
    /// Length of the content in characters.
    pub length: Option<u64>,
    /// Size of the content in bytes.
    pub size: Option<u64>,
    /// Kind of source the chunk came from (e.g. "pdf", "csv").
    pub data_source_type: Option<String>,
    /// Position of the chunk within the document.
    pub index: Option<u64>,
    /// Page the chunk starts on.
    pub page: Option<u32>,
    /// Start offset within the document.
    pub start: Option<u64>,
    /// End offset within the document.
    pub end: Option<u64>,
}

/// A retrieved unit of source text plus metadata and embedding vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier.
    pub chunk_id: String,
    /// Creation time, if known.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time, if known.
    pub updated_at: Option<DateTime<Utc>>,
    /// Source document identifier.
    pub document_id: Option<String>,
    /// Workspaces the chunk belongs to.
    #[serde(default)]
    pub workspace_ids: Vec<String>,
    /// Provenance metadata.
    pub metadata: Option<ChunkMetadata>,
    /// The chunk body.
    #[serde(default)]
    pub content: ChunkContent,
    /// Embedding vector.
    pub embedding: Option<Vec<f32>>,
    /// Tags keyed by workspace.
    #[serde(default)]
    pub tags: HashMap<String, Vec<String>>,
    /// Free-form metadata keyed by workspace.
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl Chunk {
    /// Create a text chunk with no metadata, timestamps or embedding.
    #[must_use]
    pub fn text(chunk_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            content: ChunkContent::Text(content.into()),
            ..Self::default()
        }
    }

    /// Attach provenance metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach an embedding vector.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}
