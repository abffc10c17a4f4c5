//! Explicit field-by-field encoding of retrieval chunks.

use ktable_core::{Chunk, ChunkContent, ChunkMetadata};
use serde_json::{Map, Value};

use crate::encode::Encode;

impl Encode for ChunkMetadata {
    fn encode(&self) -> Value {
        let mut map = Map::new();
        map.insert("language".into(), Value::from(self.language.clone()));
        map.insert("length".into(), Value::from(self.length));
        map.insert("size".into(), Value::from(self.size));
        map.insert("data_source_type".into(), Value::from(self.data_source_type.clone()));
        map.insert("index".into(), Value::from(self.index));
        map.insert("page".into(), Value::from(self.page));
        map.insert("start".into(), Value::from(self.start));
        map.insert("end".into(), Value::from(self.end));
        Value::Object(map)
    }
}

// Structured content is passed through as-is.
impl Encode for ChunkContent {
    fn encode(&self) -> Value {
        match self {
            ChunkContent::Text(text) => Value::String(text.clone()),
            ChunkContent::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl Encode for Chunk {
    fn encode(&self) -> Value {
        let tags = self
            .tags
            .iter()
            .map(|(workspace, tags)| (workspace.clone(), Value::from(tags.clone())))
            .collect();

        let mut map = Map::new();
        map.insert("chunk_id".into(), Value::String(self.chunk_id.clone()));
        map.insert("created_at".into(), self.created_at.encode());
        map.insert("updated_at".into(), self.updated_at.encode());
        map.insert("document_id".into(), Value::from(self.document_id.clone()));
        map.insert("workspace_ids".into(), Value::from(self.workspace_ids.clone()));
        map.insert("metadata".into(), self.metadata.encode());
        map.insert("content".into(), self.content.encode());
        map.insert("embedding".into(), self.embedding.encode());
        map.insert("tags".into(), Value::Object(tags));
        map.insert("user_metadata".into(), Value::Object(self.user_metadata.clone()));
        Value::Object(map)
    }
}
