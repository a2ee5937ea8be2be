//! Vector-store hand-off.
//!
//! Shapes a sealed batch into parallel id/text/metadata columns, the layout
//! most vector stores accept for bulk inserts. No I/O happens here.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::types::Chunk;

/// Column-oriented batch ready for embedding and storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPayload {
    pub ids: Vec<String>,
    pub texts: Vec<String>,
    pub metadatas: Vec<Value>,
}

impl EmbeddingPayload {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Flatten `chunks` into an [`EmbeddingPayload`].
///
/// Each metadata object carries the chunk's id, index, span, batch size,
/// strategy, correlation ids, character length and a shared `created_at`
/// timestamp. Keys from the chunk's `extra` object are merged in last and
/// win on conflict.
pub fn prepare_for_embedding(chunks: &[Chunk]) -> EmbeddingPayload {
    let created_at = Utc::now().to_rfc3339();
    let mut payload = EmbeddingPayload::default();

    for chunk in chunks {
        let meta = &chunk.metadata;
        let mut metadata = Map::new();
        metadata.insert("chunk_id".into(), json!(chunk.id()));
        metadata.insert("chunk_index".into(), json!(meta.chunk_index));
        metadata.insert("start_pos".into(), json!(meta.start_position));
        metadata.insert("end_pos".into(), json!(meta.end_position));
        metadata.insert("total_chunks".into(), json!(meta.total_chunks));
        metadata.insert("strategy".into(), json!(meta.strategy.as_str()));
        metadata.insert("chunk_size".into(), json!(chunk.len()));
        metadata.insert("token_count".into(), json!(meta.token_count));
        metadata.insert("created_at".into(), json!(created_at));
        if let Some(file_id) = &meta.file_id {
            metadata.insert("file_id".into(), json!(file_id));
        }
        if let Some(project_id) = &meta.project_id {
            metadata.insert("project_id".into(), json!(project_id));
        }
        if let Some(Value::Object(extra)) = &meta.extra {
            for (key, value) in extra {
                metadata.insert(key.clone(), value.clone());
            }
        }

        payload.ids.push(chunk.id().to_string());
        payload.texts.push(chunk.text.clone());
        payload.metadatas.push(Value::Object(metadata));
    }

    payload
}
