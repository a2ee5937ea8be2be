//! Caller-supplied correlation data carried onto every chunk of a batch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifiers and metadata describing the document being chunked.
///
/// The engine never validates or dereferences any of these values; they are
/// copied onto each chunk so downstream stages can correlate results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Anything else the caller wants to see on each chunk
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl DocumentContext {
    /// Context carrying only a file and project id.
    pub fn new(file_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            file_id: Some(file_id.into()),
            project_id: Some(project_id.into()),
            extra: Map::new(),
        }
    }

    /// Build a context from a flat metadata object.
    ///
    /// `file_id` and `project_id` are lifted out (when they are strings);
    /// every other key lands in `extra` unchanged.
    pub fn from_metadata(metadata: Map<String, Value>) -> Self {
        let mut context = Self::default();
        for (key, value) in metadata {
            match value {
                Value::String(id) if key == "file_id" => context.file_id = Some(id),
                Value::String(id) if key == "project_id" => context.project_id = Some(id),
                value => {
                    context.extra.insert(key, value);
                }
            }
        }
        context
    }

    /// Add one extra key.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// `extra` as an optional JSON object, `None` when empty.
    pub fn extra_value(&self) -> Option<Value> {
        if self.extra.is_empty() {
            None
        } else {
            Some(Value::Object(self.extra.clone()))
        }
    }
}
