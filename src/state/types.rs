//! State types for tracking sync progress
//!
//! Serialized as `{"bookmarks": {"<stream>": {"<key>": "<value>"}}}`. Any
//! other top-level keys found in an incoming state are kept as-is.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state for the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, JsonObject>,

    /// Top-level keys this tap does not manage
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a bookmark value, ignoring non-string entries
    pub fn get_bookmark(&self, stream: &str, key: &str) -> Option<&str> {
        self.bookmarks.get(stream)?.get(key)?.as_str()
    }

    /// Set a bookmark value, creating the stream entry if needed
    pub fn set_bookmark(&mut self, stream: &str, key: &str, value: impl Into<String>) {
        self.bookmarks
            .entry(stream.to_string())
            .or_default()
            .insert(key.to_string(), JsonValue::String(value.into()));
    }
}
