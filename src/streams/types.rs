//! Stream trait

use crate::engine::SyncContext;
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// How a stream is replicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Only rows past the bookmark are extracted
    Incremental,
}

/// A syncable stream
#[async_trait]
pub trait Stream: Send + Sync {
    /// Stream id used in messages and bookmarks
    fn tap_stream_id(&self) -> &'static str;

    /// Primary key fields
    fn key_properties(&self) -> &'static [&'static str];

    /// Field the bookmark tracks
    fn replication_key(&self) -> &'static str;

    /// Replication method
    fn replication_method(&self) -> ReplicationMethod;

    /// JSON schema of the records
    fn schema(&self) -> JsonValue;

    /// Extract, emit and checkpoint; returns the number of records written
    async fn sync(&self, ctx: &mut SyncContext) -> Result<usize>;

    /// Catalog entry for discovery
    fn catalog_entry(&self) -> JsonValue {
        let id = self.tap_stream_id();
        json!({
            "tap_stream_id": id,
            "stream": id,
            "key_properties": self.key_properties(),
            "replication_method": self.replication_method(),
            "replication_key": self.replication_key(),
            "schema": self.schema(),
            "metadata": [{
                "breadcrumb": [],
                "metadata": {
                    "table-key-properties": self.key_properties(),
                    "forced-replication-method": self.replication_method(),
                    "valid-replication-keys": [self.replication_key()],
                    "inclusion": "available",
                    "selected": true,
                }
            }]
        })
    }
}
