//! Output message types

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A Singer message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// Schema of a stream, written before its records
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema of the records
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
        /// Fields driving incremental replication
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        bookmark_properties: Vec<String>,
    },
    /// A single record
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: JsonObject,
        /// Extraction time
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_extracted: Option<String>,
    },
    /// Full state checkpoint
    State {
        /// State document
        value: JsonValue,
    },
}

impl Message {
    /// Create a state message
    pub fn state(value: JsonValue) -> Self {
        Self::State { value }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Kind of metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Monotonic count
    Counter,
}

/// A Singer-style metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Kind of metric
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Metric name
    pub metric: String,
    /// Measured value
    pub value: JsonValue,
    /// Tags such as the endpoint
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Metric {
    /// Number of records written for a stream
    pub fn record_count(stream: &str, count: usize) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("endpoint".to_string(), stream.to_string());

        Self {
            metric_type: MetricType::Counter,
            metric: "record_count".to_string(),
            value: JsonValue::from(count),
            tags,
        }
    }
}
