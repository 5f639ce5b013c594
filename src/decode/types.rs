//! Decoder traits

use crate::error::Result;
use crate::types::JsonObject;

/// Trait for decoding a report body into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<JsonObject>>;
}
