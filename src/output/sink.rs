//! Message sinks

use super::types::{Message, Metric};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Destination for the messages of a sync
pub trait RecordSink: Send {
    /// Write one message
    fn write_message(&mut self, message: &Message) -> Result<()>;

    /// Report a metric
    fn write_metric(&mut self, metric: &Metric) -> Result<()>;

    /// Write the schema of a stream
    fn write_schema(
        &mut self,
        stream: &str,
        schema: JsonValue,
        key_properties: &[&str],
        bookmark_properties: &[&str],
    ) -> Result<()> {
        self.write_message(&Message::Schema {
            stream: stream.to_string(),
            schema,
            key_properties: key_properties.iter().map(ToString::to_string).collect(),
            bookmark_properties: bookmark_properties.iter().map(ToString::to_string).collect(),
        })
    }

    /// Write a record extracted at `time_extracted`
    fn write_record(&mut self, stream: &str, record: JsonObject, time_extracted: &str) -> Result<()> {
        self.write_message(&Message::Record {
            stream: stream.to_string(),
            record,
            time_extracted: Some(time_extracted.to_string()),
        })
    }

    /// Write a state checkpoint
    fn write_state(&mut self, value: JsonValue) -> Result<()> {
        self.write_message(&Message::state(value))
    }
}

/// Writes each message as one line of JSON
///
/// Metrics are not part of the message stream; they are logged as
/// `METRIC: {...}` lines. The writer is flushed after every state message
/// so a checkpoint is never visible before the records it covers.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write_message(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)
            .map_err(|e| Error::output(format!("Failed to write message: {e}")))?;
        self.writer.write_all(b"\n")?;

        if message.is_state() {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn write_metric(&mut self, metric: &Metric) -> Result<()> {
        let line = serde_json::to_string(metric)
            .map_err(|e| Error::output(format!("Failed to serialize metric: {e}")))?;
        info!("METRIC: {line}");
        Ok(())
    }
}

impl<W: Write + Send> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

/// Collects messages and metrics in memory
///
/// Clones share the same buffers, so a clone kept by the caller sees what
/// the sync wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<Message>>>,
    metrics: Arc<Mutex<Vec<Metric>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages written so far
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All metrics written so far
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records written so far
    pub fn records(&self) -> Vec<JsonObject> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Record { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Value of the last state message
    pub fn last_state(&self) -> Option<JsonValue> {
        self.messages().into_iter().rev().find_map(|m| match m {
            Message::State { value } => Some(value),
            _ => None,
        })
    }
}

impl RecordSink for MemorySink {
    fn write_message(&mut self, message: &Message) -> Result<()> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }

    fn write_metric(&mut self, metric: &Metric) -> Result<()> {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(metric.clone());
        Ok(())
    }
}
