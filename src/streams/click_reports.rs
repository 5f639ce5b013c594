//! Click report stream
//!
//! Requests the report from the shop's watermark date up to a day in the
//! past, keeps only rows newer than the watermark, and advances the
//! watermark once every kept row has been written.

use super::types::{ReplicationMethod, Stream};
use crate::decode::{CsvDecoder, RecordDecoder};
use crate::engine::SyncContext;
use crate::error::{Error, Result};
use crate::output::Metric;
use crate::report::{ReportFile, ReportOutcome, ReportSource};
use crate::types::{format_datetime, parse_datetime, JsonObject, JsonValue};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, SubsecRound, Utc};
use regex::Regex;
use serde_json::json;
use sha1::{Digest, Sha1};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

const STREAM_ID: &str = "click_report";
const DATE_FIELD: &str = "Date";
const IP_FIELD: &str = "Customer-IP";
const KEY_FIELD: &str = "SK";

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("valid date pattern")
});

/// Hex SHA-1 of `Date ++ Customer-IP`
pub fn surrogate_key(date: &str, customer_ip: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(date.as_bytes());
    hasher.update(customer_ip.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Rows that survived filtering plus the resulting watermark
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRows {
    /// Rows to emit, in file order, each carrying its `SK`
    pub records: Vec<JsonObject>,
    /// Latest `Date` among `records`, or the input watermark when empty
    pub watermark: DateTime<Utc>,
    /// Rows dropped for a missing or malformed `Date`
    pub malformed: usize,
    /// Rows dropped for being at or before the input watermark
    pub already_seen: usize,
}

/// Filter decoded rows against `watermark` and assign surrogate keys
pub fn process_rows(rows: Vec<JsonObject>, watermark: DateTime<Utc>) -> ProcessedRows {
    let mut processed = ProcessedRows {
        records: Vec::with_capacity(rows.len()),
        watermark,
        malformed: 0,
        already_seen: 0,
    };

    for mut row in rows {
        let Some(date) = row.get(DATE_FIELD).and_then(JsonValue::as_str) else {
            processed.malformed += 1;
            continue;
        };
        // Compared at bookmark precision (microseconds)
        let Some(timestamp) = DATE_PATTERN
            .is_match(date)
            .then(|| parse_datetime(date))
            .flatten()
            .map(|ts| ts.trunc_subsecs(6))
        else {
            processed.malformed += 1;
            continue;
        };

        if timestamp <= watermark {
            processed.already_seen += 1;
            continue;
        }

        let ip = row.get(IP_FIELD).and_then(JsonValue::as_str).unwrap_or("");
        let key = surrogate_key(date, ip);
        row.insert(KEY_FIELD.to_string(), JsonValue::String(key));

        processed.watermark = processed.watermark.max(timestamp);
        processed.records.push(row);
    }

    processed
}

/// The `click_report` stream
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickReports;

impl ClickReports {
    /// Download the report from `start`, moving the end date back a day
    /// each time the API says it is not in the past
    async fn fetch(
        &self,
        source: &dyn ReportSource,
        start: NaiveDate,
        today: NaiveDate,
        attempts: u32,
    ) -> Result<ReportFile> {
        for days_back in 1..=attempts {
            let end = today
                .checked_sub_days(Days::new(u64::from(days_back)))
                .ok_or_else(|| Error::Other(format!("{today} minus {days_back} days is out of range")))?;

            info!("requesting click report {start} .. {end}");
            match source.download_report(start, end).await? {
                ReportOutcome::Downloaded(report) => {
                    debug!(
                        "report {} ready after {} polls",
                        report.job_id, report.polls
                    );
                    return Ok(report.file);
                }
                ReportOutcome::DateRejected => {
                    warn!("end date {end} rejected, trying an earlier one");
                }
            }
        }

        Err(Error::DateRangeRejected { attempts })
    }
}

#[async_trait]
impl Stream for ClickReports {
    fn tap_stream_id(&self) -> &'static str {
        STREAM_ID
    }

    fn key_properties(&self) -> &'static [&'static str] {
        &[KEY_FIELD]
    }

    fn replication_key(&self) -> &'static str {
        DATE_FIELD
    }

    fn replication_method(&self) -> ReplicationMethod {
        ReplicationMethod::Incremental
    }

    fn schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "SK": {"type": "string"},
                "Date": {"type": ["null", "string"], "format": "date-time"},
                "Customer-IP": {"type": ["null", "string"]},
            },
            "additionalProperties": {"type": ["null", "string"]},
        })
    }

    async fn sync(&self, ctx: &mut SyncContext) -> Result<usize> {
        let shop_id = ctx.config.shop_id.clone();

        let last_timestamp = match ctx.state.get_bookmark(STREAM_ID, &shop_id).await {
            Some(bookmark) => parse_datetime(&bookmark).ok_or_else(|| {
                Error::state(format!("Invalid bookmark for shop {shop_id}: '{bookmark}'"))
            })?,
            None => ctx.config.start_datetime()?,
        };
        info!("syncing {STREAM_ID} for shop {shop_id} after {last_timestamp}");

        let file = self
            .fetch(
                ctx.source.as_ref(),
                last_timestamp.date_naive(),
                ctx.now.date_naive(),
                ctx.config.date_retry_attempts,
            )
            .await?;
        let rows = CsvDecoder::new().decode(&file.content)?;
        let total = rows.len();
        let processed = process_rows(rows, last_timestamp);
        debug!(
            "{total} rows in {}: {} malformed, {} already synced",
            file.name, processed.malformed, processed.already_seen
        );

        let count = processed.records.len();
        let time_extracted = format_datetime(&ctx.now);
        for record in processed.records {
            ctx.sink.write_record(STREAM_ID, record, &time_extracted)?;
        }
        ctx.sink.write_metric(&Metric::record_count(STREAM_ID, count))?;

        ctx.state
            .set_bookmark(STREAM_ID, &shop_id, format_datetime(&processed.watermark))
            .await;
        ctx.write_state().await?;

        info!("{STREAM_ID}: wrote {count} records, watermark {}", processed.watermark);
        Ok(count)
    }
}
