//! Tests for stream definitions

use super::*;
use crate::config::TapConfig;
use crate::engine::SyncContext;
use crate::error::{Error, Result};
use crate::output::{Message, MemorySink};
use crate::report::{DownloadedReport, ReportFile, ReportOutcome, ReportSource};
use crate::state::StateManager;
use crate::types::JsonObject;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helpers
// ============================================================================

/// Report source answering from a script and recording every request
#[derive(Clone)]
struct ScriptedSource {
    outcomes: Arc<Mutex<VecDeque<Result<ReportOutcome>>>>,
    requests: Arc<Mutex<Vec<(NaiveDate, NaiveDate)>>>,
}

impl ScriptedSource {
    fn new(outcomes: Vec<Result<ReportOutcome>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            requests: Arc::default(),
        }
    }

    fn csv(content: &str) -> Self {
        Self::new(vec![Ok(downloaded(content))])
    }

    fn requests(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportSource for ScriptedSource {
    async fn download_report(&self, start: NaiveDate, end: NaiveDate) -> Result<ReportOutcome> {
        self.requests.lock().unwrap().push((start, end));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted outcome left".to_string())))
    }
}

fn downloaded(content: &str) -> ReportOutcome {
    ReportOutcome::Downloaded(DownloadedReport {
        job_id: "job-1".to_string(),
        file: ReportFile {
            name: "report.csv".to_string(),
            content: content.to_string(),
        },
        polls: 0,
        waits: 0,
    })
}

fn config() -> TapConfig {
    TapConfig::from_json(
        &json!({
            "client_id": "client",
            "client_password": "secret",
            "shop_id": "12345",
            "site": "IDEALO_DE",
            "start_date": "2020-06-01T00:00:00Z"
        })
        .to_string(),
    )
    .unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 10, 15, 30, 0).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
}

fn context(source: &ScriptedSource, state: StateManager, sink: &MemorySink) -> SyncContext {
    SyncContext::new(config(), Box::new(source.clone()), state, Box::new(sink.clone())).with_now(now())
}

fn row(value: Value) -> JsonObject {
    let Value::Object(map) = value else {
        panic!("row must be an object");
    };
    map
}

fn watermark() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

// ============================================================================
// Surrogate Key Tests
// ============================================================================

#[test]
fn test_surrogate_key_is_sha1_of_concatenation() {
    // sha1("abc")
    assert_eq!(
        surrogate_key("ab", "c"),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(surrogate_key("a", "bc"), surrogate_key("ab", "c"));
}

#[test]
fn test_surrogate_key_deterministic() {
    let a = surrogate_key("2021-01-02T10:00:00", "1.2.3.4");
    let b = surrogate_key("2021-01-02T10:00:00", "1.2.3.4");

    assert_eq!(a, b);
    assert_eq!(a.len(), 40);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(a, surrogate_key("2021-01-02T10:00:00", "1.2.3.5"));
}

// ============================================================================
// Row Processing Tests
// ============================================================================

#[test]
fn test_process_rows_drops_boundary_and_older() {
    let rows = vec![
        row(json!({"Date": "2020-12-31T23:59:59", "Customer-IP": "1.1.1.1"})),
        row(json!({"Date": "2021-01-01T00:00:00", "Customer-IP": "1.1.1.1"})),
        row(json!({"Date": "2021-01-02T10:00:00", "Customer-IP": "2.2.2.2"})),
    ];

    let processed = process_rows(rows, watermark());

    assert_eq!(processed.records.len(), 1);
    assert_eq!(processed.already_seen, 2);
    assert_eq!(processed.records[0]["Date"], "2021-01-02T10:00:00");
    assert_eq!(
        processed.records[0]["SK"],
        surrogate_key("2021-01-02T10:00:00", "2.2.2.2")
    );
    assert_eq!(
        processed.watermark,
        Utc.with_ymd_and_hms(2021, 1, 2, 10, 0, 0).unwrap()
    );
}

#[test]
fn test_process_rows_drops_malformed_dates() {
    let rows = vec![
        row(json!({"Date": null, "Customer-IP": "1.1.1.1"})),
        row(json!({"Customer-IP": "1.1.1.1"})),
        row(json!({"Date": "02.01.2021 10:00", "Customer-IP": "1.1.1.1"})),
        row(json!({"Date": "2021-01-02", "Customer-IP": "1.1.1.1"})),
        row(json!({"Date": "2021-13-45T10:00:00", "Customer-IP": "1.1.1.1"})),
        row(json!({"Date": "2099-01-01T00:00:00", "Customer-IP": "9.9.9.9"})),
    ];

    let processed = process_rows(rows, watermark());

    assert_eq!(processed.malformed, 5);
    assert_eq!(processed.records.len(), 1);
    assert_eq!(
        processed.watermark,
        Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_process_rows_watermark_is_max_not_last() {
    let rows = vec![
        row(json!({"Date": "2021-01-05T00:00:00", "Customer-IP": "a"})),
        row(json!({"Date": "2021-01-03T00:00:00", "Customer-IP": "b"})),
    ];

    let processed = process_rows(rows, watermark());

    assert_eq!(processed.records.len(), 2);
    assert_eq!(processed.records[0]["Customer-IP"], "a");
    assert_eq!(
        processed.watermark,
        Utc.with_ymd_and_hms(2021, 1, 5, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_process_rows_missing_ip_hashes_date_only() {
    let rows = vec![row(json!({"Date": "2021-01-02T10:00:00", "Customer-IP": null}))];

    let processed = process_rows(rows, watermark());

    assert_eq!(processed.records[0]["SK"], surrogate_key("2021-01-02T10:00:00", ""));
    assert_eq!(processed.records[0]["Customer-IP"], Value::Null);
}

#[test]
fn test_process_rows_empty_keeps_watermark() {
    let processed = process_rows(Vec::new(), watermark());

    assert!(processed.records.is_empty());
    assert_eq!(processed.watermark, watermark());
}

#[test]
fn test_process_rows_sub_microsecond_date_not_reemitted_after_resume() {
    let rows = || vec![row(json!({"Date": "2021-01-02T10:00:00.1234567", "Customer-IP": "1.1.1.1"}))];

    let first = process_rows(rows(), watermark());
    assert_eq!(first.records.len(), 1);
    assert_eq!(first.records[0]["Date"], "2021-01-02T10:00:00.1234567");

    let stored = crate::types::format_datetime(&first.watermark);
    assert_eq!(stored, "2021-01-02T10:00:00.123456Z");

    let resumed = crate::types::parse_datetime(&stored).unwrap();
    let second = process_rows(rows(), resumed);
    assert!(second.records.is_empty());
    assert_eq!(second.already_seen, 1);
    assert_eq!(second.watermark, resumed);
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_registry() {
    let ids: Vec<_> = all_streams().iter().map(|s| s.tap_stream_id()).collect();
    assert_eq!(ids, vec!["click_report"]);

    assert!(get_stream("click_report").is_ok());
    assert!(matches!(
        get_stream("orders"),
        Err(Error::StreamNotFound { ref stream }) if stream == "orders"
    ));
}

#[test]
fn test_click_report_metadata() {
    let stream = ClickReports;
    let entry = stream.catalog_entry();

    assert_eq!(stream.key_properties(), &["SK"]);
    assert_eq!(stream.replication_key(), "Date");
    assert_eq!(entry["tap_stream_id"], "click_report");
    assert_eq!(entry["replication_method"], "INCREMENTAL");
    assert_eq!(entry["key_properties"], json!(["SK"]));
    assert_eq!(entry["schema"]["properties"]["SK"]["type"], "string");
}

#[test]
fn test_replication_method_serialization() {
    assert_eq!(
        serde_json::to_value(ReplicationMethod::Incremental).unwrap(),
        json!("INCREMENTAL")
    );
}

// ============================================================================
// Sync Tests
// ============================================================================

#[tokio::test]
async fn test_sync_end_to_end_watermark() {
    let source = ScriptedSource::csv(
        "Date,Customer-IP,Offer\n\
         2021-01-01T00:00:00,1.1.1.1,old\n\
         2021-01-02T10:00:00,2.2.2.2,new\n",
    );
    let state = StateManager::from_json(
        r#"{"bookmarks": {"click_report": {"12345": "2021-01-01T00:00:00"}}}"#,
    )
    .unwrap();
    let sink = MemorySink::new();
    let mut ctx = context(&source, state.clone(), &sink);

    let count = ClickReports.sync(&mut ctx).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(source.requests(), vec![(day(1), day(9))]);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Offer"], "new");
    assert_eq!(records[0]["SK"], surrogate_key("2021-01-02T10:00:00", "2.2.2.2"));

    assert_eq!(
        state.get_bookmark("click_report", "12345").await,
        Some("2021-01-02T10:00:00.000000Z".to_string())
    );
    assert_eq!(
        sink.last_state(),
        Some(json!({"bookmarks": {"click_report": {"12345": "2021-01-02T10:00:00.000000Z"}}}))
    );
    assert_eq!(sink.metrics()[0].value, json!(1));
}

#[tokio::test]
async fn test_sync_state_written_after_records() {
    let source = ScriptedSource::csv("Date,Customer-IP\n2021-01-02T10:00:00,a\n2021-01-03T10:00:00,b\n");
    let sink = MemorySink::new();
    let mut ctx = context(&source, StateManager::in_memory(), &sink);

    ClickReports.sync(&mut ctx).await.unwrap();

    let kinds: Vec<_> = sink
        .messages()
        .iter()
        .map(|m| match m {
            Message::Record { .. } => "record",
            Message::State { .. } => "state",
            Message::Schema { .. } => "schema",
        })
        .collect();
    assert_eq!(kinds, vec!["record", "record", "state"]);

    let Message::Record { time_extracted, .. } = &sink.messages()[0] else {
        unreachable!()
    };
    assert_eq!(time_extracted.as_deref(), Some("2021-01-10T15:30:00.000000Z"));
}

#[tokio::test]
async fn test_sync_uses_start_date_without_bookmark() {
    let source = ScriptedSource::csv("Date,Customer-IP\n");
    let sink = MemorySink::new();
    let state = StateManager::in_memory();
    let mut ctx = context(&source, state.clone(), &sink);

    let count = ClickReports.sync(&mut ctx).await.unwrap();

    assert_eq!(count, 0);
    assert_eq!(
        source.requests(),
        vec![(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(), day(9))]
    );
    // Header-only report still writes the (unchanged) watermark back
    assert_eq!(
        state.get_bookmark("click_report", "12345").await,
        Some("2020-06-01T00:00:00.000000Z".to_string())
    );
    assert_eq!(sink.messages().len(), 1);
    assert!(sink.messages()[0].is_state());
}

#[tokio::test]
async fn test_sync_retries_earlier_end_dates() {
    let source = ScriptedSource::new(vec![
        Ok(ReportOutcome::DateRejected),
        Ok(ReportOutcome::DateRejected),
        Ok(downloaded("Date,Customer-IP\n2021-01-02T10:00:00,a\n")),
    ]);
    let sink = MemorySink::new();
    let mut ctx = context(&source, StateManager::in_memory(), &sink);

    let count = ClickReports.sync(&mut ctx).await.unwrap();

    assert_eq!(count, 1);
    let start = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    assert_eq!(
        source.requests(),
        vec![(start, day(9)), (start, day(8)), (start, day(7))]
    );
}

#[tokio::test]
async fn test_sync_fails_when_every_end_date_rejected() {
    let source = ScriptedSource::new((0..4).map(|_| Ok(ReportOutcome::DateRejected)).collect());
    let sink = MemorySink::new();
    let state = StateManager::in_memory();
    let mut ctx = context(&source, state.clone(), &sink);

    let err = ClickReports.sync(&mut ctx).await.unwrap_err();

    assert!(matches!(err, Error::DateRangeRejected { attempts: 4 }));
    assert_eq!(source.requests().len(), 4);
    assert_eq!(source.requests()[3].1, day(6));
    assert!(sink.messages().is_empty());
    assert!(state.get_bookmark("click_report", "12345").await.is_none());
}

#[tokio::test]
async fn test_sync_fatal_source_error_keeps_watermark() {
    let source = ScriptedSource::new(vec![Err(Error::JobFailed {
        job_id: "job-9".to_string(),
    })]);
    let sink = MemorySink::new();
    let state = StateManager::from_json(
        r#"{"bookmarks": {"click_report": {"12345": "2021-01-01T00:00:00.000000Z"}}}"#,
    )
    .unwrap();
    let mut ctx = context(&source, state.clone(), &sink);

    let err = ClickReports.sync(&mut ctx).await.unwrap_err();

    assert!(matches!(err, Error::JobFailed { .. }));
    assert_eq!(source.requests().len(), 1);
    assert_eq!(
        state.get_bookmark("click_report", "12345").await,
        Some("2021-01-01T00:00:00.000000Z".to_string())
    );
    assert!(sink.last_state().is_none());
}

#[tokio::test]
async fn test_sync_invalid_bookmark() {
    let source = ScriptedSource::csv("Date\n");
    let sink = MemorySink::new();
    let state =
        StateManager::from_json(r#"{"bookmarks": {"click_report": {"12345": "not a date"}}}"#)
            .unwrap();
    let mut ctx = context(&source, state, &sink);

    let err = ClickReports.sync(&mut ctx).await.unwrap_err();

    assert!(matches!(err, Error::State { .. }));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_sync_second_run_is_idempotent() {
    let csv = "Date,Customer-IP\n2021-01-02T10:00:00,a\n2021-01-03T10:00:00,b\n";
    let state = StateManager::in_memory();

    let first_sink = MemorySink::new();
    let source = ScriptedSource::csv(csv);
    ClickReports
        .sync(&mut context(&source, state.clone(), &first_sink))
        .await
        .unwrap();

    let second_sink = MemorySink::new();
    let source = ScriptedSource::csv(csv);
    let count = ClickReports
        .sync(&mut context(&source, state.clone(), &second_sink))
        .await
        .unwrap();

    assert_eq!(first_sink.records().len(), 2);
    assert_eq!(count, 0);
    assert_eq!(source.requests()[0].0, day(3));
    assert_eq!(first_sink.last_state(), second_sink.last_state());
}
