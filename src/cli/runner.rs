//! CLI runner - executes the selected mode

use crate::cli::commands::Cli;
use crate::config::TapConfig;
use crate::engine::{SyncContext, SyncEngine, SyncStats};
use crate::error::{Error, Result, ResultExt};
use crate::output::{JsonLinesSink, RecordSink};
use crate::report::ReportClient;
use crate::state::StateManager;
use crate::streams;
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run discovery or a sync to stdout
    pub async fn run(&self) -> Result<()> {
        if self.cli.discover {
            return self.discover();
        }

        let stats = self.sync(Box::new(JsonLinesSink::stdout())).await?;
        info!(
            "sync finished: {} records from {} streams in {}ms",
            stats.records_synced, stats.streams_synced, stats.duration_ms
        );
        Ok(())
    }

    /// Load and validate the config
    pub fn load_config(&self) -> Result<TapConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }

        match &self.cli.config {
            Some(path) => TapConfig::from_file(path),
            None => Err(Error::config("Config not specified (use --config)")),
        }
    }

    /// Load state
    pub fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Catalog of every registered stream
    pub fn catalog() -> Value {
        let streams: Vec<Value> = streams::all_streams()
            .iter()
            .map(|s| s.catalog_entry())
            .collect();
        json!({ "streams": streams })
    }

    /// Print the catalog
    fn discover(&self) -> Result<()> {
        self.load_config()?;
        self.output_message(&Self::catalog())
    }

    /// Authorize, then sync every stream into `sink`
    pub async fn sync(&self, sink: Box<dyn RecordSink>) -> Result<SyncStats> {
        let config = self.load_config()?;
        let state = self.load_state()?;

        let client = ReportClient::connect(
            config.credentials(),
            config.http_config(),
            config.poll_config(),
        )
        .await?;
        info!("authorized for shop {}", config.shop_id);

        let mut ctx = SyncContext::new(config, Box::new(client), state, sink);
        SyncEngine::with_registry().run(&mut ctx).await
    }

    /// Output a JSON message on stdout
    fn output_message(&self, msg: &Value) -> Result<()> {
        let line = serde_json::to_string(msg).context("Failed to serialize catalog")?;
        println!("{line}");
        Ok(())
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").field("cli", &self.cli).finish()
    }
}
