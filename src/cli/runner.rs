//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use crate::extract::{EndpointRequest, ExtractStats, Extractor, PageStream};
use crate::output::JsonlWriter;
use crate::types::{format_timestamp, LogLevel, Record};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{error, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Runner {
    /// Create a runner writing messages to stdout
    pub fn new(cli: Cli) -> Self {
        Self::with_output(cli, Box::new(std::io::stdout()))
    }

    /// Create a runner writing messages to the given sink
    pub fn with_output(cli: Cli, out: Box<dyn Write + Send>) -> Self {
        Self {
            cli,
            out: Mutex::new(out),
        }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Check => self.check().await,
            Commands::Read {
                endpoints,
                output,
                fail_fast,
            } => {
                self.read(endpoints.as_deref(), output.as_deref(), *fail_fast)
                    .await
            }
        }
    }

    /// Log level requested by `--verbose` or the configuration's `debug` flag
    pub fn log_level(&self) -> tracing::Level {
        let debug = self.cli.verbose || self.load_config().is_ok_and(|c| c.debug);
        if debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Load configuration
    pub fn load_config(&self) -> Result<ExtractorConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return ExtractorConfig::from_json_str(json_str);
        }

        if let Some(path) = &self.cli.config {
            return ExtractorConfig::from_file(path);
        }

        Err(Error::config(
            "Configuration not specified (use -C or --config-json)",
        ))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let (since, until) = config.resolve_window(Utc::now())?;

        for endpoint in &config.endpoints {
            let columns = endpoint.columns()?;
            self.log(
                LogLevel::Info,
                format!(
                    "Endpoint '{}': columns {:?}, primary key {:?}, incremental {}",
                    endpoint.name, columns, endpoint.pkey, endpoint.incremental
                ),
            )?;
        }

        self.log(
            LogLevel::Info,
            format!(
                "Configuration is valid with {} endpoints, period {} - {}",
                config.endpoints.len(),
                describe_bound(since),
                describe_bound(until)
            ),
        )?;

        Ok(())
    }

    /// Fetch the first page of every endpoint
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let extractor = config.extractor()?;

        self.log(
            LogLevel::Info,
            format!("Checking connection to {}", config.api_url),
        )?;

        let mut failed = Vec::new();
        for endpoint in &config.endpoints {
            match extractor.check(&endpoint.name).await {
                Ok(page) => self.log(
                    LogLevel::Info,
                    format!(
                        "Endpoint {}: {} records on the first page, {} remaining",
                        endpoint.name,
                        page.results.len(),
                        page.remaining
                    ),
                )?,
                Err(e) => {
                    self.log(
                        LogLevel::Error,
                        format!("Endpoint {} check failed: {e}", endpoint.name),
                    )?;
                    failed.push(endpoint.name.clone());
                }
            }
        }

        let (status, message) = if failed.is_empty() {
            ("SUCCEEDED", "Connection successful".to_string())
        } else {
            ("FAILED", format!("Check failed for endpoints: {}", failed.join(", ")))
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": message
            }
        }))
    }

    /// Read data
    async fn read(
        &self,
        endpoints: Option<&str>,
        output: Option<&Path>,
        fail_fast: bool,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;

        let names: Vec<String> = endpoints
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let selected = config.select_endpoints(&names)?;
        let extractor = config.extractor()?;
        let now = Utc::now();

        let mut endpoint_results: Vec<Value> = Vec::new();
        let mut total_records = 0usize;
        let mut aborted = false;

        for endpoint in selected {
            if aborted {
                endpoint_results.push(json!({
                    "endpoint": endpoint.name,
                    "status": "SKIPPED"
                }));
                continue;
            }

            let endpoint_start = Instant::now();
            let request = config.request_for(endpoint, now)?;
            let (since, until) = (request.since, request.until);

            info!("Getting results from {} endpoint", endpoint.name);
            self.log(
                LogLevel::Info,
                format!("Starting extraction for endpoint: {}", endpoint.name),
            )?;

            let (stats, outcome) = self.read_endpoint(&extractor, request, output).await;
            let duration_ms = endpoint_start.elapsed().as_millis() as u64;
            total_records += stats.records_extracted;

            match outcome {
                // The message stream itself failed, nothing further can be reported
                Err(Error::Io(e)) => return Err(Error::Io(e)),
                Ok(()) => {
                    if stats.records_extracted == 0 {
                        let message = format!(
                            "Endpoint {} returned 0 results for the specified period {} - {}",
                            endpoint.name,
                            describe_bound(since),
                            describe_bound(until)
                        );
                        warn!("{message}");
                        self.log(LogLevel::Warn, message)?;
                    }

                    endpoint_results.push(json!({
                        "endpoint": endpoint.name,
                        "status": "SUCCESS",
                        "records_extracted": stats.records_extracted,
                        "pages_fetched": stats.pages_fetched,
                        "duration_ms": duration_ms
                    }));
                }
                Err(e) => {
                    error!("Error extracting endpoint {}: {e}", endpoint.name);
                    self.log(
                        LogLevel::Error,
                        format!("Error extracting endpoint {}: {e}", endpoint.name),
                    )?;

                    endpoint_results.push(json!({
                        "endpoint": endpoint.name,
                        "status": "FAILED",
                        "error": e.to_string(),
                        "error_kind": e.kind().map(|k| k.as_str()),
                        "records_extracted": stats.records_extracted,
                        "pages_fetched": stats.pages_fetched,
                        "duration_ms": duration_ms
                    }));
                    aborted = fail_fast;
                }
            }
        }

        let total_duration_ms = sync_start.elapsed().as_millis() as u64;
        let count = |status: &str| {
            endpoint_results
                .iter()
                .filter(|r| r["status"] == status)
                .count()
        };
        let successful = count("SUCCESS");
        let failed = count("FAILED");
        let status = if failed == 0 {
            "SUCCEEDED"
        } else if successful == 0 {
            "FAILED"
        } else {
            "PARTIAL"
        };

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": status,
                "total_records": total_records,
                "total_endpoints": endpoint_results.len(),
                "successful_endpoints": successful,
                "failed_endpoints": failed,
                "duration_ms": total_duration_ms,
                "output": {
                    "format": self.cli.format.as_str(),
                    "directory": output.map(|p| p.display().to_string())
                },
                "endpoints": endpoint_results
            }
        }))?;

        if failed > 0 {
            return Err(Error::Other(format!(
                "{failed} of {} endpoints failed",
                endpoint_results.len()
            )));
        }

        Ok(())
    }

    /// Extract one endpoint, returning its stats even when it failed part way
    async fn read_endpoint(
        &self,
        extractor: &Extractor,
        request: EndpointRequest,
        output: Option<&Path>,
    ) -> (ExtractStats, Result<()>) {
        let mut pages = extractor.extract(request);
        let outcome = self.drain(&mut pages, output).await;
        (*pages.stats(), outcome)
    }

    async fn drain(&self, pages: &mut PageStream<'_>, output: Option<&Path>) -> Result<()> {
        // Created on the first batch, so empty endpoints leave no file behind
        let mut writer: Option<JsonlWriter> = None;

        while let Some(batch) = pages.next_batch().await? {
            let Some(dir) = output else {
                self.emit_records(pages.endpoint(), &batch)?;
                continue;
            };

            if writer.is_none() {
                writer = Some(JsonlWriter::new(dir, pages.endpoint())?);
            }
            if let Some(writer) = writer.as_mut() {
                writer.write(&batch)?;
            }
        }

        if let Some(writer) = writer {
            let path = writer.path().display().to_string();
            let rows = writer.close()?;
            self.log(LogLevel::Info, format!("Wrote {rows} records to {path}"))?;
        }

        Ok(())
    }

    fn emit_records(&self, endpoint: &str, records: &[Record]) -> Result<()> {
        let emitted_at = Utc::now().timestamp_millis();
        for record in records {
            self.output_message(&json!({
                "type": "RECORD",
                "record": {
                    "stream": endpoint,
                    "data": record,
                    "emitted_at": emitted_at
                }
            }))?;
        }
        Ok(())
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": level,
                "message": message.into()
            }
        }))
    }

    /// Output a message
    ///
    /// Write failures surface as [`Error::Io`].
    fn output_message(&self, msg: &Value) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };

        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::output("Message stream lock poisoned"))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

fn describe_bound(bound: Option<DateTime<Utc>>) -> String {
    bound.map_or_else(|| "unbounded".to_string(), |ts| format_timestamp(&ts))
}
