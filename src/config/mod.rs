//! Configuration for the extractor
//!
//! The job runner hands over a JSON file whose `parameters` object carries the
//! API location, the token, the endpoints to extract and an optional date
//! period:
//!
//! ```json
//! {"parameters": {
//!   "api_url": "https://app.example.com/api/1.1/obj/",
//!   "#api_token": "...",
//!   "endpoints": [{"name": "user", "pkey": ["_id"], "fields": "\"email\"", "incremental": true}],
//!   "period_from": "2 days ago",
//!   "period_to": "today"
//! }}
//! ```
//!
//! A bare parameters object, without the wrapper, is accepted as well.

mod dates;
mod settings;

pub use dates::resolve_date;
pub use settings::{ExtractorSettings, ExtractorSettingsBuilder};

use crate::error::{Error, Result};
use crate::extract::{EndpointRequest, Extractor};
use crate::http::HttpClient;
use crate::output::check_file_stem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Key of the token in the parameters object
pub const API_TOKEN_KEY: &str = "#api_token";

/// Parameters every configuration must carry
pub const MANDATORY_FIELDS: [&str; 3] = ["api_url", API_TOKEN_KEY, "endpoints"];

/// Fields every data type carries, appended to the configured columns
pub const DEFAULT_FIELDS: [&str; 5] = ["_id", "_type", "Creator", "Created Date", "Modified Date"];

// ============================================================================
// Extractor Config
// ============================================================================

/// Complete extractor configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Data API root, e.g. `https://app.example.com/api/1.1/obj/`
    pub api_url: String,

    /// API token
    #[serde(rename = "#api_token")]
    pub api_token: String,

    /// Data types to extract
    pub endpoints: Vec<EndpointConfig>,

    /// Lower bound of the modification-date window
    #[serde(default)]
    pub period_from: Option<String>,

    /// Upper bound of the modification-date window
    #[serde(default)]
    pub period_to: Option<String>,

    /// Verbose logging
    #[serde(default)]
    pub debug: bool,

    /// Transport and paging tunables
    #[serde(default)]
    pub settings: ExtractorSettings,
}

impl std::fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"***")
            .field("endpoints", &self.endpoints)
            .field("period_from", &self.period_from)
            .field("period_to", &self.period_to)
            .field("debug", &self.debug)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ExtractorConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Load and validate a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load and validate a configuration from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut map) if map.contains_key("parameters") => {
                map.remove("parameters").unwrap_or_default()
            }
            other => other,
        };

        let object = value
            .as_object()
            .ok_or_else(|| Error::config("configuration must be a JSON object"))?;

        for field in MANDATORY_FIELDS {
            match object.get(field) {
                None | Some(Value::Null) => return Err(Error::missing_field(field)),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(Error::missing_field(field))
                }
                _ => {}
            }
        }

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration against the current time
    pub fn validate(&self) -> Result<()> {
        self.validate_at(Utc::now())
    }

    /// Check the configuration, resolving dates against `now`
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<()> {
        url::Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;

        if self.endpoints.is_empty() {
            return Err(Error::invalid_value(
                "endpoints",
                "at least one endpoint is required",
            ));
        }

        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            if endpoint.name.trim().is_empty() {
                return Err(Error::invalid_value("endpoints", "Endpoint name cannot be empty"));
            }
            check_file_stem(&endpoint.name).map_err(|_| {
                Error::invalid_value(
                    "endpoints",
                    format!("Endpoint name '{}' cannot be used as a file name", endpoint.name),
                )
            })?;
            if !seen.insert(endpoint.name.as_str()) {
                return Err(Error::invalid_value(
                    "endpoints",
                    format!("Endpoint '{}' is configured more than once", endpoint.name),
                ));
            }
            endpoint.columns()?;
        }

        self.resolve_window(now)?;
        Ok(())
    }

    /// Resolve the configured period into concrete bounds
    pub fn resolve_window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let since = resolve_field("period_from", self.period_from.as_deref(), now)?;
        let until = resolve_field("period_to", self.period_to.as_deref(), now)?;

        if let (Some(since), Some(until)) = (since, until) {
            if since >= until {
                return Err(Error::invalid_value(
                    "period_from",
                    format!("{since} is not before period_to {until}"),
                ));
            }
        }

        Ok((since, until))
    }

    /// Look up an endpoint by name
    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    /// Endpoints to run: all of them, or the named subset in configured order
    pub fn select_endpoints(&self, names: &[String]) -> Result<Vec<&EndpointConfig>> {
        if names.is_empty() {
            return Ok(self.endpoints.iter().collect());
        }

        if let Some(unknown) = names.iter().find(|n| self.endpoint(n).is_none()) {
            return Err(Error::invalid_value(
                "endpoints",
                format!("Endpoint '{unknown}' is not configured"),
            ));
        }

        Ok(self
            .endpoints
            .iter()
            .filter(|e| names.contains(&e.name))
            .collect())
    }

    /// Extraction request for an endpoint with the configured window
    pub fn request_for(
        &self,
        endpoint: &EndpointConfig,
        now: DateTime<Utc>,
    ) -> Result<EndpointRequest> {
        let (since, until) = self.resolve_window(now)?;
        Ok(EndpointRequest::new(&endpoint.name).window(since, until))
    }

    /// Build an extractor for this configuration
    pub fn extractor(&self) -> Result<Extractor> {
        let http = self.settings.http_config(&self.api_url, &self.api_token);
        let client = HttpClient::with_config(http)?;
        Ok(Extractor::new(client).with_pagination(self.settings.pagination()))
    }
}

fn resolve_field(
    field: &str,
    value: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => resolve_date(text, now)
            .map(Some)
            .map_err(|e| Error::invalid_value(field, e.to_string())),
    }
}

// ============================================================================
// Endpoint Config
// ============================================================================

/// One data type to extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Data type name, appended to the API URL
    #[serde(default)]
    pub name: String,

    /// Primary key columns
    #[serde(default)]
    pub pkey: Vec<String>,

    /// Extra columns as a comma-separated list of quoted names, e.g. `"email", "age"`
    #[serde(default)]
    pub fields: Option<String>,

    /// Whether downstream loads should be incremental
    #[serde(default = "default_true")]
    pub incremental: bool,
}

fn default_true() -> bool {
    true
}

impl EndpointConfig {
    /// Create an endpoint config with defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pkey: Vec::new(),
            fields: None,
            incremental: true,
        }
    }

    /// Configured columns followed by the default fields, without duplicates
    pub fn columns(&self) -> Result<Vec<String>> {
        let listed = self.fields.as_deref().unwrap_or("").trim();
        let mut columns: Vec<String> = if listed.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&format!("[{listed}]")).map_err(|_| {
                Error::invalid_value(
                    format!("endpoints.{}.fields", self.name),
                    format!(
                        "the list of columns {listed} is invalid, check that every name is \
                         enclosed in \" quotes and separated by a comma"
                    ),
                )
            })?
        };

        columns.extend(DEFAULT_FIELDS.iter().map(ToString::to_string));

        let mut seen = HashSet::new();
        columns.retain(|c| seen.insert(c.clone()));
        Ok(columns)
    }
}
