//! Daemon configuration
//!
//! Values come from an optional TOML file, then command-line flags override
//! them. [`Config::settings`] validates everything the engine needs.

use crate::engine::{DEFAULT_LABEL, EngineSettings};
use crate::error::ConfigError;
use crate::service::DEFAULT_BASE_URL;
use crate::suppression::{DEFAULT_START_DATE_FORMAT, SuppressionRules};
use crate::validation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default seconds between cycles
pub const DEFAULT_DELAY_SECS: u64 = 5;

/// Default location of the classification state file
pub const DEFAULT_STATE_FILE: &str = "gtd-autolabel-state.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Todoist API token
    pub api_key: Option<String>,
    pub base_url: String,
    /// Name of the marker label
    pub label: String,
    pub sequential_marker: String,
    pub parallel_marker: String,
    /// Hide tasks due more than this many days ahead; 0 disables
    pub hide_future: u32,
    /// chrono format of `start=<DATE>` directives
    pub date_format: String,
    /// Hour (1-24) at which the day ends for recurring tasks
    pub end_of_day: Option<u8>,
    /// Seconds between cycles
    pub delay: u64,
    /// "sequential" or "parallel" to label the inbox
    pub inbox: Option<String>,
    pub onetime: bool,
    pub state_file: PathBuf,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            label: DEFAULT_LABEL.to_string(),
            sequential_marker: "-".to_string(),
            parallel_marker: "=".to_string(),
            hide_future: 0,
            date_format: DEFAULT_START_DATE_FORMAT.to_string(),
            end_of_day: None,
            delay: DEFAULT_DELAY_SECS,
            inbox: None,
            onetime: false,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validated engine settings
    pub fn settings(&self) -> Result<EngineSettings, ConfigError> {
        let markers = validation::validate_markers(&self.sequential_marker, &self.parallel_marker)?;
        let label = validation::validate_label(&self.label)?;
        let start_date_format = validation::validate_date_format(&self.date_format)?;
        let end_of_day = self
            .end_of_day
            .map(validation::validate_end_of_day)
            .transpose()?;
        let inbox = self
            .inbox
            .as_deref()
            .map(validation::parse_inbox_mode)
            .transpose()?;

        Ok(EngineSettings {
            markers,
            label,
            inbox,
            suppression: SuppressionRules {
                hide_future_days: self.hide_future,
                start_date_format,
            },
            end_of_day,
        })
    }

    /// Validated API token
    pub fn api_key(&self) -> Result<String, ConfigError> {
        validation::require_api_key(self.api_key.as_deref())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay)
    }
}
