use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fixer_core::ScanSettings;
use fixer_engine::{ApiSettings, DEFAULT_SOURCE};
use fixer_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "fixer.ron";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Settings read from `fixer.ron`. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FixerConfig {
    pub server_url: String,
    pub scan_budget_ms: u64,
    pub download_source: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub log_destination: LogDestination,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8188".to_string(),
            scan_budget_ms: 3000,
            download_source: DEFAULT_SOURCE.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            log_destination: LogDestination::Terminal,
        }
    }
}

impl FixerConfig {
    pub(crate) fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            source: self.download_source.clone(),
        }
    }

    pub(crate) fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            budget: Duration::from_millis(self.scan_budget_ms),
        }
    }
}

/// Reads the config file. A missing file is `Ok(None)`.
pub(crate) fn read_config(path: &Path) -> Result<Option<FixerConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Falls back to defaults on any problem; the error is returned for logging
/// once the logger is up.
pub(crate) fn load_config(path: Option<&Path>) -> (FixerConfig, Option<ConfigError>) {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match read_config(path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (FixerConfig::default(), Some(err)),
    }
}
