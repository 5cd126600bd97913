//! Dashboard configuration.
//!
//! Values come from built-in defaults, optionally overlaid by a YAML file
//! (`--config`), then by explicit command-line flags.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{cache::DEFAULT_TTL, source::DATE_PLACEHOLDER};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REMOTE_TEMPLATE: &str =
    "https://spotifycharts.com/regional/pk/daily/{date}/download";
pub const DEFAULT_EXPORT_FILE: &str = "spotify_pk_filtered.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub remote_url_template: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub export_file_name: String,
    pub input_encoding: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            remote_url_template: DEFAULT_REMOTE_TEMPLATE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
            input_encoding: None,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config {path:?}"))?;
        let config: DashboardConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.remote_url_template.contains(DATE_PLACEHOLDER),
            "remote_url_template must contain the {DATE_PLACEHOLDER} placeholder"
        );
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        ensure!(
            !self.export_file_name.trim().is_empty(),
            "export_file_name cannot be empty"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
