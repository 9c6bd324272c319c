//! User configuration loaded from `~/.reqline/config.yaml`
//!
//! Every field is optional in the file; missing ones fall back to
//! `Config::default()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_TIMEOUT_SECS, HISTORY_FILE_NAME, LOG_FILE_NAME,
    SAVED_REQUESTS_FILE_NAME,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_file: PathBuf,
    pub saved_requests_file: PathBuf,
    pub log_file: PathBuf,
    pub timeout_secs: u64,
    /// When false, history and saved requests live in memory only
    pub persist: bool,
}

/// `~/.reqline`, or `./.reqline` when there is no home directory
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

impl Default for Config {
    fn default() -> Self {
        let dir = config_dir();
        Config {
            history_file: dir.join(HISTORY_FILE_NAME),
            saved_requests_file: dir.join(SAVED_REQUESTS_FILE_NAME),
            log_file: dir.join(LOG_FILE_NAME),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            persist: true,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_dir().join(CONFIG_FILE_NAME)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing file that was
    /// asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !explicit && !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
