//! Application constants
//!
//! Centralized location for file names and configuration defaults.

/// Application name
pub const APP_NAME: &str = "reqline";

/// Directory under the home directory holding config, history and logs
pub const CONFIG_DIR_NAME: &str = ".reqline";

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const HISTORY_FILE_NAME: &str = "history.json";
pub const SAVED_REQUESTS_FILE_NAME: &str = "saved_requests.json";
pub const LOG_FILE_NAME: &str = "reqline.log";

/// Transport timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
