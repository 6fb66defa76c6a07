use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::ConfigError;

/// Holiya chatbot API
const DEFAULT_BASE_URL: &str = "http://13.61.194.44/api/chatbot";

const DEFAULT_USER_ID: i64 = 35;

const CONFIG_DIR_NAME: &str = "holiya-chat";

const LOCAL_CONFIG_FILE: &str = "holiya-chat.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the chatbot backend (no trailing slash)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User whose sessions are listed and who sends messages
    #[serde(default = "default_user_id")]
    pub user_id: i64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub debug: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_user_id() -> i64 {
    DEFAULT_USER_ID
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: default_user_id(),
            request_timeout_secs: default_request_timeout_secs(),
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Loads configuration: defaults, then the global file, then `./holiya-chat.json`,
/// then environment variables.
pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let global_path = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.json"));
    load_layered(global_path.as_deref(), &wd, |key| std::env::var(key).ok())
}

pub(crate) fn load_layered(
    global_path: Option<&Path>,
    working_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();

    if let Some(path) = global_path {
        if let Some(file_config) = read_config_file(path)? {
            merge_config(&mut config, file_config);
        }
    }

    if let Some(file_config) = read_config_file(&working_dir.join(LOCAL_CONFIG_FILE))? {
        merge_config(&mut config, file_config);
    }

    apply_env(&mut config, env);

    config.base_url = config.base_url.trim_end_matches('/').to_string();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::File(format!("{}: {e}", path.display())))?;
    let file_config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(Some(file_config))
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.base_url != default_base_url() {
        base.base_url = overlay.base_url;
    }
    if overlay.user_id != default_user_id() {
        base.user_id = overlay.user_id;
    }
    if overlay.request_timeout_secs != default_request_timeout_secs() {
        base.request_timeout_secs = overlay.request_timeout_secs;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn apply_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("HOLIYA_BASE_URL").filter(|v| !v.is_empty()) {
        config.base_url = url;
    }

    if let Some(raw) = lookup("HOLIYA_USER_ID").filter(|v| !v.is_empty()) {
        match raw.trim().parse::<i64>() {
            Ok(id) => config.user_id = id,
            Err(_) => tracing::warn!(value = %raw, "ignoring invalid HOLIYA_USER_ID"),
        }
    }

    if let Some(raw) = lookup("HOLIYA_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
            _ => tracing::warn!(value = %raw, "ignoring invalid HOLIYA_TIMEOUT_SECS"),
        }
    }
}

/// Directory for the TUI log file.
pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join(CONFIG_DIR_NAME))
}
