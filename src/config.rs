use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::session::{
    SessionConfig, DEFAULT_QUESTION_LIMIT, DEFAULT_RESULT_DELAY_MS, DEFAULT_TIME_LIMIT_SECS,
};
use crate::share::DEFAULT_TITLE;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub question_limit: usize,
    pub time_limit_secs: i64,
    pub result_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Page address embedded in share links; falls back to `server_url`.
    pub share_url: Option<String>,
    pub title: String,
    pub log_level: String,
    pub dictionary_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            question_limit: DEFAULT_QUESTION_LIMIT,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            result_delay_ms: DEFAULT_RESULT_DELAY_MS,
            request_timeout_secs: 10,
            share_url: None,
            title: DEFAULT_TITLE.to_string(),
            log_level: "info".to_string(),
            dictionary_path: None,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            question_limit: self.question_limit,
            time_limit_secs: self.time_limit_secs,
            result_delay: Duration::from_millis(self.result_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_url(&self) -> &str {
        self.share_url.as_deref().unwrap_or(&self.server_url)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file could not be read: {0}")]
    Read(#[source] io::Error),
    #[error("config file is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("gomi_quiz_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConfigStore {
    /// Read the stored settings. A missing file is `Ok(None)`; any other
    /// read failure or a malformed file is an error.
    pub fn try_load(&self) -> Result<Option<Config>, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ConfigError::Read(err)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(ConfigError::Parse)
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
