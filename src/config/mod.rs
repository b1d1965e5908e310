use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::{
    errors::LedgerError,
    utils::persistence::{ensure_dir, read_optional, write_atomic},
};

const HOME_ENV: &str = "DAILY_LEDGER_HOME";
const DEFAULT_DIR_NAME: &str = ".daily_ledger";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_DATA_DIR: &str = "ledger-data";
pub const DEFAULT_RATE_API_URL: &str = "https://api.frankfurter.app";
pub const DEFAULT_RATE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UNDO_CAPACITY: usize = 100;

/// Returns the application home, defaulting to `~/.daily_ledger`.
pub fn app_home_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// User-tunable settings for storage, the rate service and undo history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Root of the `YYYY/MM/DD` tree; relative paths resolve against the app home.
    #[serde(default = "Config::default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "Config::default_rate_api_url")]
    pub rate_api_url: String,
    #[serde(default = "Config::default_rate_timeout_secs")]
    pub rate_timeout_secs: u64,
    #[serde(default = "Config::default_undo_capacity")]
    pub undo_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            rate_api_url: Self::default_rate_api_url(),
            rate_timeout_secs: Self::default_rate_timeout_secs(),
            undo_capacity: Self::default_undo_capacity(),
        }
    }
}

impl Config {
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from(DEFAULT_DATA_DIR)
    }

    pub fn default_rate_api_url() -> String {
        DEFAULT_RATE_API_URL.into()
    }

    pub fn default_rate_timeout_secs() -> u64 {
        DEFAULT_RATE_TIMEOUT_SECS
    }

    pub fn default_undo_capacity() -> usize {
        DEFAULT_UNDO_CAPACITY
    }

    /// Absolute data directory, anchoring relative paths at `base`.
    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            base.join(&self.data_dir)
        }
    }

    pub fn rate_timeout(&self) -> Duration {
        Duration::from_secs(self.rate_timeout_secs.max(1))
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.rate_api_url.trim().is_empty() {
            return Err(LedgerError::Config("rate_api_url must not be empty".into()));
        }
        if self.undo_capacity == 0 {
            return Err(LedgerError::Config("undo_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

/// Loads and persists [`Config`] as `config.json` inside the app home.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(app_home_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        let path = base.join(CONFIG_FILE);
        Ok(Self { base, path })
    }

    /// Reads the config file; a missing file yields defaults.
    pub fn load(&self) -> Result<Config, LedgerError> {
        let config = match read_optional(&self.path)? {
            Some(data) => serde_json::from_str::<Config>(&data)?,
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())
    }

    /// Data directory for `config`, resolved against this manager's base.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config.resolve_data_dir(&self.base)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
