#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use daily_ledger::{config::ConfigManager, ledger::LedgerService};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated service and config manager backed by a unique directory.
pub fn setup_test_env() -> (LedgerService, ConfigManager) {
    let base = temp_base();
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    let config = config_manager.load().expect("default config");
    let service = LedgerService::with_data_dir(config_manager.data_dir(&config));
    (service, config_manager)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
