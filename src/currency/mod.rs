//! CAD/IDR conversion backed by a persisted last-known rate.

pub mod client;

use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, ConfigManager},
    errors::LedgerError,
    utils::persistence::{read_optional, write_atomic},
};

pub use client::FrankfurterClient;

pub const CACHE_FILE_NAME: &str = ".rate_cache.json";
/// IDR per CAD used until a lookup succeeds.
pub const DEFAULT_CAD_TO_IDR: f64 = 11800.0;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn cad() -> Self {
        Self::new("CAD")
    }

    pub fn idr() -> Self {
        Self::new("IDR")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External lookup of the current exchange rate between two currencies.
pub trait RateSource: Send + Sync {
    /// Units of `to` per one unit of `from`.
    fn fetch_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, LedgerError>;
}

/// On-disk shape of `.rate_cache.json`. `last_updated` is `None` until a lookup succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateCache {
    pub cad_to_idr: f64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for RateCache {
    fn default() -> Self {
        Self {
            cad_to_idr: DEFAULT_CAD_TO_IDR,
            last_updated: None,
        }
    }
}

impl RateCache {
    /// Reads the cache file, falling back to the default rate on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        let data = match read_optional(path) {
            Ok(Some(data)) => data,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable rate cache, using default rate");
                return Self::default();
            }
        };
        match serde_json::from_str::<RateCache>(&data) {
            Ok(mut cache) => {
                // A zero timestamp written by older tools means "never".
                if cache.last_updated.is_some_and(|at| at.year() <= 1) {
                    cache.last_updated = None;
                }
                cache
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "corrupted rate cache, using default rate");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())
    }
}

/// Converts between CAD and IDR using the cached rate and tracks whether the last refresh failed.
pub struct CurrencyConverter {
    source: Box<dyn RateSource>,
    cache: RateCache,
    cache_path: PathBuf,
    offline: bool,
    last_error: Option<String>,
}

impl CurrencyConverter {
    /// Loads `<cache_dir>/.rate_cache.json`. Never fails; a missing or bad cache yields the default rate.
    pub fn new(cache_dir: impl AsRef<Path>, source: Box<dyn RateSource>) -> Self {
        let cache_path = cache_dir.as_ref().join(CACHE_FILE_NAME);
        let cache = RateCache::load_or_default(&cache_path);
        debug!(path = %cache_path.display(), rate = cache.cad_to_idr, "rate cache loaded");
        Self {
            source,
            cache,
            cache_path,
            offline: false,
            last_error: None,
        }
    }

    /// Converter over the configured rate service, caching in the configured data directory.
    pub fn from_config(manager: &ConfigManager, config: &Config) -> Result<Self, LedgerError> {
        let client = FrankfurterClient::from_config(config)?;
        Ok(Self::new(manager.data_dir(config), Box::new(client)))
    }

    /// Fetches a fresh CAD to IDR rate. On failure the previous rate stays in use and the
    /// converter reports offline until the next successful refresh.
    pub fn refresh_rate(&mut self) -> Result<(), LedgerError> {
        let fetched = self
            .source
            .fetch_rate(&CurrencyCode::cad(), &CurrencyCode::idr())
            .and_then(|rate| {
                if rate.is_finite() && rate > 0.0 {
                    Ok(rate)
                } else {
                    Err(LedgerError::Http(format!("rate service returned invalid rate {}", rate)))
                }
            });
        let rate = match fetched {
            Ok(rate) => rate,
            Err(err) => {
                warn!(error = %err, rate = self.cache.cad_to_idr, "rate refresh failed, staying on cached rate");
                self.offline = true;
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };
        self.cache = RateCache {
            cad_to_idr: rate,
            last_updated: Some(Utc::now()),
        };
        self.offline = false;
        self.last_error = None;
        info!(rate, "exchange rate refreshed");
        self.cache.save(&self.cache_path)
    }

    pub fn cad_to_idr(&self, cad: f64) -> f64 {
        cad * self.cache.cad_to_idr
    }

    /// Returns 0 when the cached rate is 0.
    pub fn idr_to_cad(&self, idr: f64) -> f64 {
        if self.cache.cad_to_idr == 0.0 {
            return 0.0;
        }
        idr / self.cache.cad_to_idr
    }

    pub fn cad_to_idr_rate(&self) -> f64 {
        self.cache.cad_to_idr
    }

    pub fn idr_to_cad_rate(&self) -> f64 {
        self.idr_to_cad(1.0)
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.cache.last_updated
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// `Jan 2, 2006 at 3:04 PM` in local time, or a note that the default rate is in use.
    pub fn last_updated_string(&self) -> String {
        match self.cache.last_updated {
            Some(at) => at
                .with_timezone(&Local)
                .format("%b %-d, %Y at %-I:%M %p")
                .to_string(),
            None => "never (using default rate)".to_string(),
        }
    }

    /// One-line status for display, reflecting how trustworthy the current rate is.
    pub fn status_message(&self) -> String {
        let rate = self.cache.cad_to_idr;
        match (self.offline, self.cache.last_updated) {
            (true, None) => format!("⚠ Offline - using default rate (1 CAD = {:.0} IDR)", rate),
            (true, Some(at)) => format!("⚠ Offline - using cached rate from {}", short_date(at)),
            (false, None) => format!("Rate: 1 CAD = {:.0} IDR (default, never updated)", rate),
            (false, Some(at)) => format!("Rate: 1 CAD = {:.0} IDR (updated {})", rate, short_date(at)),
        }
    }

    /// `1 CAD = 11800 IDR`
    pub fn format_rate(&self) -> String {
        format!("1 CAD = {:.0} IDR", self.cache.cad_to_idr)
    }
}

fn short_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    struct FixedRate(f64);

    impl RateSource for FixedRate {
        fn fetch_rate(&self, _: &CurrencyCode, _: &CurrencyCode) -> Result<f64, LedgerError> {
            Ok(self.0)
        }
    }

    #[test]
    fn missing_cache_uses_default_rate() {
        let temp = tempdir().unwrap();
        let converter = CurrencyConverter::new(temp.path(), Box::new(FixedRate(12000.0)));
        assert_eq!(converter.cad_to_idr(1.0), DEFAULT_CAD_TO_IDR);
        assert!(converter.status_message().contains("never"));
        assert_eq!(converter.last_updated_string(), "never (using default rate)");
        assert_eq!(converter.format_rate(), "1 CAD = 11800 IDR");
    }

    #[test]
    fn zero_timestamp_reads_as_never_updated() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join(CACHE_FILE_NAME),
            r#"{"cad_to_idr": 11650.5, "last_updated": "0001-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let converter = CurrencyConverter::new(temp.path(), Box::new(FixedRate(1.0)));
        assert_eq!(converter.cad_to_idr_rate(), 11650.5);
        assert_eq!(converter.last_updated(), None);
    }

    #[test]
    fn successful_refresh_persists_cache() {
        let temp = tempdir().unwrap();
        let mut converter = CurrencyConverter::new(temp.path(), Box::new(FixedRate(11900.0)));
        converter.refresh_rate().expect("refresh succeeds");
        assert!(!converter.is_offline());
        assert!(converter.last_updated().is_some());

        let stored = RateCache::load_or_default(converter.cache_path());
        assert_eq!(stored.cad_to_idr, 11900.0);
        assert_eq!(stored.last_updated, converter.last_updated());
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let temp = tempdir().unwrap();
        let mut converter = CurrencyConverter::new(temp.path(), Box::new(FixedRate(0.0)));
        assert!(converter.refresh_rate().is_err());
        assert!(converter.is_offline());
        assert_eq!(converter.cad_to_idr_rate(), DEFAULT_CAD_TO_IDR);
        assert!(!converter.cache_path().exists());
    }

    #[test]
    fn offline_with_cached_rate_mentions_cached_date() {
        let temp = tempdir().unwrap();
        let cache = RateCache {
            cad_to_idr: 11700.0,
            last_updated: Some(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()),
        };
        cache.save(&temp.path().join(CACHE_FILE_NAME)).unwrap();

        struct Down;
        impl RateSource for Down {
            fn fetch_rate(&self, _: &CurrencyCode, _: &CurrencyCode) -> Result<f64, LedgerError> {
                Err(LedgerError::Http("connection refused".into()))
            }
        }

        let mut converter = CurrencyConverter::new(temp.path(), Box::new(Down));
        assert!(converter.refresh_rate().is_err());
        assert!(converter.status_message().starts_with("⚠ Offline - using cached rate from Mar"));
        assert_eq!(converter.cad_to_idr(2.0), 23400.0);
        assert!(converter.last_error().unwrap().contains("connection refused"));
    }
}
