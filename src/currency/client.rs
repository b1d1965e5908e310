use std::{collections::HashMap, time::Duration};

use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{config::Config, errors::LedgerError};

use super::{CurrencyCode, RateSource};

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Rate lookups against a Frankfurter-compatible `/latest` endpoint.
#[derive(Debug, Clone)]
pub struct FrankfurterClient {
    http: Client,
    base_url: String,
}

impl FrankfurterClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        Self::new(config.rate_api_url.clone(), config.rate_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RateSource for FrankfurterClient {
    fn fetch_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, LedgerError> {
        let url = format!("{}/latest", self.base_url);
        debug!(%url, from = from.as_str(), to = to.as_str(), "requesting rate");
        let response = self
            .http
            .get(&url)
            .query(&[("from", from.as_str()), ("to", to.as_str())])
            .send()?;
        if response.status() != StatusCode::OK {
            return Err(LedgerError::Http(format!(
                "rate service returned status {}",
                response.status().as_u16()
            )));
        }
        let body: LatestResponse = response.json()?;
        body.rates
            .get(to.as_str())
            .copied()
            .ok_or_else(|| LedgerError::RateMissing {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}
