use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::rates::{RateMapping, RateProvider};

/// jsdelivr CDN of the fawazahmed0 currency API.
pub const DEFAULT_BASE_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1";

/// Rate provider backed by `GET {base_url}/currencies/{base}.json`.
///
/// The payload is `{"date": "YYYY-MM-DD", "<base>": {"<code>": rate}}`;
/// the nested object keyed by the base code becomes the rate table.
pub struct CurrencyApiProvider {
    base_url: String,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str) -> Self {
        CurrencyApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for CurrencyApiProvider {
    #[instrument(
        name = "RateFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<RateMapping> {
        let url = format!("{}/currencies/{}.json", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let client = reqwest::Client::builder().user_agent("fxc/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base: {} URL: {}", e, base, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        let as_of = payload
            .get("date")
            .and_then(Value::as_str)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok());

        let table = payload
            .get(base)
            .and_then(Value::as_object)
            .ok_or_else(|| anyhow!("No rate table found for base: {}", base))?;

        let mut entries = Vec::with_capacity(table.len());
        for (code, rate) in table {
            match rate.as_f64() {
                Some(rate) => entries.push((code.clone(), rate)),
                None => debug!("Dropping non-numeric rate for {code:?}"),
            }
        }

        let mapping = RateMapping::from_entries(base, as_of, entries);
        if mapping.is_empty() {
            return Err(anyhow!("Empty rate table for base: {}", base));
        }

        debug!("Fetched {} rates for {}", mapping.len(), base);
        Ok(mapping)
    }
}
