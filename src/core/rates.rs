//! Exchange rate table and the provider seam

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

/// Normalizes a user-supplied currency code.
///
/// Codes are lowercase ASCII alphanumerics: "usd", "pkr", and the
/// occasional "1inch" style ticker. Returns `None` for input that
/// cannot name a currency.
pub fn normalize_code(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_lowercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(code)
}

/// Per-base table of exchange rates against every known currency.
///
/// Replaced wholesale on each successful fetch. The key set defines
/// the universe of selectable currencies; every rate is positive and
/// finite because malformed payload entries are dropped at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RateMapping {
    base: String,
    as_of: Option<NaiveDate>,
    rates: BTreeMap<String, f64>,
}

impl RateMapping {
    /// Builds a mapping from raw payload entries, dropping entries
    /// with malformed codes or non-positive/non-finite rates.
    pub fn from_entries<I>(base: &str, as_of: Option<NaiveDate>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut rates = BTreeMap::new();
        for (raw_code, rate) in entries {
            let Some(code) = normalize_code(&raw_code) else {
                debug!("Dropping malformed currency code {raw_code:?}");
                continue;
            };
            if !rate.is_finite() || rate <= 0.0 {
                debug!("Dropping invalid rate {rate} for {code}");
                continue;
            }
            rates.insert(code, rate);
        }
        RateMapping {
            base: base.to_string(),
            as_of,
            rates,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote date reported by the upstream API, when it sent one.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// Rate from the base to `code`, if the currency is known.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Selectable currency codes, sorted.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Retrieves the full rate table quoted against `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateMapping>;
}
