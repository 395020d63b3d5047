//! Wires the conversion state to rate retrieval

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::core::book::RateBook;
use crate::core::rates::{RateMapping, RateProvider};
use crate::core::state::ConversionState;

/// Owns the conversion state for one session and keeps it consistent
/// with rate retrieval.
///
/// Every change of the source currency spawns one fetch for the new
/// base. Fetches are never cancelled; a response that lost the race to
/// a newer base selection is discarded by the [`RateBook`] ticket
/// check, so the displayed table always belongs to the last requested
/// base.
pub struct Converter {
    state: ConversionState,
    book: Arc<RateBook>,
    provider: Arc<dyn RateProvider>,
    in_flight: Option<JoinHandle<()>>,
}

impl Converter {
    pub fn new(provider: Arc<dyn RateProvider>, source: &str, target: &str) -> Self {
        Converter {
            state: ConversionState::new(source, target),
            book: Arc::new(RateBook::new()),
            provider,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// Issues the initial fetch for the starting source currency.
    pub async fn start(&mut self) {
        self.refresh_rates().await;
    }

    pub fn set_amount(&mut self, value: f64) {
        self.state.set_amount(value);
    }

    pub async fn set_source(&mut self, code: &str) {
        if self.state.set_source(code) {
            self.refresh_rates().await;
        }
    }

    pub fn set_target(&mut self, code: &str) {
        self.state.set_target(code);
    }

    pub async fn swap(&mut self) {
        if self.state.swap() {
            self.refresh_rates().await;
        }
    }

    /// Explicit conversion request: reads the current rate table and
    /// recomputes the converted amount. Returns the applied rate, or
    /// `None` when no usable rate exists yet.
    pub async fn convert(&mut self) -> Option<f64> {
        let rates = self.book.snapshot().await;
        self.state.convert(rates.as_ref())
    }

    /// Sorted currency codes of the current rate table, empty until a
    /// fetch has succeeded.
    pub async fn options(&self) -> Vec<String> {
        self.book
            .snapshot()
            .await
            .map(|rates| rates.codes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub async fn current_rates(&self) -> Option<RateMapping> {
        self.book.snapshot().await
    }

    /// Whether a fetch task has been spawned and not yet awaited.
    pub fn fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Waits for the most recently spawned fetch, if any, to resolve.
    /// Older superseded fetches keep running detached; the book drops
    /// whatever they eventually install.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                error!("Rate fetch task failed: {e}");
            }
        }
    }

    async fn refresh_rates(&mut self) {
        let base = self.state.source().to_string();
        let ticket = self.book.begin().await;
        let book = Arc::clone(&self.book);
        let provider = Arc::clone(&self.provider);
        debug!("Fetching rates for {base} (ticket {ticket})");

        self.in_flight = Some(tokio::spawn(async move {
            match provider.fetch_rates(&base).await {
                Ok(mapping) => {
                    book.install(ticket, mapping).await;
                }
                Err(e) => error!("Failed to fetch rates for {base}: {e}"),
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves a fixed table for any base and records each fetch.
    #[derive(Default)]
    struct CountingProvider {
        calls: Mutex<Vec<String>>,
    }

    impl CountingProvider {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateProvider for CountingProvider {
        async fn fetch_rates(&self, base: &str) -> Result<RateMapping> {
            self.calls.lock().unwrap().push(base.to_string());
            Ok(RateMapping::from_entries(
                base,
                None,
                vec![
                    ("usd".to_string(), 1.0),
                    ("eur".to_string(), 0.91),
                    ("pkr".to_string(), 278.5),
                ],
            ))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        async fn fetch_rates(&self, base: &str) -> Result<RateMapping> {
            Err(anyhow!("no rates for {base}"))
        }
    }

    #[tokio::test]
    async fn test_source_change_triggers_single_fetch_for_new_base() {
        let provider = Arc::new(CountingProvider::default());
        let mut converter = Converter::new(provider.clone(), "usd", "pkr");

        converter.start().await;
        converter.settle().await;
        assert_eq!(provider.calls(), vec!["usd"]);

        converter.set_source("eur").await;
        converter.settle().await;
        assert_eq!(provider.calls(), vec!["usd", "eur"]);

        // Same base again: no fetch.
        converter.set_source("eur").await;
        converter.settle().await;
        assert_eq!(provider.calls(), vec!["usd", "eur"]);
    }

    #[tokio::test]
    async fn test_target_change_never_triggers_fetch() {
        let provider = Arc::new(CountingProvider::default());
        let mut converter = Converter::new(provider.clone(), "usd", "pkr");

        converter.start().await;
        converter.settle().await;

        converter.set_target("eur");
        converter.set_target("aud");
        assert!(!converter.fetching());
        assert_eq!(provider.calls(), vec!["usd"]);
    }

    #[tokio::test]
    async fn test_swap_fetches_for_the_new_base() {
        let provider = Arc::new(CountingProvider::default());
        let mut converter = Converter::new(provider.clone(), "usd", "pkr");

        converter.start().await;
        converter.settle().await;

        converter.swap().await;
        converter.settle().await;
        assert_eq!(converter.state().source(), "pkr");
        assert_eq!(provider.calls(), vec!["usd", "pkr"]);
    }

    #[tokio::test]
    async fn test_convert_scenario() {
        let provider = Arc::new(CountingProvider::default());
        let mut converter = Converter::new(provider, "usd", "pkr");

        converter.start().await;
        converter.settle().await;

        converter.set_amount(100.0);
        let rate = converter.convert().await;
        assert_eq!(rate, Some(278.5));
        assert_eq!(converter.state().converted(), 27850.0);
    }

    #[tokio::test]
    async fn test_convert_before_any_rates_is_noop() {
        let provider = Arc::new(FailingProvider);
        let mut converter = Converter::new(provider, "usd", "pkr");

        converter.start().await;
        converter.settle().await;

        converter.set_amount(100.0);
        assert_eq!(converter.convert().await, None);
        assert_eq!(converter.state().converted(), 0.0);
        assert!(converter.options().await.is_empty());
    }

    #[tokio::test]
    async fn test_options_come_from_the_current_table() {
        let provider = Arc::new(CountingProvider::default());
        let mut converter = Converter::new(provider, "usd", "pkr");

        converter.start().await;
        converter.settle().await;

        assert_eq!(converter.options().await, vec!["eur", "pkr", "usd"]);
    }
}
