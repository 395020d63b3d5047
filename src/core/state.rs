//! Conversion state and its operations

use tracing::{debug, warn};

use crate::core::rates::RateMapping;

/// The record behind one converter session: the amount and pair the
/// user entered, plus the last explicitly computed converted amount.
///
/// `converted` is derived data. It is recomputed only by [`convert`]
/// and is otherwise left as-is, so editing the amount or the pair does
/// not touch a previously displayed result.
///
/// [`convert`]: ConversionState::convert
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionState {
    amount: f64,
    source: String,
    target: String,
    converted: f64,
}

impl ConversionState {
    pub fn new(source: &str, target: &str) -> Self {
        ConversionState {
            amount: 0.0,
            source: source.to_string(),
            target: target.to_string(),
            converted: 0.0,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn converted(&self) -> f64 {
        self.converted
    }

    /// Replaces the entered amount. Input has already been coerced to
    /// a non-negative number at the boundary that read it.
    pub fn set_amount(&mut self, value: f64) {
        self.amount = value;
    }

    /// Replaces the source currency. Returns whether the base actually
    /// changed; callers use the signal to refresh rates.
    pub fn set_source(&mut self, code: &str) -> bool {
        if self.source == code {
            return false;
        }
        self.source = code.to_string();
        true
    }

    /// Replaces the target currency. Rates stay quoted against the
    /// source, so no refresh is needed.
    pub fn set_target(&mut self, code: &str) {
        self.target = code.to_string();
    }

    /// Exchanges source with target and amount with converted, so the
    /// "from" box shows the previous result. Returns whether the base
    /// changed (false when source == target).
    pub fn swap(&mut self) -> bool {
        std::mem::swap(&mut self.source, &mut self.target);
        std::mem::swap(&mut self.amount, &mut self.converted);
        self.source != self.target
    }

    /// Recomputes `converted = amount x rate(target)` from the given
    /// mapping and returns the applied rate. Leaves the previous value
    /// in place when no mapping is loaded or the target is unknown to
    /// it.
    pub fn convert(&mut self, rates: Option<&RateMapping>) -> Option<f64> {
        let Some(rates) = rates else {
            warn!("No rates loaded for {}, conversion skipped", self.source);
            return None;
        };
        let Some(rate) = rates.rate(&self.target) else {
            warn!(
                "No {} rate in the {} table, conversion skipped",
                self.target,
                rates.base()
            );
            return None;
        };
        self.converted = self.amount * rate;
        debug!(
            "Converted {} {} to {} {} at {}",
            self.amount, self.source, self.converted, self.target, rate
        );
        Some(rate)
    }
}

impl Default for ConversionState {
    fn default() -> Self {
        ConversionState::new("usd", "pkr")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_rates() -> RateMapping {
        RateMapping::from_entries(
            "usd",
            None,
            vec![
                ("pkr".to_string(), 278.5),
                ("eur".to_string(), 0.91),
                ("usd".to_string(), 1.0),
            ],
        )
    }

    #[test]
    fn test_defaults() {
        let state = ConversionState::default();
        assert_eq!(state.amount(), 0.0);
        assert_eq!(state.source(), "usd");
        assert_eq!(state.target(), "pkr");
        assert_eq!(state.converted(), 0.0);
    }

    #[test]
    fn test_convert_multiplies_amount_by_rate() {
        let rates = usd_rates();
        let mut state = ConversionState::new("usd", "pkr");
        state.set_amount(100.0);

        let rate = state.convert(Some(&rates));
        assert_eq!(rate, Some(278.5));
        assert_eq!(state.converted(), 27850.0);
    }

    #[test]
    fn test_convert_exact_for_arbitrary_amount() {
        let rates = usd_rates();
        let mut state = ConversionState::new("usd", "eur");
        state.set_amount(123.45);

        state.convert(Some(&rates));
        assert_eq!(state.converted(), 123.45 * 0.91);
    }

    #[test]
    fn test_convert_without_rates_is_noop() {
        let mut state = ConversionState::new("usd", "pkr");
        state.set_amount(100.0);
        state.convert(Some(&usd_rates()));

        let before = state.converted();
        assert_eq!(state.convert(None), None);
        assert_eq!(state.converted(), before);
    }

    #[test]
    fn test_convert_with_unknown_target_is_noop() {
        let rates = usd_rates();
        let mut state = ConversionState::new("usd", "xyz");
        state.set_amount(100.0);

        assert_eq!(state.convert(Some(&rates)), None);
        assert_eq!(state.converted(), 0.0);
    }

    #[test]
    fn test_convert_with_same_source_and_target() {
        let rates = usd_rates();
        let mut state = ConversionState::new("usd", "usd");
        state.set_amount(42.0);

        assert_eq!(state.convert(Some(&rates)), Some(1.0));
        assert_eq!(state.converted(), 42.0);
    }

    #[test]
    fn test_swap_exchanges_pair_and_amounts() {
        let mut state = ConversionState::new("usd", "pkr");
        state.set_amount(50.0);

        assert!(state.swap());
        assert_eq!(state.source(), "pkr");
        assert_eq!(state.target(), "usd");
        assert_eq!(state.amount(), 0.0);
        assert_eq!(state.converted(), 50.0);
    }

    #[test]
    fn test_swap_is_its_own_inverse() {
        let mut state = ConversionState::new("usd", "pkr");
        state.set_amount(100.0);
        state.convert(Some(&usd_rates()));
        let before = state.clone();

        state.swap();
        state.swap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_swap_with_equal_pair_reports_no_base_change() {
        let mut state = ConversionState::new("usd", "usd");
        assert!(!state.swap());
    }

    #[test]
    fn test_set_source_reports_change() {
        let mut state = ConversionState::new("usd", "pkr");
        assert!(!state.set_source("usd"));
        assert!(state.set_source("eur"));
        assert_eq!(state.source(), "eur");
    }

    #[test]
    fn test_set_target_keeps_converted() {
        let mut state = ConversionState::new("usd", "pkr");
        state.set_amount(100.0);
        state.convert(Some(&usd_rates()));

        state.set_target("eur");
        assert_eq!(state.target(), "eur");
        assert_eq!(state.converted(), 27850.0);
    }
}
