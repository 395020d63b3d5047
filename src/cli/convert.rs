use anyhow::{Result, anyhow};
use tracing::{error, warn};

use super::ui;
use crate::core::rates::{RateProvider, normalize_code};
use crate::core::state::ConversionState;

/// One-shot conversion: fetch the table for `from`, convert, print.
///
/// A failed fetch or a missing target rate degrades to a styled error
/// line; neither fails the process.
pub async fn run(provider: &dyn RateProvider, amount: f64, from: &str, to: &str) -> Result<()> {
    let from = normalize_code(from).ok_or_else(|| anyhow!("Not a currency code: {from:?}"))?;
    let to = normalize_code(to).ok_or_else(|| anyhow!("Not a currency code: {to:?}"))?;

    let amount = if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        warn!("Clamping invalid amount {amount} to 0");
        0.0
    };

    let mut state = ConversionState::new(&from, &to);
    state.set_amount(amount);

    let spinner = ui::new_spinner(&format!("Fetching {} rates...", from.to_uppercase()));
    let fetched = provider.fetch_rates(&from).await;
    spinner.finish_and_clear();

    let rates = match fetched {
        Ok(rates) => rates,
        Err(e) => {
            error!("Failed to fetch rates for {from}: {e}");
            println!(
                "{}",
                ui::style_text("Rates are unavailable, try again later.", ui::StyleType::Error)
            );
            return Ok(());
        }
    };

    match state.convert(Some(&rates)) {
        Some(rate) => {
            println!(
                "{} {} = {} {}",
                ui::format_amount(state.amount()),
                state.source().to_uppercase(),
                ui::style_text(
                    &ui::format_amount(state.converted()),
                    ui::StyleType::ResultValue
                ),
                state.target().to_uppercase(),
            );

            let mut footer = format!("1 {} = {} {}", from.to_uppercase(), rate, to.to_uppercase());
            if let Some(date) = rates.as_of() {
                footer.push_str(&format!(", rates as of {date}"));
            }
            println!("{}", ui::style_text(&footer, ui::StyleType::Subtle));
        }
        None => {
            println!(
                "{}",
                ui::style_text(
                    &format!(
                        "No {} rate in the {} table.",
                        to.to_uppercase(),
                        from.to_uppercase()
                    ),
                    ui::StyleType::Error
                )
            );
        }
    }

    Ok(())
}
