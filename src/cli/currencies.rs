use anyhow::{Result, anyhow};
use comfy_table::{Cell, CellAlignment};
use tracing::error;

use super::ui;
use crate::core::rates::{RateProvider, normalize_code};

/// Prints the full rate table for a base currency.
pub async fn run(provider: &dyn RateProvider, base: &str) -> Result<()> {
    let base = normalize_code(base).ok_or_else(|| anyhow!("Not a currency code: {base:?}"))?;

    let spinner = ui::new_spinner(&format!("Fetching {} rates...", base.to_uppercase()));
    let fetched = provider.fetch_rates(&base).await;
    spinner.finish_and_clear();

    let rates = match fetched {
        Ok(rates) => rates,
        Err(e) => {
            error!("Failed to fetch rates for {base}: {e}");
            println!(
                "{}",
                ui::style_text("Rates are unavailable, try again later.", ui::StyleType::Error)
            );
            return Ok(());
        }
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell(&format!("1 {} =", base.to_uppercase())),
    ]);
    for (code, rate) in rates.iter() {
        table.add_row(vec![
            Cell::new(code.to_uppercase()),
            Cell::new(rate.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    let mut footer = format!("{} currencies", rates.len());
    if let Some(date) = rates.as_of() {
        footer.push_str(&format!(", rates as of {date}"));
    }
    println!("{}", ui::style_text(&footer, ui::StyleType::Subtle));

    Ok(())
}
