//! Interactive converter session
//!
//! Renders the two amount/currency boxes with a swap control and a
//! convert action, and feeds commands back into the [`Converter`].

use std::sync::Arc;

use anyhow::Result;
use comfy_table::Cell;
use console::{Term, style};
use tracing::warn;

use super::ui;
use crate::converter::Converter;
use crate::core::config::AppConfig;
use crate::core::rates::{RateProvider, normalize_code};

enum Command {
    Amount(f64),
    From(String),
    To(String),
    Swap,
    Convert,
    Codes,
    Help,
    Quit,
    Unknown(String),
}

/// Coerces an entered amount to the non-negative number the state
/// expects; unparseable or negative input becomes 0.
fn parse_amount(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        Ok(value) => {
            warn!("Clamping invalid amount {value} to 0");
            0.0
        }
        Err(_) => {
            warn!("Not a number: {input:?}, using 0");
            0.0
        }
    }
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        // An empty submit converts, like the original form.
        return Command::Convert;
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    match word.to_ascii_lowercase().as_str() {
        "amount" | "a" => Command::Amount(parse_amount(rest)),
        "from" | "f" => Command::From(rest.to_string()),
        "to" | "t" => Command::To(rest.to_string()),
        "swap" | "s" => Command::Swap,
        "convert" | "c" => Command::Convert,
        "codes" => Command::Codes,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ if line.parse::<f64>().is_ok() => Command::Amount(parse_amount(line)),
        _ => Command::Unknown(line.to_string()),
    }
}

pub async fn run(provider: Arc<dyn RateProvider>, config: &AppConfig) -> Result<()> {
    let term = Term::stdout();
    let mut converter = Converter::new(provider, &config.source, &config.target);

    converter.start().await;
    settle_with_spinner(&mut converter).await;

    term.write_line(&ui::style_text("Currency Converter", ui::StyleType::Title))?;
    term.write_line(&ui::style_text(
        "Type an amount, then press enter to convert. `help` lists commands.",
        ui::StyleType::Subtle,
    ))?;

    loop {
        render(&term, &converter).await?;

        let prompt = format!(
            "convert {} to {}",
            converter.state().source().to_uppercase(),
            converter.state().target().to_uppercase()
        );
        term.write_str(&format!("{}> ", style(prompt).cyan().bold()))?;
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            // stdin closed
            term.write_line("")?;
            break;
        }

        match parse_command(&line) {
            Command::Amount(value) => converter.set_amount(value),
            Command::From(code) => match normalize_code(&code) {
                Some(code) => converter.set_source(&code).await,
                None => print_error(&term, &format!("Not a currency code: {code:?}"))?,
            },
            Command::To(code) => match normalize_code(&code) {
                Some(code) => converter.set_target(&code),
                None => print_error(&term, &format!("Not a currency code: {code:?}"))?,
            },
            Command::Swap => converter.swap().await,
            Command::Convert => {
                settle_with_spinner(&mut converter).await;
                if converter.convert().await.is_none() {
                    print_error(
                        &term,
                        &format!(
                            "No {} rate available yet.",
                            converter.state().target().to_uppercase()
                        ),
                    )?;
                }
            }
            Command::Codes => {
                settle_with_spinner(&mut converter).await;
                let options = converter.options().await;
                if options.is_empty() {
                    print_error(&term, "No rates loaded yet.")?;
                } else {
                    term.write_line(&format!(
                        "{} currencies: {}",
                        options.len(),
                        options.join(" ")
                    ))?;
                }
            }
            Command::Help => print_help(&term)?,
            Command::Quit => break,
            Command::Unknown(input) => {
                print_error(&term, &format!("Unknown command: {input:?}"))?;
            }
        }
    }

    Ok(())
}

async fn render(term: &Term, converter: &Converter) -> Result<()> {
    let state = converter.state();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Amount"),
        ui::header_cell("Currency"),
    ]);
    table.add_row(vec![
        Cell::new("From"),
        ui::amount_cell(state.amount()),
        Cell::new(state.source().to_uppercase()),
    ]);
    table.add_row(vec![
        Cell::new("To"),
        ui::amount_cell(state.converted()),
        Cell::new(state.target().to_uppercase()),
    ]);
    term.write_line(&table.to_string())?;

    match converter.current_rates().await {
        Some(rates) => {
            if let Some(date) = rates.as_of() {
                term.write_line(&ui::style_text(
                    &format!("{} currencies, rates as of {date}", rates.len()),
                    ui::StyleType::Subtle,
                ))?;
            }
        }
        None => {
            term.write_line(&ui::style_text("No rates loaded yet.", ui::StyleType::Subtle))?;
        }
    }
    Ok(())
}

async fn settle_with_spinner(converter: &mut Converter) {
    if converter.fetching() {
        let spinner = ui::new_spinner("Fetching rates...");
        converter.settle().await;
        spinner.finish_and_clear();
    }
}

fn print_error(term: &Term, message: &str) -> Result<()> {
    term.write_line(&ui::style_text(message, ui::StyleType::Error))?;
    Ok(())
}

fn print_help(term: &Term) -> Result<()> {
    for line in [
        "<number>        set the amount to convert",
        "from <code>     set the source currency (refetches rates)",
        "to <code>       set the target currency",
        "swap            exchange the two boxes",
        "convert         compute the conversion (empty line works too)",
        "codes           list selectable currency codes",
        "quit            leave the session",
    ] {
        term.write_line(&ui::style_text(line, ui::StyleType::Subtle))?;
    }
    Ok(())
}
