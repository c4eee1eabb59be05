mod cli;
mod tui;

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::currency::CurrencyConverter;
use crate::interpret::Interpreter;
use crate::models::Currency;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

/// Everything the front ends need besides the database.
pub(crate) struct Services {
    pub(crate) interpreter: Interpreter,
    pub(crate) converter: CurrencyConverter,
    /// Stamped on new entries and used as the default "from" of conversions.
    pub(crate) currency: Currency,
    pub(crate) base_currency: Currency,
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

pub(crate) fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

/// True for a real calendar month written as "YYYY-MM".
pub(crate) fn is_valid_month(month: &str) -> bool {
    month.len() == 7
        && chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok()
}

/// Largest amount accepted for a typed entry, budget or conversion. Keeps
/// monthly and trip totals far from the `Decimal` range.
pub(crate) const MAX_ENTRY_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parses a typed amount. Accepts a decimal comma and rejects anything
/// outside `(0, MAX_ENTRY_AMOUNT]`.
pub(crate) fn parse_amount(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .ok()
        .filter(|amount| *amount > Decimal::ZERO && *amount <= MAX_ENTRY_AMOUNT)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
