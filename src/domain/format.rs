//! Currency and number formatting for display.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Separators and precision used when painting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Currency symbol placed before amounts, empty for none
    pub symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    /// Decimals for currency amounts
    pub decimals: usize,
    /// Decimals for quantities and magnitudes
    pub quantity_decimals: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            symbol: "R$".into(),
            thousands_separator: ".".into(),
            decimal_separator: ",".into(),
            decimals: 2,
            quantity_decimals: 2,
        }
    }
}

/// Fixed-point text of `value`, midpoints rounded away from zero.
///
/// Rounds the shortest decimal form of the float, so `2.675` becomes `2.68`
/// even though its binary value sits just below the midpoint. Magnitudes
/// outside the `Decimal` range keep the float formatting.
fn fixed_point(value: f64, decimals: usize) -> String {
    match Decimal::from_str(&value.to_string()) {
        Ok(d) => {
            let dp = u32::try_from(decimals).unwrap_or(u32::MAX);
            let rounded = d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", decimals, rounded)
        }
        Err(_) => format!("{:.*}", decimals, value),
    }
}

/// Format `value` with grouping and a fixed number of decimals.
///
/// Non-finite values are rendered as Rust prints them.
pub fn format_number(value: f64, decimals: usize, fmt: &NumberFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = fixed_point(value.abs(), decimals);
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rounded.as_str(), None),
    };

    let mut out = String::with_capacity(rounded.len() + int_part.len() / 3 + 1);
    // a value that rounds to zero carries no sign
    if value < 0.0 && rounded.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    let len = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(&fmt.thousands_separator);
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push_str(&fmt.decimal_separator);
        out.push_str(frac);
    }
    out
}

/// Format a currency amount, e.g. `R$ 1.234,50`.
pub fn format_currency(value: f64, fmt: &NumberFormat) -> String {
    let number = format_number(value, fmt.decimals, fmt);
    if fmt.symbol.is_empty() {
        number
    } else {
        format!("{} {}", fmt.symbol, number)
    }
}

/// Format a quantity with the configured quantity precision.
pub fn format_quantity(value: f64, fmt: &NumberFormat) -> String {
    format_number(value, fmt.quantity_decimals, fmt)
}
