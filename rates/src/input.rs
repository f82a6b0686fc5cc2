//! Caller-input normalization for the exchange-rates operations.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{RatesError, RatesErrorCode};

/// Longest range the vendor accepts for time-series and fluctuation.
pub const MAX_TIMEFRAME_DAYS: i64 = 365;

pub(crate) static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{3}$").unwrap_or_else(|error| panic!("currency regex failed to compile: {error}"))
});

fn invalid(reason: impl std::fmt::Display) -> RatesError {
    RatesError::with_reason(RatesErrorCode::InvalidInput, reason)
}

/// ISO 4217 style code: trimmed, uppercased, three letters.
pub fn currency(field: &str, raw: &str) -> Result<String, RatesError> {
    let code = raw.trim().to_ascii_uppercase();
    if CURRENCY.is_match(&code) {
        Ok(code)
    } else {
        Err(invalid(format!("{field} `{}` is not a three-letter currency code", raw.trim())))
    }
}

/// Normalize a symbol list. Blank entries are skipped and duplicates
/// removed, keeping first-seen order.
pub fn symbols<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, RatesError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        if entry.as_ref().trim().is_empty() {
            continue;
        }
        let code = currency("symbol", entry.as_ref())?;
        if !out.contains(&code) {
            out.push(code);
        }
    }
    Ok(out)
}

pub fn amount(value: f64) -> Result<f64, RatesError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("amount {value} must be a positive finite number")))
    }
}

/// `start..=end`, ordered and no longer than [`MAX_TIMEFRAME_DAYS`].
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(NaiveDate, NaiveDate), RatesError> {
    if end < start {
        return Err(invalid(format!("end date {end} precedes start date {start}")));
    }
    let days = (end - start).num_days();
    if days > MAX_TIMEFRAME_DAYS {
        return Err(invalid(format!(
            "time frame of {days} days exceeds {MAX_TIMEFRAME_DAYS} days"
        )));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn currency_is_uppercased() {
        assert_eq!(currency("from", " usd ").unwrap(), "USD");
    }

    #[test]
    fn currency_rejects_wrong_length_and_digits() {
        assert_eq!(currency("to", "EURO").unwrap_err().code(), RatesErrorCode::InvalidInput);
        assert!(currency("to", "E1R").is_err());
        assert!(currency("to", "").is_err());
    }

    #[test]
    fn symbols_skip_blanks_and_duplicates() {
        assert_eq!(symbols(&["usd", " ", "GBP", "Usd"]).unwrap(), vec!["USD", "GBP"]);
        assert!(symbols::<&str>(&[]).unwrap().is_empty());
        assert!(symbols(&["usd", "dollars"]).is_err());
    }

    #[test]
    fn amount_must_be_positive_and_finite() {
        assert_eq!(amount(100.0).unwrap(), 100.0);
        assert!(amount(0.0).is_err());
        assert!(amount(-1.0).is_err());
        assert!(amount(f64::NAN).is_err());
        assert!(amount(f64::INFINITY).is_err());
    }

    #[test]
    fn date_range_is_ordered_and_bounded() {
        assert!(date_range(day(2024, 1, 1), day(2024, 12, 31)).is_ok());
        assert!(date_range(day(2024, 1, 2), day(2024, 1, 1)).is_err());
        assert!(date_range(day(2023, 1, 1), day(2024, 1, 2)).is_err());
        assert!(date_range(day(2024, 1, 1), day(2024, 1, 1)).is_ok());
    }
}
