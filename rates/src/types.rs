//! Response schemas of the exchange-rates vendor.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use connect_core::validate::check_pattern;
use connect_core::{Validate, ValidationError};
use serde::Deserialize;

use crate::input::CURRENCY;

/// Currency code to rate, sorted by code.
pub type RateTable = BTreeMap<String, f64>;

fn check_rate(field: &str, rate: f64) -> Result<(), ValidationError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::constraint(field, format!("rate {rate} is not a positive number")))
    }
}

fn check_table(rates: &RateTable) -> Result<(), ValidationError> {
    for (code, rate) in rates {
        check_pattern("rates", code, &CURRENCY)?;
        check_rate(&format!("rates.{code}"), *rate)?;
    }
    Ok(())
}

fn timestamp_to_utc(timestamp: Option<i64>) -> Option<DateTime<Utc>> {
    timestamp.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Latest or historical rates for one base currency.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rates {
    pub base: String,
    pub date: NaiveDate,
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub historical: bool,
    pub rates: RateTable,
}

impl Rates {
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.timestamp)
    }
}

impl Validate for Rates {
    fn validate(&self) -> Result<(), ValidationError> {
        check_pattern("base", &self.base, &CURRENCY)?;
        check_table(&self.rates)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversionQuery {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversionInfo {
    pub timestamp: Option<i64>,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Conversion {
    pub query: ConversionQuery,
    pub info: ConversionInfo,
    #[serde(default)]
    pub historical: bool,
    pub date: NaiveDate,
    pub result: f64,
}

impl Conversion {
    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.info.timestamp)
    }
}

impl Validate for Conversion {
    fn validate(&self) -> Result<(), ValidationError> {
        check_pattern("query.from", &self.query.from, &CURRENCY)?;
        check_pattern("query.to", &self.query.to, &CURRENCY)?;
        check_rate("info.rate", self.info.rate)?;
        if !self.result.is_finite() || self.result < 0.0 {
            return Err(ValidationError::constraint("result", "must be a non-negative number"));
        }
        Ok(())
    }
}

/// Daily rates between two dates, inclusive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeSeries {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base: String,
    pub rates: BTreeMap<NaiveDate, RateTable>,
}

impl Validate for TimeSeries {
    fn validate(&self) -> Result<(), ValidationError> {
        check_pattern("base", &self.base, &CURRENCY)?;
        if self.end_date < self.start_date {
            return Err(ValidationError::constraint("end_date", "precedes start_date"));
        }
        for (day, table) in &self.rates {
            if *day < self.start_date || *day > self.end_date {
                return Err(ValidationError::constraint(
                    "rates",
                    format!("day {day} is outside the requested range"),
                ));
            }
            check_table(table)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateChange {
    pub start_rate: f64,
    pub end_rate: f64,
    pub change: f64,
    pub change_pct: f64,
}

/// How each rate moved between two dates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fluctuation {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base: String,
    pub rates: BTreeMap<String, RateChange>,
}

impl Validate for Fluctuation {
    fn validate(&self) -> Result<(), ValidationError> {
        check_pattern("base", &self.base, &CURRENCY)?;
        for (code, change) in &self.rates {
            check_pattern("rates", code, &CURRENCY)?;
            check_rate(&format!("rates.{code}.start_rate"), change.start_rate)?;
            check_rate(&format!("rates.{code}.end_rate"), change.end_rate)?;
        }
        Ok(())
    }
}

/// Supported currency codes and their names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Symbols {
    pub symbols: BTreeMap<String, String>,
}

impl Validate for Symbols {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.symbols.is_empty() {
            return Err(ValidationError::constraint("symbols", "must not be empty"));
        }
        self.symbols
            .keys()
            .try_for_each(|code| check_pattern("symbols", code, &CURRENCY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_core::validate::validate_value;
    use serde_json::json;

    #[test]
    fn rates_parse_and_expose_timestamp() {
        let rates: Rates = validate_value(json!({
            "success": true,
            "timestamp": 1_700_000_000,
            "base": "EUR",
            "date": "2023-11-14",
            "rates": {"USD": 1.08, "GBP": 0.86}
        }))
        .unwrap();
        assert_eq!(rates.rate("USD"), Some(1.08));
        assert!(!rates.historical);
        assert_eq!(rates.as_of().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let err = validate_value::<Rates>(json!({
            "base": "EUR",
            "date": "2023-11-14",
            "rates": {"USD": 0}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("rates.USD"));
    }

    #[test]
    fn lowercase_base_is_rejected() {
        assert!(validate_value::<Rates>(json!({"base": "eur", "date": "2023-11-14", "rates": {}})).is_err());
    }

    #[test]
    fn time_series_days_must_fall_in_range() {
        let err = validate_value::<TimeSeries>(json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-02",
            "base": "EUR",
            "rates": {"2024-01-05": {"USD": 1.1}}
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Constraint { .. }));
    }

    #[test]
    fn time_series_keys_are_dates() {
        let series: TimeSeries = validate_value(json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-02",
            "base": "EUR",
            "rates": {"2024-01-01": {"USD": 1.1}, "2024-01-02": {"USD": 1.2}}
        }))
        .unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(series.rates[&first]["USD"], 1.1);
    }

    #[test]
    fn empty_symbol_list_is_rejected() {
        assert!(validate_value::<Symbols>(json!({"symbols": {}})).is_err());
    }
}
