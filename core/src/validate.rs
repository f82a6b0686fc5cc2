//! Response validation.
//!
//! # Design
//! A response schema is a serde type: required fields are plain fields,
//! optional ones are `Option`, enumerated value sets are enums, and unknown
//! fields are ignored. Constraints serde cannot express (patterns, ranges)
//! live in a [`Validate`] impl. [`validate_value`] runs both passes and
//! returns either the whole typed value or an error; there is no partial
//! result.

use std::fmt::Display;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response does not match schema: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("field `{field}` {reason}")]
    Constraint { field: String, reason: String },
}

impl ValidationError {
    pub fn constraint(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::Constraint {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Field-level constraints checked after a value has deserialized.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.as_ref().map_or(Ok(()), Validate::validate)
    }
}

impl Validate for () {}
impl Validate for bool {}
impl Validate for u64 {}
impl Validate for String {}
impl Validate for Value {}

/// Deserialize `value` into `T` and check its constraints.
pub fn validate_value<T>(value: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(value)?;
    parsed.validate()?;
    Ok(parsed)
}

pub fn check_pattern(field: &str, value: &str, pattern: &Regex) -> Result<(), ValidationError> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::constraint(
            field,
            format!("value `{value}` does not match {}", pattern.as_str()),
        ))
    }
}

pub fn check_range<N>(field: &str, value: N, min: N, max: N) -> Result<(), ValidationError>
where
    N: PartialOrd + Display + Copy,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::constraint(
            field,
            format!("value {value} is outside {min}..={max}"),
        ))
    }
}

pub fn check_not_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::constraint(field, "must not be empty"))
    } else {
        Ok(())
    }
}
