//! Caller-input normalization for every KYC operation.
//!
//! All trimming, case-folding and format checks happen here, before a
//! request is built. A rejected input never reaches the vendor.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{KycError, KycErrorCode};

pub(crate) static PAN: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z]{5}[0-9]{4}[A-Z]$"));
static IFSC: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z]{4}0[A-Z0-9]{6}$"));
static ACCOUNT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{6,18}$"));
static GSTIN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$"));
static AADHAAR: LazyLock<Regex> = LazyLock::new(|| compile(r"^[2-9][0-9]{11}$"));
static OTP: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{6}$"));
static LICENSE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z]{2}[0-9A-Z-]{8,16}$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("input regex `{pattern}` failed to compile: {error}"))
}

fn invalid(field: &str, value: &str, expected: &str) -> KycError {
    KycError::with_reason(
        KycErrorCode::InvalidInput,
        format!("{field} `{value}` is not {expected}"),
    )
}

fn upper_matching(field: &str, raw: &str, pattern: &Regex, expected: &str) -> Result<String, KycError> {
    let value = raw.trim().to_ascii_uppercase();
    if pattern.is_match(&value) {
        Ok(value)
    } else {
        Err(invalid(field, raw.trim(), expected))
    }
}

pub fn pan(raw: &str) -> Result<String, KycError> {
    upper_matching("PAN", raw, &PAN, "a valid PAN (e.g. ABCDE1234F)")
}

pub fn ifsc(raw: &str) -> Result<String, KycError> {
    upper_matching("IFSC", raw, &IFSC, "a valid IFSC (e.g. SBIN0000001)")
}

pub fn account_number(raw: &str) -> Result<String, KycError> {
    let value = raw.trim();
    if ACCOUNT.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(invalid("account number", value, "6 to 18 digits"))
    }
}

pub fn gstin(raw: &str) -> Result<String, KycError> {
    upper_matching("GSTIN", raw, &GSTIN, "a valid 15-character GSTIN")
}

/// Aadhaar numbers are often written in groups of four; spaces are dropped.
pub fn aadhaar(raw: &str) -> Result<String, KycError> {
    let value: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if AADHAAR.is_match(&value) {
        Ok(value)
    } else {
        Err(invalid("Aadhaar number", raw.trim(), "12 digits"))
    }
}

pub fn otp(raw: &str) -> Result<String, KycError> {
    let value = raw.trim();
    if OTP.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(invalid("OTP", value, "6 digits"))
    }
}

pub fn driving_license(raw: &str) -> Result<String, KycError> {
    let value: String = raw
        .trim()
        .to_ascii_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if LICENSE.is_match(&value) {
        Ok(value)
    } else {
        Err(invalid("driving licence number", raw.trim(), "a valid licence number"))
    }
}

/// Free-text fields (names, client ids): trimmed, inner whitespace collapsed.
pub fn text(field: &str, raw: &str) -> Result<String, KycError> {
    let value = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        Err(KycError::with_reason(
            KycErrorCode::InvalidInput,
            format!("{field} must not be empty"),
        ))
    } else {
        Ok(value)
    }
}
