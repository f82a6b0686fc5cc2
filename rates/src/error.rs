//! Error codes and response conventions of the exchange-rates vendor.
//!
//! # Design
//! The vendor reports many failures with HTTP 200 and `success: false`, so
//! the status alone is not enough. The error `type` string (for example
//! `invalid_base_currency`) is the vendor message and most rules match on
//! it regardless of status; status-only rules catch bodies without one.

use connect_core::mapping::{ErrorRule, StatusMatch, VendorProfile};
use connect_core::ConnectError;
use serde_json::Value;

connect_core::error_codes! {
    /// Machine-readable failure codes of the exchange-rates connect.
    pub enum RatesErrorCode {
        InvalidApiKey => ("invalid_api_key", "exchange-rates API key was rejected (status {status_code})"),
        FunctionAccessRestricted => ("function_access_restricted", "exchange-rates plan does not include {endpoint}"),
        NotFound => ("not_found", "exchange-rates endpoint {endpoint} not found"),
        RateLimitExceeded => ("rate_limit_exceeded", "exchange-rates usage limit reached"),
        InvalidBaseCurrency => ("invalid_base_currency", "exchange-rates vendor rejected the base currency"),
        InvalidCurrencyCodes => ("invalid_currency_codes", "exchange-rates vendor rejected one or more currency codes"),
        InvalidDate => ("invalid_date", "exchange-rates vendor rejected the date on {endpoint}"),
        InvalidAmount => ("invalid_amount", "exchange-rates vendor rejected the conversion amount"),
        InvalidTimeframe => ("invalid_timeframe", "exchange-rates vendor rejected the time frame on {endpoint}"),
        ServiceUnavailable => ("service_unavailable", "exchange-rates service unavailable on {endpoint}"),
        InvalidResponse => ("invalid_response", "exchange-rates response from {endpoint} did not match the expected schema: {reason}"),
        InvalidInput => ("invalid_input", "invalid exchange-rates input: {reason}"),
        InvalidConfiguration => ("invalid_configuration", "invalid exchange-rates configuration: {reason}"),
        UnknownError => ("unknown_error", "unknown exchange-rates error"),
    }
    unknown = UnknownError,
    invalid_response = InvalidResponse,
    unavailable = ServiceUnavailable,
    invalid_input = InvalidInput,
    invalid_configuration = InvalidConfiguration,
}

pub type RatesError = ConnectError<RatesErrorCode>;

const ANY: StatusMatch = StatusMatch::Any;

static RULES: &[ErrorRule<RatesErrorCode>] = &[
    ErrorRule::message(ANY, "access_key", RatesErrorCode::InvalidApiKey),
    ErrorRule::message(ANY, "inactive_user", RatesErrorCode::InvalidApiKey),
    ErrorRule::message(ANY, "function_access_restricted", RatesErrorCode::FunctionAccessRestricted),
    ErrorRule::message(ANY, "base_currency_access_restricted", RatesErrorCode::FunctionAccessRestricted),
    ErrorRule::message(ANY, "usage_limit_reached", RatesErrorCode::RateLimitExceeded),
    ErrorRule::message(ANY, "rate_limit", RatesErrorCode::RateLimitExceeded),
    ErrorRule::message(ANY, "invalid_base_currency", RatesErrorCode::InvalidBaseCurrency),
    ErrorRule::message(ANY, "invalid_currency_codes", RatesErrorCode::InvalidCurrencyCodes),
    ErrorRule::message(ANY, "invalid_conversion_amount", RatesErrorCode::InvalidAmount),
    ErrorRule::message(ANY, "time_frame", RatesErrorCode::InvalidTimeframe),
    ErrorRule::message(ANY, "timeframe", RatesErrorCode::InvalidTimeframe),
    ErrorRule::message(ANY, "date", RatesErrorCode::InvalidDate),
    ErrorRule::message(ANY, "404_not_found", RatesErrorCode::NotFound),
    ErrorRule::status(401, RatesErrorCode::InvalidApiKey),
    ErrorRule::status(403, RatesErrorCode::FunctionAccessRestricted),
    ErrorRule::status(404, RatesErrorCode::NotFound),
    ErrorRule::status(429, RatesErrorCode::RateLimitExceeded),
    ErrorRule::range(500, 599, RatesErrorCode::ServiceUnavailable),
];

/// `success: false` or an `error` object marks a failure on any status.
fn failure_in_body(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false) || body.get("error").is_some()
}

/// Success bodies carry the record at the top level.
fn payload(body: Value) -> Value {
    body
}

/// The error `type`, falling back to the numeric code.
fn vendor_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.get("code").map(Value::to_string))
}

pub(crate) static PROFILE: VendorProfile<RatesErrorCode> = VendorProfile {
    name: "rates",
    success_status: 200,
    failure_in_body,
    payload,
    vendor_message,
    rules: RULES,
};

#[cfg(test)]
mod tests {
    use super::*;
    use connect_core::mapping::{lookup, map_failure};
    use connect_core::HttpResponse;
    use serde_json::json;

    #[test]
    fn error_type_wins_over_status() {
        assert_eq!(
            lookup(&PROFILE, 200, Some("invalid_base_currency")),
            RatesErrorCode::InvalidBaseCurrency
        );
        assert_eq!(
            lookup(&PROFILE, 200, Some("function_access_restricted")),
            RatesErrorCode::FunctionAccessRestricted
        );
        assert_eq!(lookup(&PROFILE, 401, Some("missing_access_key")), RatesErrorCode::InvalidApiKey);
        assert_eq!(lookup(&PROFILE, 200, Some("invalid_time_frame")), RatesErrorCode::InvalidTimeframe);
        assert_eq!(lookup(&PROFILE, 200, Some("invalid_start_date")), RatesErrorCode::InvalidDate);
    }

    #[test]
    fn status_rules_cover_bodies_without_type() {
        assert_eq!(lookup(&PROFILE, 429, None), RatesErrorCode::RateLimitExceeded);
        assert_eq!(lookup(&PROFILE, 502, None), RatesErrorCode::ServiceUnavailable);
        assert_eq!(lookup(&PROFILE, 200, None), RatesErrorCode::UnknownError);
    }

    #[test]
    fn success_false_is_failure_even_with_200() {
        assert!(failure_in_body(&json!({"success": false, "error": {"code": 201}})));
        assert!(!failure_in_body(&json!({"success": true, "rates": {}})));
    }

    #[test]
    fn numeric_code_is_used_when_type_is_missing() {
        let response = HttpResponse::new(200, json!({"success": false, "error": {"code": 105}}));
        let err = map_failure(&PROFILE, &response, "/convert");
        assert_eq!(err.metadata()["vendor_message"], json!("105"));
        assert_eq!(err.code(), RatesErrorCode::UnknownError);
    }
}
