//! Error codes and response conventions of the KYC vendor.
//!
//! # Design
//! The vendor answers failures with a non-200 status and a
//! `{status_code, success, message}` body. The status picks the code; the
//! `message` refines it where one status covers several causes (403 is
//! either a plan restriction or an exhausted credit balance).

use connect_core::mapping::{envelope, ErrorRule, StatusMatch, VendorProfile};
use connect_core::ConnectError;
use serde_json::Value;

connect_core::error_codes! {
    /// Machine-readable failure codes of the KYC connect.
    pub enum KycErrorCode {
        InvalidToken => ("invalid_token", "KYC token was rejected (status {status_code})"),
        NotAllowed => ("not_allowed", "KYC account is not allowed to call {endpoint}"),
        InsufficientCredits => ("insufficient_credits", "KYC account has insufficient credits"),
        NotFound => ("not_found", "KYC endpoint {endpoint} not found"),
        VerificationFailed => ("verification_failed", "KYC verification failed on {endpoint}"),
        RateLimitExceeded => ("rate_limit_exceeded", "KYC rate limit exceeded"),
        ServiceUnavailable => ("service_unavailable", "KYC service unavailable on {endpoint}"),
        InvalidResponse => ("invalid_response", "KYC response from {endpoint} did not match the expected schema: {reason}"),
        InvalidInput => ("invalid_input", "invalid KYC input: {reason}"),
        InvalidConfiguration => ("invalid_configuration", "invalid KYC configuration: {reason}"),
        UnknownResponseError => ("unknown_response_error", "unknown KYC error"),
    }
    unknown = UnknownResponseError,
    invalid_response = InvalidResponse,
    unavailable = ServiceUnavailable,
    invalid_input = InvalidInput,
    invalid_configuration = InvalidConfiguration,
}

pub type KycError = ConnectError<KycErrorCode>;

static RULES: &[ErrorRule<KycErrorCode>] = &[
    ErrorRule::status(401, KycErrorCode::InvalidToken),
    ErrorRule::status(402, KycErrorCode::InsufficientCredits),
    ErrorRule::message(StatusMatch::Exact(403), "credit", KycErrorCode::InsufficientCredits),
    ErrorRule::status(403, KycErrorCode::NotAllowed),
    ErrorRule::status(404, KycErrorCode::NotFound),
    ErrorRule::status(422, KycErrorCode::VerificationFailed),
    ErrorRule::status(429, KycErrorCode::RateLimitExceeded),
    ErrorRule::range(500, 599, KycErrorCode::ServiceUnavailable),
];

/// The data record lives under `data`; bodies without it are the record.
fn payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn vendor_message(body: &Value) -> Option<String> {
    envelope::string_field(body, "message")
}

pub(crate) static PROFILE: VendorProfile<KycErrorCode> = VendorProfile {
    name: "kyc",
    success_status: 200,
    failure_in_body: envelope::never,
    payload,
    vendor_message,
    rules: RULES,
};
