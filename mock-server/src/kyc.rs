//! KYC vendor emulation.
//!
//! Every response uses the vendor envelope
//! `{data, status_code, success, message, message_code}`. Tokens select
//! account-level failures; specific document numbers select success.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

pub const TOKEN: &str = "test-token";
pub const TOKEN_NO_CREDITS: &str = "no-credits";
pub const TOKEN_RATE_LIMITED: &str = "rate-limited";
pub const TOKEN_BROKEN: &str = "broken";

pub const VALID_PAN: &str = "ABCDE1234F";
pub const VALID_ACCOUNT: &str = "1234567890";
pub const VALID_IFSC: &str = "SBIN0000001";
pub const VALID_GSTIN: &str = "27AAPFU0939F1ZV";
pub const VALID_AADHAAR: &str = "234567890123";
pub const VALID_OTP: &str = "123456";
pub const VALID_LICENSE: &str = "MH0320080022135";
pub const VALID_LICENSE_DOB: &str = "1990-01-01";

pub fn router() -> Router {
    Router::new()
        .route("/pan/pan-comprehensive", post(pan))
        .route("/bank-verification/", post(bank))
        .route("/utils/name-matching/", post(name_matching))
        .route("/corporate/gstin", post(gstin))
        .route("/aadhaar-v2/generate-otp", post(aadhaar_generate))
        .route("/aadhaar-v2/submit-otp", post(aadhaar_submit))
        .route("/driving-license/driving-license", post(driving_license))
}

fn client_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn ok(data: Value) -> Response {
    Json(json!({
        "data": data,
        "status_code": 200,
        "success": true,
        "message": null,
        "message_code": "success"
    }))
    .into_response()
}

fn fail(status: StatusCode, message: &str, message_code: &str) -> Response {
    (
        status,
        Json(json!({
            "data": null,
            "status_code": status.as_u16(),
            "success": false,
            "message": message,
            "message_code": message_code
        })),
    )
        .into_response()
}

/// Reject the request unless it carries a usable bearer token.
fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(TOKEN) => Ok(()),
        Some(TOKEN_NO_CREDITS) => Err(fail(
            StatusCode::FORBIDDEN,
            "Insufficient credits",
            "insufficient_credits",
        )),
        Some(TOKEN_RATE_LIMITED) => Err(fail(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded",
            "rate_limit_exceeded",
        )),
        Some(TOKEN_BROKEN) => Err((StatusCode::INTERNAL_SERVER_ERROR, "upstream crashed").into_response()),
        _ => Err(fail(StatusCode::UNAUTHORIZED, "Invalid token", "invalid_token")),
    }
}

/// Union of the request fields the emulated endpoints read. Absent fields
/// are empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerificationRequest {
    pub id_number: String,
    pub ifsc: String,
    pub name_1: String,
    pub name_2: String,
    pub client_id: String,
    pub otp: String,
    pub dob: String,
}

fn verification_failed(message: &str) -> Response {
    fail(StatusCode::UNPROCESSABLE_ENTITY, message, "verification_failed")
}

async fn pan(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let pan = body.id_number.as_str();
    if pan != VALID_PAN {
        return verification_failed("Invalid PAN");
    }
    ok(json!({
        "client_id": client_id("pan_comprehensive"),
        "pan_number": pan,
        "pan_details": {
            "full_name": "RAVI KUMAR SHARMA",
            "full_name_split": ["RAVI", "KUMAR", "SHARMA"],
            "masked_aadhaar": "XXXXXXXX9012",
            "gender": "M",
            "dob": "1990-01-01",
            "aadhaar_linked": true,
            "category": "person"
        }
    }))
}

async fn bank(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let account = body.id_number.as_str();
    let ifsc = body.ifsc.as_str();
    let exists = account == VALID_ACCOUNT && ifsc == VALID_IFSC;
    ok(json!({
        "client_id": client_id("bank_validation"),
        "account_exists": exists,
        "upi_id": null,
        "full_name": if exists { "RAVI KUMAR SHARMA" } else { "" },
        "remarks": null,
        "ifsc_details": {
            "ifsc": ifsc,
            "bank": "State Bank of India",
            "branch": "MUMBAI MAIN",
            "city": "MUMBAI",
            "state": "MAHARASHTRA",
            "micr": "400002000",
            "imps": true,
            "neft": true,
            "rtgs": true,
            "upi": true
        }
    }))
}

/// Token-overlap score in `[0, 1]`, case-insensitive.
fn name_score(a: &str, b: &str) -> f64 {
    let left: Vec<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let right: Vec<String> = b.split_whitespace().map(str::to_lowercase).collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.iter().filter(|t| right.contains(t)).count();
    shared as f64 / left.len().max(right.len()) as f64
}

async fn name_matching(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let name_1 = body.name_1.as_str();
    let name_2 = body.name_2.as_str();
    if name_1.is_empty() || name_2.is_empty() {
        return verification_failed("Both names are required");
    }
    let score = name_score(name_1, name_2);
    ok(json!({
        "client_id": client_id("name_matching"),
        "name_1": name_1,
        "name_2": name_2,
        "match_score": score,
        "match_status": score >= 0.8
    }))
}

async fn gstin(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let gstin = body.id_number.as_str();
    if gstin != VALID_GSTIN {
        return verification_failed("Invalid GSTIN");
    }
    ok(json!({
        "client_id": client_id("corporate_gstin"),
        "gstin": gstin,
        "pan_number": "AAPFU0939F",
        "business_name": "UNIVERSAL TRADERS",
        "legal_name": "UNIVERSAL TRADERS LLP",
        "gstin_status": "Active",
        "date_of_registration": "2017-07-01",
        "constitution_of_business": "Limited Liability Partnership",
        "taxpayer_type": "Regular",
        "address": "12 MARINE DRIVE, MUMBAI, MAHARASHTRA"
    }))
}

async fn aadhaar_generate(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let aadhaar = body.id_number.as_str();
    if aadhaar != VALID_AADHAAR {
        return verification_failed("Invalid Aadhaar Number");
    }
    ok(json!({
        "client_id": client_id("aadhaar_v2"),
        "otp_sent": true,
        "if_number": true,
        "valid_aadhaar": true
    }))
}

async fn aadhaar_submit(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    if body.otp != VALID_OTP {
        return verification_failed("Invalid OTP");
    }
    ok(json!({
        "client_id": body.client_id,
        "full_name": "Ravi Kumar Sharma",
        "aadhaar_number": VALID_AADHAAR,
        "dob": "1990-01-01",
        "gender": "M",
        "address": {
            "country": "India",
            "dist": "Mumbai",
            "state": "Maharashtra",
            "po": "Fort",
            "loc": "Marine Drive",
            "vtc": "Mumbai",
            "subdist": "Mumbai",
            "street": "Marine Drive",
            "house": "12",
            "landmark": ""
        },
        "zip": "400001",
        "care_of": "S/O Mohan Sharma",
        "share_code": "1234",
        "mobile_verified": true
    }))
}

async fn driving_license(headers: HeaderMap, Json(body): Json<VerificationRequest>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    if body.id_number != VALID_LICENSE || body.dob != VALID_LICENSE_DOB {
        return verification_failed("Invalid Driving License");
    }
    ok(json!({
        "client_id": client_id("driving_license"),
        "license_number": VALID_LICENSE,
        "name": "RAVI KUMAR SHARMA",
        "dob": VALID_LICENSE_DOB,
        "state": "Maharashtra",
        "doe": "2030-01-01",
        "doi": "2008-01-01",
        "vehicle_classes": ["MCWG", "LMV"],
        "permanent_address": "12 MARINE DRIVE, MUMBAI"
    }))
}
