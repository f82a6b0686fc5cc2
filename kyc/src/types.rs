//! Request payloads and response schemas of the KYC vendor.
//!
//! # Design
//! Response types are the schema: required fields are plain fields, fields
//! the vendor may omit or null are `Option`, and extra fields are ignored.
//! `Validate` impls add the checks serde cannot express.

use chrono::NaiveDate;
use connect_core::validate::{check_not_empty, check_pattern, check_range};
use connect_core::{Validate, ValidationError};
use serde::{Deserialize, Serialize};

use crate::input::PAN;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub(crate) struct IdNumber<'a> {
    pub id_number: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BankRequest<'a> {
    pub id_number: &'a str,
    pub ifsc: &'a str,
    pub ifsc_details: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NameMatchRequest<'a> {
    pub name_1: &'a str,
    pub name_2: &'a str,
    pub name_type: NameKind,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubmitOtpRequest<'a> {
    pub client_id: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DrivingLicenseRequest<'a> {
    pub id_number: &'a str,
    pub dob: NaiveDate,
}

/// What kind of names are being compared; the vendor tunes its scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameKind {
    Person,
    Business,
}

// ---------------------------------------------------------------------------
// PAN
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanVerification {
    pub client_id: String,
    pub pan_number: String,
    pub pan_details: PanDetails,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanDetails {
    pub full_name: String,
    #[serde(default)]
    pub full_name_split: Vec<String>,
    pub masked_aadhaar: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub aadhaar_linked: Option<bool>,
    pub category: Option<PanCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanCategory {
    Person,
    Company,
    Firm,
    Trust,
    Huf,
    Government,
    #[serde(other)]
    Other,
}

impl Validate for PanVerification {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)?;
        check_pattern("pan_number", &self.pan_number, &PAN)?;
        check_not_empty("pan_details.full_name", &self.pan_details.full_name)
    }
}

// ---------------------------------------------------------------------------
// Bank account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BankVerification {
    pub client_id: String,
    pub account_exists: bool,
    pub full_name: Option<String>,
    pub upi_id: Option<String>,
    pub remarks: Option<String>,
    pub ifsc_details: Option<BankDetails>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BankDetails {
    pub ifsc: String,
    pub bank: String,
    pub branch: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub micr: Option<String>,
    #[serde(default)]
    pub imps: bool,
    #[serde(default)]
    pub neft: bool,
    #[serde(default)]
    pub rtgs: bool,
    #[serde(default)]
    pub upi: bool,
}

impl Validate for BankVerification {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)?;
        if self.account_exists {
            let name = self.full_name.as_deref().unwrap_or_default();
            check_not_empty("full_name", name)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Name matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NameMatch {
    pub client_id: String,
    pub name_1: String,
    pub name_2: String,
    pub match_score: f64,
    pub match_status: bool,
}

impl Validate for NameMatch {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)?;
        check_range("match_score", self.match_score, 0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// GSTIN
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GstinVerification {
    pub client_id: String,
    pub gstin: String,
    pub pan_number: Option<String>,
    pub business_name: String,
    pub legal_name: Option<String>,
    pub gstin_status: String,
    pub date_of_registration: Option<String>,
    pub constitution_of_business: Option<String>,
    pub taxpayer_type: Option<String>,
    pub address: Option<String>,
}

impl Validate for GstinVerification {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)?;
        if self.gstin.len() != 15 {
            return Err(ValidationError::constraint("gstin", "must be 15 characters"));
        }
        check_not_empty("business_name", &self.business_name)
    }
}

// ---------------------------------------------------------------------------
// Aadhaar OTP flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AadhaarOtp {
    pub client_id: String,
    pub otp_sent: bool,
    pub if_number: bool,
    pub valid_aadhaar: bool,
}

impl Validate for AadhaarOtp {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AadhaarDetails {
    pub client_id: String,
    pub full_name: String,
    pub aadhaar_number: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub address: Option<AadhaarAddress>,
    pub zip: Option<String>,
    pub care_of: Option<String>,
    pub share_code: Option<String>,
    #[serde(default)]
    pub mobile_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AadhaarAddress {
    pub country: Option<String>,
    pub dist: Option<String>,
    pub state: Option<String>,
    pub po: Option<String>,
    pub loc: Option<String>,
    pub vtc: Option<String>,
    pub subdist: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub landmark: Option<String>,
}

impl Validate for AadhaarDetails {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)?;
        check_not_empty("full_name", &self.full_name)
    }
}

// ---------------------------------------------------------------------------
// Driving licence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrivingLicense {
    pub client_id: String,
    pub license_number: String,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub state: Option<String>,
    /// Date of expiry.
    pub doe: Option<NaiveDate>,
    /// Date of issue.
    pub doi: Option<NaiveDate>,
    #[serde(default)]
    pub vehicle_classes: Vec<String>,
    pub permanent_address: Option<String>,
}

impl Validate for DrivingLicense {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("client_id", &self.client_id)?;
        check_not_empty("name", &self.name)?;
        match (self.doi, self.doe) {
            (Some(issued), Some(expires)) if expires < issued => Err(ValidationError::constraint(
                "doe",
                "expiry date precedes issue date",
            )),
            _ => Ok(()),
        }
    }
}
