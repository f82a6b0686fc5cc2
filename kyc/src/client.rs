//! KYC verification client.
//!
//! # Design
//! Every operation is split into a `build_*` method that normalizes input
//! and produces an `HttpRequest`, and a `parse_*` method that turns an
//! `HttpResponse` into a validated record or a `KycError`. The async
//! methods join the two halves through the configured [`Transport`], so
//! callers that execute HTTP themselves can use the halves directly.

use chrono::NaiveDate;
use connect_core::mapping::{call, interpret};
use connect_core::{HttpRequest, HttpResponse, RequestBuilder, ReqwestTransport, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::KycConfig;
use crate::error::{KycError, KycErrorCode, PROFILE};
use crate::input;
use crate::types::{
    AadhaarDetails, AadhaarOtp, BankRequest, BankVerification, DrivingLicense,
    DrivingLicenseRequest, GstinVerification, IdNumber, NameKind, NameMatch, NameMatchRequest,
    PanVerification, SubmitOtpRequest,
};

pub const PAN_PATH: &str = "/pan/pan-comprehensive";
pub const BANK_PATH: &str = "/bank-verification/";
pub const NAME_MATCH_PATH: &str = "/utils/name-matching/";
pub const GSTIN_PATH: &str = "/corporate/gstin";
pub const AADHAAR_GENERATE_PATH: &str = "/aadhaar-v2/generate-otp";
pub const AADHAAR_SUBMIT_PATH: &str = "/aadhaar-v2/submit-otp";
pub const DRIVING_LICENSE_PATH: &str = "/driving-license/driving-license";

/// Client for the KYC vendor. Holds no mutable state between calls.
#[derive(Debug, Clone)]
pub struct KycClient<T = ReqwestTransport> {
    config: KycConfig,
    transport: T,
}

impl KycClient<ReqwestTransport> {
    /// Client backed by a fresh `reqwest` transport.
    pub fn with_reqwest(config: KycConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> KycClient<T> {
    pub fn new(config: KycConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &KycConfig {
        &self.config
    }

    fn post<P: Serialize>(&self, path: &str, payload: &P) -> Result<HttpRequest, KycError> {
        let request = RequestBuilder::post(self.config.base_url(), path)
            .bearer(self.config.token())
            .timeout(self.config.timeout())
            .json(payload)
            .map_err(|e| KycError::with_reason(KycErrorCode::InvalidInput, &e).with_cause(e))?;
        Ok(request.build())
    }

    async fn execute<R>(&self, request: HttpRequest) -> Result<R, KycError>
    where
        R: DeserializeOwned + connect_core::Validate,
    {
        call(&self.transport, &PROFILE, request).await
    }

    // -- PAN ---------------------------------------------------------------

    pub fn build_verify_pan(&self, pan: &str) -> Result<HttpRequest, KycError> {
        let pan = input::pan(pan)?;
        self.post(PAN_PATH, &IdNumber { id_number: &pan })
    }

    pub fn parse_verify_pan(&self, response: HttpResponse) -> Result<PanVerification, KycError> {
        interpret(&PROFILE, PAN_PATH, response)
    }

    /// Comprehensive PAN lookup: holder name, category and Aadhaar linkage.
    pub async fn verify_pan(&self, pan: &str) -> Result<PanVerification, KycError> {
        let request = self
            .build_verify_pan(pan)
            .map_err(|e| e.annotate("endpoint", PAN_PATH))?;
        self.execute(request).await
    }

    // -- Bank account ------------------------------------------------------

    pub fn build_verify_bank_account(&self, account: &str, ifsc: &str) -> Result<HttpRequest, KycError> {
        let account = input::account_number(account)?;
        let ifsc = input::ifsc(ifsc)?;
        self.post(
            BANK_PATH,
            &BankRequest {
                id_number: &account,
                ifsc: &ifsc,
                ifsc_details: true,
            },
        )
    }

    pub fn parse_verify_bank_account(&self, response: HttpResponse) -> Result<BankVerification, KycError> {
        interpret(&PROFILE, BANK_PATH, response)
    }

    /// Penny-less account check. A non-existent account is a successful
    /// response with `account_exists == false`, not an error.
    pub async fn verify_bank_account(&self, account: &str, ifsc: &str) -> Result<BankVerification, KycError> {
        let request = self
            .build_verify_bank_account(account, ifsc)
            .map_err(|e| e.annotate("endpoint", BANK_PATH))?;
        self.execute(request).await
    }

    // -- Name matching -----------------------------------------------------

    pub fn build_compare_names(&self, name_1: &str, name_2: &str, kind: NameKind) -> Result<HttpRequest, KycError> {
        let name_1 = input::text("name_1", name_1)?;
        let name_2 = input::text("name_2", name_2)?;
        self.post(
            NAME_MATCH_PATH,
            &NameMatchRequest {
                name_1: &name_1,
                name_2: &name_2,
                name_type: kind,
            },
        )
    }

    pub fn parse_compare_names(&self, response: HttpResponse) -> Result<NameMatch, KycError> {
        interpret(&PROFILE, NAME_MATCH_PATH, response)
    }

    pub async fn compare_names(&self, name_1: &str, name_2: &str, kind: NameKind) -> Result<NameMatch, KycError> {
        let request = self
            .build_compare_names(name_1, name_2, kind)
            .map_err(|e| e.annotate("endpoint", NAME_MATCH_PATH))?;
        self.execute(request).await
    }

    // -- GSTIN -------------------------------------------------------------

    pub fn build_verify_gstin(&self, gstin: &str) -> Result<HttpRequest, KycError> {
        let gstin = input::gstin(gstin)?;
        self.post(GSTIN_PATH, &IdNumber { id_number: &gstin })
    }

    pub fn parse_verify_gstin(&self, response: HttpResponse) -> Result<GstinVerification, KycError> {
        interpret(&PROFILE, GSTIN_PATH, response)
    }

    pub async fn verify_gstin(&self, gstin: &str) -> Result<GstinVerification, KycError> {
        let request = self
            .build_verify_gstin(gstin)
            .map_err(|e| e.annotate("endpoint", GSTIN_PATH))?;
        self.execute(request).await
    }

    // -- Aadhaar -----------------------------------------------------------

    pub fn build_generate_aadhaar_otp(&self, aadhaar: &str) -> Result<HttpRequest, KycError> {
        let aadhaar = input::aadhaar(aadhaar)?;
        self.post(AADHAAR_GENERATE_PATH, &IdNumber { id_number: &aadhaar })
    }

    pub fn parse_generate_aadhaar_otp(&self, response: HttpResponse) -> Result<AadhaarOtp, KycError> {
        interpret(&PROFILE, AADHAAR_GENERATE_PATH, response)
    }

    /// First step of the Aadhaar flow. The returned `client_id` must be
    /// passed to [`submit_aadhaar_otp`](Self::submit_aadhaar_otp).
    pub async fn generate_aadhaar_otp(&self, aadhaar: &str) -> Result<AadhaarOtp, KycError> {
        let request = self
            .build_generate_aadhaar_otp(aadhaar)
            .map_err(|e| e.annotate("endpoint", AADHAAR_GENERATE_PATH))?;
        self.execute(request).await
    }

    pub fn build_submit_aadhaar_otp(&self, client_id: &str, otp: &str) -> Result<HttpRequest, KycError> {
        let client_id = input::text("client_id", client_id)?;
        let otp = input::otp(otp)?;
        self.post(
            AADHAAR_SUBMIT_PATH,
            &SubmitOtpRequest {
                client_id: &client_id,
                otp: &otp,
            },
        )
    }

    pub fn parse_submit_aadhaar_otp(&self, response: HttpResponse) -> Result<AadhaarDetails, KycError> {
        interpret(&PROFILE, AADHAAR_SUBMIT_PATH, response)
    }

    pub async fn submit_aadhaar_otp(&self, client_id: &str, otp: &str) -> Result<AadhaarDetails, KycError> {
        let request = self
            .build_submit_aadhaar_otp(client_id, otp)
            .map_err(|e| e.annotate("endpoint", AADHAAR_SUBMIT_PATH))?;
        self.execute(request).await
    }

    // -- Driving licence ---------------------------------------------------

    pub fn build_verify_driving_license(&self, number: &str, dob: NaiveDate) -> Result<HttpRequest, KycError> {
        let number = input::driving_license(number)?;
        self.post(
            DRIVING_LICENSE_PATH,
            &DrivingLicenseRequest {
                id_number: &number,
                dob,
            },
        )
    }

    pub fn parse_verify_driving_license(&self, response: HttpResponse) -> Result<DrivingLicense, KycError> {
        interpret(&PROFILE, DRIVING_LICENSE_PATH, response)
    }

    pub async fn verify_driving_license(&self, number: &str, dob: NaiveDate) -> Result<DrivingLicense, KycError> {
        let request = self
            .build_verify_driving_license(number, dob)
            .map_err(|e| e.annotate("endpoint", DRIVING_LICENSE_PATH))?;
        self.execute(request).await
    }
}
