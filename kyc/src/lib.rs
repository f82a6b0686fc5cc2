//! Typed client for a KYC verification vendor: PAN, bank account, name
//! matching, GSTIN, Aadhaar OTP and driving licence checks.
//!
//! # Design
//! The crate only describes the vendor. Request assembly, transport,
//! response validation and error mapping come from `connect-core`; this
//! crate supplies the endpoints, the input rules, the response schemas and
//! the error table.
//!
//! ```no_run
//! # async fn demo() -> Result<(), kyc_connect::KycError> {
//! use kyc_connect::{KycClient, KycConfig, NameKind};
//!
//! let client = KycClient::with_reqwest(KycConfig::from_env()?);
//! let result = client.compare_names("Ravi Sharma", "RAVI SHARMA", NameKind::Person).await?;
//! println!("score {}", result.match_score);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod types;

pub use client::KycClient;
pub use config::{KycConfig, KycEnvironment};
pub use error::{KycError, KycErrorCode};
pub use types::{
    AadhaarAddress, AadhaarDetails, AadhaarOtp, BankDetails, BankVerification, DrivingLicense,
    GstinVerification, NameKind, NameMatch, PanCategory, PanDetails, PanVerification,
};
