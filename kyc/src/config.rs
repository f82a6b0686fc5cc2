//! KYC connect configuration.

use std::time::Duration;

use connect_core::DEFAULT_TIMEOUT;
use url::Url;

use crate::error::{KycError, KycErrorCode};

pub const SANDBOX_URL: &str = "https://sandbox.surepass.io/api/v1";
pub const PRODUCTION_URL: &str = "https://kyc-api.surepass.io/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycEnvironment {
    Sandbox,
    Production,
    /// Any other deployment, e.g. a local emulator.
    Custom(String),
}

impl KycEnvironment {
    pub fn base_url(&self) -> &str {
        match self {
            KycEnvironment::Sandbox => SANDBOX_URL,
            KycEnvironment::Production => PRODUCTION_URL,
            KycEnvironment::Custom(url) => url,
        }
    }

    /// `sandbox`, `production`, or an absolute URL.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sandbox" => KycEnvironment::Sandbox,
            "production" | "prod" => KycEnvironment::Production,
            _ => KycEnvironment::Custom(raw.trim().to_string()),
        }
    }
}

/// Immutable settings for one `KycClient`.
#[derive(Debug, Clone)]
pub struct KycConfig {
    environment: KycEnvironment,
    token: String,
    timeout: Duration,
}

impl KycConfig {
    /// Validates the token and base URL before any request is made.
    pub fn new(environment: KycEnvironment, token: &str) -> Result<Self, KycError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(KycError::with_reason(
                KycErrorCode::InvalidConfiguration,
                "token must not be empty",
            ));
        }
        let base = environment.base_url();
        let parsed = Url::parse(base).map_err(|e| {
            KycError::with_reason(
                KycErrorCode::InvalidConfiguration,
                format!("base URL `{base}` is invalid: {e}"),
            )
            .with_cause(e)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(KycError::with_reason(
                KycErrorCode::InvalidConfiguration,
                format!("base URL `{base}` must use http or https"),
            ));
        }
        Ok(Self {
            environment,
            token: token.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `KYC_TOKEN`, `KYC_ENVIRONMENT` (default sandbox) and
    /// `KYC_TIMEOUT_SECS` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KycError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("KYC_TOKEN").ok_or_else(|| {
            KycError::with_reason(KycErrorCode::InvalidConfiguration, "KYC_TOKEN is not set")
        })?;
        let environment = lookup("KYC_ENVIRONMENT")
            .map(|raw| KycEnvironment::parse(&raw))
            .unwrap_or(KycEnvironment::Sandbox);
        let config = Self::new(environment, &token)?;
        tracing::debug!(base_url = config.base_url(), "loaded KYC configuration");
        match lookup("KYC_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        KycError::with_reason(
                            KycErrorCode::InvalidConfiguration,
                            format!("KYC_TIMEOUT_SECS `{raw}` is not a positive whole number of seconds"),
                        )
                    })?;
                Ok(config.with_timeout(Duration::from_secs(secs)))
            }
            None => Ok(config),
        }
    }

    pub fn from_env() -> Result<Self, KycError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn environment(&self) -> &KycEnvironment {
        &self.environment
    }

    pub fn base_url(&self) -> &str {
        self.environment.base_url()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
