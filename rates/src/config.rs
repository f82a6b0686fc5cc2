//! Exchange-rates connect configuration.

use std::time::Duration;

use connect_core::DEFAULT_TIMEOUT;
use url::Url;

use crate::error::{RatesError, RatesErrorCode};

pub const PRODUCTION_URL: &str = "https://api.exchangeratesapi.io/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatesEnvironment {
    Production,
    Custom(String),
}

impl RatesEnvironment {
    pub fn base_url(&self) -> &str {
        match self {
            RatesEnvironment::Production => PRODUCTION_URL,
            RatesEnvironment::Custom(url) => url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatesConfig {
    environment: RatesEnvironment,
    api_key: String,
    timeout: Duration,
}

fn invalid(reason: impl std::fmt::Display) -> RatesError {
    RatesError::with_reason(RatesErrorCode::InvalidConfiguration, reason)
}

impl RatesConfig {
    pub fn new(environment: RatesEnvironment, api_key: &str) -> Result<Self, RatesError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(invalid("API key must not be empty"));
        }
        let base = environment.base_url();
        let parsed = Url::parse(base)
            .map_err(|e| invalid(format!("base URL `{base}` is invalid: {e}")).with_cause(e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("base URL `{base}` must use http or https")));
        }
        Ok(Self {
            environment,
            api_key: api_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `RATES_API_KEY`, `RATES_BASE_URL` (default production) and
    /// `RATES_TIMEOUT_SECS` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RatesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("RATES_API_KEY").ok_or_else(|| invalid("RATES_API_KEY is not set"))?;
        let environment = match lookup("RATES_BASE_URL") {
            Some(url) if !url.trim().is_empty() => RatesEnvironment::Custom(url.trim().to_string()),
            _ => RatesEnvironment::Production,
        };
        let mut config = Self::new(environment, &api_key)?;
        if let Some(raw) = lookup("RATES_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid(format!("RATES_TIMEOUT_SECS `{raw}` is not a positive whole number of seconds")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        tracing::debug!(base_url = config.base_url(), timeout = ?config.timeout, "loaded exchange-rates configuration");
        Ok(config)
    }

    pub fn from_env() -> Result<Self, RatesError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn environment(&self) -> &RatesEnvironment {
        &self.environment
    }

    pub fn base_url(&self) -> &str {
        self.environment.base_url()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
