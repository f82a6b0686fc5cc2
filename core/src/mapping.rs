//! Status/error mapping and the shared call pipeline.
//!
//! # Design
//! Each vendor describes itself once as a `VendorProfile`: how to tell a
//! failure from a success, where the data record sits inside the envelope,
//! where the vendor puts its error message, and a static table of
//! `ErrorRule`s. [`interpret`] is the only place that branches on a
//! response, so every connect shares the same control flow:
//!
//! ```text
//! success status, no in-body failure -> payload -> validate -> Ok(T)
//! anything else                      -> first matching rule  -> Err(code)
//!                                       no rule matches      -> Err(UNKNOWN)
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{metadata, ConnectError, ErrorCode, Metadata};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::validate::{validate_value, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatch {
    Exact(u16),
    /// Inclusive range.
    Range(u16, u16),
    Any,
}

impl StatusMatch {
    pub fn matches(self, status: u16) -> bool {
        match self {
            StatusMatch::Exact(expected) => status == expected,
            StatusMatch::Range(lo, hi) => (lo..=hi).contains(&status),
            StatusMatch::Any => true,
        }
    }
}

/// One row of a vendor's error table.
///
/// `message`, when set, must appear (case-insensitively) in the vendor's
/// error message for the rule to apply.
#[derive(Debug, Clone, Copy)]
pub struct ErrorRule<C> {
    pub status: StatusMatch,
    pub message: Option<&'static str>,
    pub code: C,
}

impl<C: ErrorCode> ErrorRule<C> {
    pub const fn status(status: u16, code: C) -> Self {
        Self {
            status: StatusMatch::Exact(status),
            message: None,
            code,
        }
    }

    pub const fn range(lo: u16, hi: u16, code: C) -> Self {
        Self {
            status: StatusMatch::Range(lo, hi),
            message: None,
            code,
        }
    }

    pub const fn message(status: StatusMatch, message: &'static str, code: C) -> Self {
        Self {
            status,
            message: Some(message),
            code,
        }
    }

    fn matches(&self, status: u16, vendor_message: Option<&str>) -> bool {
        if !self.status.matches(status) {
            return false;
        }
        match (self.message, vendor_message) {
            (None, _) => true,
            (Some(needle), Some(haystack)) => haystack
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            (Some(_), None) => false,
        }
    }
}

/// Declarative description of one vendor's response conventions.
pub struct VendorProfile<C: 'static> {
    pub name: &'static str,
    pub success_status: u16,
    /// Detects failures reported inside a success-status body.
    pub failure_in_body: fn(&Value) -> bool,
    /// Extracts the data record from the success envelope.
    pub payload: fn(Value) -> Value,
    /// Extracts the vendor's error message or code from a failure body.
    pub vendor_message: fn(&Value) -> Option<String>,
    pub rules: &'static [ErrorRule<C>],
}

/// Look up the domain code for a failed response.
pub fn lookup<C: ErrorCode>(profile: &VendorProfile<C>, status: u16, vendor_message: Option<&str>) -> C {
    profile
        .rules
        .iter()
        .find(|rule| rule.matches(status, vendor_message))
        .map_or(C::UNKNOWN, |rule| rule.code)
}

/// Translate a failed response into the vendor's domain error.
pub fn map_failure<C: ErrorCode>(
    profile: &VendorProfile<C>,
    response: &HttpResponse,
    endpoint: &str,
) -> ConnectError<C> {
    let vendor_message = (profile.vendor_message)(&response.body);
    let code = lookup(profile, response.status, vendor_message.as_deref());

    let mut meta = metadata([
        ("status_code", Value::from(response.status)),
        ("endpoint", Value::from(endpoint)),
    ]);
    if let Some(message) = vendor_message {
        meta.insert("vendor_message".to_string(), Value::from(message));
    }

    tracing::warn!(
        vendor = profile.name,
        endpoint,
        status = response.status,
        code = code.as_str(),
        "vendor call failed"
    );
    ConnectError::new(code, meta)
}

/// Turn a response into either a validated `T` or a domain error.
pub fn interpret<C, T>(
    profile: &VendorProfile<C>,
    endpoint: &str,
    response: HttpResponse,
) -> Result<T, ConnectError<C>>
where
    C: ErrorCode,
    T: DeserializeOwned + Validate,
{
    if response.status != profile.success_status || (profile.failure_in_body)(&response.body) {
        return Err(map_failure(profile, &response, endpoint));
    }

    let payload = (profile.payload)(response.body);
    validate_value(payload).map_err(|err| {
        tracing::warn!(
            vendor = profile.name,
            endpoint,
            error = %err,
            "vendor response failed validation"
        );
        let mut meta = Metadata::new();
        meta.insert("endpoint".to_string(), Value::from(endpoint));
        meta.insert("status_code".to_string(), Value::from(response.status));
        meta.insert("reason".to_string(), Value::from(err.to_string()));
        ConnectError::new(C::INVALID_RESPONSE, meta).with_cause(err)
    })
}

/// Execute `request` through `transport` and interpret the response.
///
/// Transport failures become `C::UNAVAILABLE`; every error leaving this
/// function carries the endpoint in its metadata.
pub async fn call<C, T, X>(
    transport: &X,
    profile: &VendorProfile<C>,
    request: HttpRequest,
) -> Result<T, ConnectError<C>>
where
    C: ErrorCode,
    T: DeserializeOwned + Validate,
    X: Transport + ?Sized,
{
    let endpoint = request.endpoint().to_string();
    call_named(transport, profile, &endpoint, request).await
}

/// [`call`] for vendors whose URL does not identify the operation, such
/// as JSON-RPC where every method shares one path. `endpoint` names the
/// operation in logs and error metadata.
pub async fn call_named<C, T, X>(
    transport: &X,
    profile: &VendorProfile<C>,
    endpoint: &str,
    request: HttpRequest,
) -> Result<T, ConnectError<C>>
where
    C: ErrorCode,
    T: DeserializeOwned + Validate,
    X: Transport + ?Sized,
{
    tracing::debug!(
        vendor = profile.name,
        method = request.method.as_str(),
        endpoint,
        "dispatching vendor request"
    );

    let response = transport.execute(request).await.map_err(|err| {
        tracing::warn!(vendor = profile.name, endpoint, error = %err, "transport failed");
        ConnectError::new(
            C::UNAVAILABLE,
            metadata([
                ("endpoint", Value::from(endpoint)),
                ("reason", Value::from(err.to_string())),
            ]),
        )
        .with_cause(err)
    })?;

    interpret(profile, endpoint, response).map_err(|err| err.annotate("endpoint", endpoint))
}

/// Envelope helpers shared by vendor profiles.
pub mod envelope {
    use serde_json::Value;

    pub fn never(_: &Value) -> bool {
        false
    }

    pub fn identity(body: Value) -> Value {
        body
    }

    /// `body.<key>` as a string, if present.
    pub fn string_field(body: &Value, key: &str) -> Option<String> {
        body.get(key).and_then(Value::as_str).map(str::to_string)
    }
}
