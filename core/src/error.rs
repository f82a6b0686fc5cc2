//! The domain error every connect returns.
//!
//! # Design
//! There is one error type, `ConnectError<C>`, parameterized by a per-vendor
//! code enum. A vendor contributes its code set and message templates
//! through [`error_codes!`](crate::error_codes); everything else (metadata,
//! cause chaining, template rendering, unknown-code substitution) is shared.
//!
//! The message is rendered once at construction from the code's template
//! and the metadata, so an error never changes after it is built except
//! through [`ConnectError::annotate`], which only adds context keys.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::template::{self, TemplateError};

/// Free-form context attached to an error (status code, endpoint, vendor message).
pub type Metadata = BTreeMap<String, Value>;

/// Metadata key holding a code that was requested but not recognized.
pub const REQUESTED_CODE: &str = "requested_code";

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A vendor's fixed set of machine-readable error codes.
///
/// The associated constants name the codes the shared machinery needs to
/// produce on its own: the catch-all, schema failures, transport failures,
/// rejected caller input and rejected configuration.
pub trait ErrorCode: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    const UNKNOWN: Self;
    const INVALID_RESPONSE: Self;
    const UNAVAILABLE: Self;
    const INVALID_INPUT: Self;
    const INVALID_CONFIGURATION: Self;

    /// Every code, in declaration order.
    const ALL: &'static [Self];

    /// Machine-readable name, e.g. `invalid_token`.
    fn as_str(self) -> &'static str;

    /// Message template with `{field}` placeholders filled from metadata.
    fn template(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_str() == name)
    }
}

/// Declare a vendor error-code enum together with its names and templates.
///
/// ```
/// connect_core::error_codes! {
///     /// Codes for a toy vendor.
///     pub enum ToyCode {
///         Unknown => ("unknown_error", "unknown error"),
///         BadResponse => ("invalid_response", "{endpoint} returned an unexpected response"),
///         Down => ("service_unavailable", "service unavailable"),
///         BadInput => ("invalid_input", "invalid input: {reason}"),
///         BadConfig => ("invalid_configuration", "invalid configuration: {reason}"),
///     }
///     unknown = Unknown,
///     invalid_response = BadResponse,
///     unavailable = Down,
///     invalid_input = BadInput,
///     invalid_configuration = BadConfig,
/// }
///
/// use connect_core::ErrorCode;
/// assert_eq!(ToyCode::from_name("service_unavailable"), Some(ToyCode::Down));
/// ```
#[macro_export]
macro_rules! error_codes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($code:literal, $template:literal)
            ),+ $(,)?
        }
        unknown = $unknown:ident,
        invalid_response = $invalid_response:ident,
        unavailable = $unavailable:ident,
        invalid_input = $invalid_input:ident,
        invalid_configuration = $invalid_configuration:ident $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $crate::error::ErrorCode for $name {
            const UNKNOWN: Self = Self::$unknown;
            const INVALID_RESPONSE: Self = Self::$invalid_response;
            const UNAVAILABLE: Self = Self::$unavailable;
            const INVALID_INPUT: Self = Self::$invalid_input;
            const INVALID_CONFIGURATION: Self = Self::$invalid_configuration;
            const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            fn template(self) -> &'static str {
                match self {
                    $( Self::$variant => $template, )+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::error::ErrorCode::as_str(*self))
            }
        }
    };
}

/// Uniform error carrying a code, a rendered message, metadata and an
/// optional underlying cause.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct ConnectError<C: ErrorCode> {
    code: C,
    message: String,
    metadata: Metadata,
    #[source]
    cause: Option<BoxError>,
}

impl<C: ErrorCode> ConnectError<C> {
    /// Build an error, failing if the code's template references a field
    /// missing from `metadata`.
    pub fn try_new(code: C, metadata: Metadata) -> Result<Self, TemplateError> {
        let message = template::render(code.template(), &metadata)?;
        Ok(Self {
            code,
            message,
            metadata,
            cause: None,
        })
    }

    /// Build an error on a failure path where construction itself must not fail.
    ///
    /// If the template cannot be rendered the error degrades to
    /// `C::UNKNOWN`, records the requested code under [`REQUESTED_CODE`] and
    /// carries the `TemplateError` as its cause.
    pub fn new(code: C, metadata: Metadata) -> Self {
        match Self::try_new(code, metadata.clone()) {
            Ok(err) => err,
            Err(template_err) => {
                tracing::warn!(
                    code = code.as_str(),
                    error = %template_err,
                    "error message template could not be rendered"
                );
                let mut metadata = metadata;
                metadata.insert(REQUESTED_CODE.to_string(), Value::from(code.as_str()));
                Self {
                    code: C::UNKNOWN,
                    message: format!(
                        "{} ({}: {template_err})",
                        C::UNKNOWN.template(),
                        code.as_str()
                    ),
                    metadata,
                    cause: Some(Box::new(template_err)),
                }
            }
        }
    }

    /// Build an error from a machine-readable code name.
    ///
    /// Names outside the vendor's set become `C::UNKNOWN` with the requested
    /// name kept under [`REQUESTED_CODE`].
    pub fn from_code_name(name: &str, metadata: Metadata) -> Self {
        match C::from_name(name) {
            Some(code) => Self::new(code, metadata),
            None => {
                let mut metadata = metadata;
                metadata.insert(REQUESTED_CODE.to_string(), Value::from(name));
                Self::new(C::UNKNOWN, metadata)
            }
        }
    }

    /// Shorthand for errors whose template only needs a `reason`.
    pub fn with_reason(code: C, reason: impl fmt::Display) -> Self {
        Self::new(code, metadata([("reason", Value::from(reason.to_string()))]))
    }

    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.cause = Some(cause.into());
        self
    }

    /// Add context to an error that is already this connect's error type.
    /// Existing keys win; the message is left as rendered.
    pub fn annotate(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata
            .entry(key.to_string())
            .or_insert_with(|| value.into());
        self
    }

    pub fn code(&self) -> C {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn requested_code(&self) -> Option<&str> {
        self.metadata.get(REQUESTED_CODE).and_then(Value::as_str)
    }
}

/// Build metadata from key/value pairs.
pub fn metadata<const N: usize>(pairs: [(&str, Value); N]) -> Metadata {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as _;

    crate::error_codes! {
        enum TestCode {
            Unknown => ("unknown_error", "unknown error"),
            InvalidToken => ("invalid_token", "invalid token (status {status_code})"),
            Parse => ("invalid_response", "{endpoint} returned an unexpected response"),
            Down => ("service_unavailable", "service unavailable"),
            Input => ("invalid_input", "invalid input: {reason}"),
            Config => ("invalid_configuration", "invalid configuration: {reason}"),
        }
        unknown = Unknown,
        invalid_response = Parse,
        unavailable = Down,
        invalid_input = Input,
        invalid_configuration = Config,
    }

    type TestError = ConnectError<TestCode>;

    #[test]
    fn renders_message_from_metadata() {
        let err = TestError::new(TestCode::InvalidToken, metadata([("status_code", json!(401))]));
        assert_eq!(err.code(), TestCode::InvalidToken);
        assert_eq!(err.message(), "invalid token (status 401)");
        assert_eq!(err.to_string(), "[invalid_token] invalid token (status 401)");
    }

    #[test]
    fn try_new_fails_on_missing_variable() {
        let err = TestError::try_new(TestCode::InvalidToken, Metadata::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable { ref name } if name == "status_code"));
    }

    #[test]
    fn new_degrades_to_unknown_on_missing_variable() {
        let err = TestError::new(TestCode::InvalidToken, Metadata::new());
        assert_eq!(err.code(), TestCode::Unknown);
        assert_eq!(err.requested_code(), Some("invalid_token"));
        let cause = err.source().unwrap();
        assert!(cause.to_string().contains("status_code"));
    }

    #[test]
    fn unknown_code_name_is_substituted_and_preserved() {
        let err = TestError::from_code_name("teapot", metadata([("status_code", json!(418))]));
        assert_eq!(err.code(), TestCode::Unknown);
        assert_eq!(err.requested_code(), Some("teapot"));
        assert_eq!(err.metadata()["status_code"], json!(418));
    }

    #[test]
    fn known_code_name_resolves() {
        let err = TestError::from_code_name("invalid_token", metadata([("status_code", json!(401))]));
        assert_eq!(err.code(), TestCode::InvalidToken);
        assert_eq!(err.requested_code(), None);
    }

    #[test]
    fn annotate_adds_without_overwriting() {
        let err = TestError::new(TestCode::Parse, metadata([("endpoint", json!("/pan"))]))
            .annotate("endpoint", "/other")
            .annotate("operation", "verify_pan");
        assert_eq!(err.metadata()["endpoint"], json!("/pan"));
        assert_eq!(err.metadata()["operation"], json!("verify_pan"));
    }

    #[test]
    fn cause_is_exposed_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = TestError::with_reason(TestCode::Down, "down").with_cause(io);
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }

    #[test]
    fn display_implements_code_name() {
        assert_eq!(TestCode::InvalidToken.to_string(), "invalid_token");
        assert_eq!(TestCode::from_name("invalid_input"), Some(TestCode::Input));
        assert_eq!(TestCode::from_name("nope"), None);
    }
}
