//! Shared core for typed vendor API connects.
//!
//! # Overview
//! A connect turns caller arguments into an `HttpRequest`, hands it to an
//! injected [`Transport`], and turns the `HttpResponse` into either a
//! validated, typed record or a [`ConnectError`] carrying a vendor-specific
//! code. This crate holds every piece of that pipeline that is not
//! vendor-specific.
//!
//! # Design
//! - `request` builds requests; it does no I/O and no business validation.
//! - `transport` is the I/O seam. `ReqwestTransport` is the production
//!   implementation, `RecordingTransport` replays canned responses.
//! - `validate` checks response bodies against serde schemas plus
//!   field constraints, atomically.
//! - `mapping` holds the one status-dispatch function all vendors share,
//!   driven by a per-vendor `VendorProfile` table.
//! - `error` is the single generic error type and the `error_codes!`
//!   macro vendors use to declare their codes.

pub mod error;
pub mod http;
pub mod mapping;
pub mod recording;
pub mod request;
pub mod template;
pub mod transport;
pub mod validate;

pub use error::{ConnectError, ErrorCode, Metadata};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mapping::{ErrorRule, StatusMatch, VendorProfile};
pub use recording::RecordingTransport;
pub use request::{RequestBuilder, RequestError};
pub use template::TemplateError;
pub use transport::{ReqwestTransport, Transport, TransportError, DEFAULT_TIMEOUT};
pub use validate::{Validate, ValidationError};
