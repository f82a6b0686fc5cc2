//! HTTP transport types shared by every connect.
//!
//! # Design
//! Requests and responses are plain data. A connect builds `HttpRequest`
//! values and interprets `HttpResponse` values; whoever implements
//! [`Transport`](crate::transport::Transport) performs the actual I/O. This
//! keeps request construction and response mapping deterministic and lets
//! tests drive a connect with canned responses.
//!
//! The response body is already parsed into a `serde_json::Value`. Vendors
//! that answer with something other than JSON (an HTML error page from a
//! proxy, an empty 502) surface as `Value::String` or `Value::Null`, so the
//! mapper always has a value to look at.

use std::time::Duration;

use serde_json::Value;
use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by [`RequestBuilder`](crate::request::RequestBuilder). `path` holds
/// the absolute URL without query string; `base_len` remembers where the
/// vendor base URL ends so error context can name the endpoint alone.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
    pub(crate) base_len: usize,
}

impl HttpRequest {
    /// Absolute URL including the percent-encoded query string.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.path)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }
        Ok(url)
    }

    /// Endpoint path relative to the vendor base URL, e.g. `/pan/pan-comprehensive`.
    pub fn endpoint(&self) -> &str {
        self.path.get(self.base_len..).unwrap_or(&self.path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Request payload parsed back into JSON, if any.
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a transport after executing an `HttpRequest`, then consumed
/// exactly once by the status mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Build a response from raw body text. JSON is parsed; anything else is
    /// kept as a string, and an empty body becomes `null`.
    pub fn from_text(status: u16, headers: Vec<(String, String)>, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self {
            status,
            headers,
            body,
        }
    }
}
