//! Request builder.
//!
//! # Design
//! `RequestBuilder` only assembles data: it never validates business rules
//! (each connect's `input` module does that before calling it). Query
//! values are trimmed and empty values are omitted rather than sent as
//! `key=`, so callers can pass optional arguments straight through.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// The request payload could not be serialized to JSON.
#[derive(Debug, Error)]
#[error("failed to serialize request payload: {0}")]
pub struct RequestError(#[from] serde_json::Error);

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    base_url: String,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, base_url: &str, path: &str) -> Self {
        let path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            method,
            base_url: base_url.trim_end_matches('/').to_string(),
            path,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(base_url: &str, path: &str) -> Self {
        Self::new(HttpMethod::Get, base_url, path)
    }

    pub fn post(base_url: &str, path: &str) -> Self {
        Self::new(HttpMethod::Post, base_url, path)
    }

    /// Add a query parameter. Whitespace is trimmed; an empty value omits the key.
    pub fn query(mut self, key: &str, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn query_opt<V: AsRef<str>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Add a list-valued query parameter as a comma-joined string.
    pub fn query_list<I, V>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .filter_map(|v| {
                let v = v.as_ref().trim();
                (!v.is_empty()).then(|| v.to_string())
            })
            .collect::<Vec<_>>()
            .join(",");
        self.query(key, joined)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {token}"))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a JSON payload and the matching content type.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, RequestError> {
        self.body = Some(serde_json::to_string(payload)?);
        self.headers
            .push(("content-type".to_string(), CONTENT_TYPE_JSON.to_string()));
        Ok(self)
    }

    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            base_len: self.base_url.len(),
            path: format!("{}{}", self.base_url, self.path),
            query: self.query,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.example.com/v1";

    #[test]
    fn build_joins_base_and_path() {
        let req = RequestBuilder::get(BASE, "latest").build();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "https://api.example.com/v1/latest");
        assert_eq!(req.endpoint(), "/latest");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_on_base_is_stripped() {
        let req = RequestBuilder::get("https://api.example.com/v1/", "/latest").build();
        assert_eq!(req.path, "https://api.example.com/v1/latest");
    }

    #[test]
    fn empty_query_values_are_omitted() {
        let req = RequestBuilder::get(BASE, "/latest")
            .query("base", "  ")
            .query_opt::<&str>("date", None)
            .query("access_key", " k ")
            .build();
        assert_eq!(req.query, vec![("access_key".to_string(), "k".to_string())]);
    }

    #[test]
    fn list_values_are_comma_joined() {
        let req = RequestBuilder::get(BASE, "/latest")
            .query_list("symbols", ["EUR", " GBP", "", "JPY "])
            .build();
        assert_eq!(req.query_value("symbols"), Some("EUR,GBP,JPY"));
    }

    #[test]
    fn empty_list_omits_key() {
        let req = RequestBuilder::get(BASE, "/latest")
            .query_list("symbols", Vec::<String>::new())
            .build();
        assert!(req.query.is_empty());
    }

    #[test]
    fn json_sets_body_and_content_type() {
        let req = RequestBuilder::post(BASE, "/pan")
            .bearer("secret")
            .json(&json!({"id_number": "ABCDE1234F"}))
            .unwrap()
            .build();
        assert_eq!(req.header("content-type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(req.header("authorization"), Some("Bearer secret"));
        assert_eq!(req.json_body(), Some(json!({"id_number": "ABCDE1234F"})));
    }

    #[test]
    fn timeout_is_carried_opaquely() {
        let req = RequestBuilder::get(BASE, "/")
            .timeout(Duration::from_secs(7))
            .build();
        assert_eq!(req.timeout, Some(Duration::from_secs(7)));
    }
}
