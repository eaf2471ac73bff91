//! Mutable output record built by handlers.
//!
//! A [`Response`] is created empty for every request, filled in by the handler
//! (and by middleware `process_response` hooks), then finalized exactly once
//! when the transport asks for the wire form.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, warn};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const APPLICATION_JSON: &str = "application/json";

/// Extra response headers. Names are kept as `Arc<str>` since most are static.
pub type HeaderVec = SmallVec<[(Arc<str>, String); 8]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Plain text body, sent as `text/plain`
    pub text: Option<String>,
    /// HTML body, sent as `text/html`
    pub html: Option<String>,
    /// JSON body, sent as `application/json`
    pub json: Option<Value>,
    /// Raw body bytes; overwritten by `finalize` when one of the fields above is set
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub status_code: u16,
    /// Headers other than `Content-Type`
    pub headers: HeaderVec,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: None,
            html: None,
            json: None,
            body: Vec::new(),
            content_type: None,
            status_code: 200,
            headers: HeaderVec::new(),
        }
    }

    /// Serialize any value into the `json` field.
    pub fn set_json<T: Serialize>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        self.json = Some(serde_json::to_value(value)?);
        Ok(())
    }

    /// Point the client elsewhere with a `302 Found`.
    ///
    /// See [`Response::set_header`] for how the `Location` line reaches the wire.
    pub fn redirect(&mut self, location: &str) {
        self.status_code = 302;
        self.set_header(LOCATION.as_str(), location.to_string());
    }

    /// Get a header by name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    ///
    /// The `may_minihttp` transport keeps every distinct header line it
    /// writes for the life of the process, up to a fixed number. A response
    /// whose header line is new once that cache is full is answered with a
    /// 500 instead, so prefer stable values over per-request ones.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Derive `body` and `content_type` from `json`, `html` and `text`.
    ///
    /// Each set field overwrites the previous one in the order json, html,
    /// text, so `text` wins when a handler sets several. With none set the
    /// existing `body` and `content_type` are left alone. Safe to call again.
    pub fn finalize(&mut self) {
        let set_count = [
            self.json.is_some(),
            self.html.is_some(),
            self.text.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if set_count > 1 {
            debug!(
                fields_set = set_count,
                "More than one of json/html/text set on response; text > html > json"
            );
        }

        if let Some(json) = &self.json {
            // Display for Value is infallible and produces compact JSON
            self.body = json.to_string().into_bytes();
            self.content_type = Some(APPLICATION_JSON.to_string());
        }
        if let Some(html) = &self.html {
            self.body = html.as_bytes().to_vec();
            self.content_type = Some(TEXT_HTML.to_string());
        }
        if let Some(text) = &self.text {
            self.body = text.as_bytes().to_vec();
            self.content_type = Some(TEXT_PLAIN.to_string());
        }
    }

    /// Finalize and convert into the wire response handed to the transport.
    ///
    /// Status codes outside `100..=999` cannot be represented and are sent as 500.
    /// Headers with names or values that are not valid HTTP are dropped.
    #[must_use]
    pub fn into_http(mut self) -> http::Response<Vec<u8>> {
        self.finalize();
        let status = StatusCode::from_u16(self.status_code).unwrap_or_else(|_| {
            warn!(status_code = self.status_code, "Invalid status code on response");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut res = http::Response::new(self.body);
        *res.status_mut() = status;
        let headers = res.headers_mut();
        if let Some(ct) = self.content_type {
            match HeaderValue::from_str(&ct) {
                Ok(v) => {
                    headers.insert(CONTENT_TYPE, v);
                }
                Err(_) => warn!(content_type = %ct, "Dropping invalid content type"),
            }
        }
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(n), Ok(v)) => {
                    headers.append(n, v);
                }
                _ => warn!(header = %name, "Dropping invalid response header"),
            }
        }
        res
    }
}
