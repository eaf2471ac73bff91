//! Read-only view of an inbound HTTP request.
//!
//! A [`Request`] is built once by the transport adapter (the `may_minihttp`
//! service or the in-process test client) and lent to middleware and handlers
//! for the duration of a single call.

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::time::Instant;
use tracing::debug;

/// Query parameters in arrival order. Most requests carry a handful.
pub type QueryVec = SmallVec<[(String, String); 8]>;

#[derive(Debug, Clone)]
pub struct Request {
    request_id: RequestId,
    method: Method,
    path: String,
    query_string: Option<String>,
    query_params: QueryVec,
    headers: HeaderMap,
    body: Vec<u8>,
    received_at: Instant,
}

impl Request {
    /// Build a request from its wire parts.
    ///
    /// `target` is the request-target as sent by the client (`/books?page=2`).
    /// The path is percent-decoded; when decoding yields invalid UTF-8 the raw
    /// path is kept.
    #[must_use]
    pub fn from_parts(method: Method, target: &str, headers: HeaderMap, body: Vec<u8>) -> Self {
        let (raw_path, query_string) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (target, None),
        };
        let raw_path = if raw_path.is_empty() { "/" } else { raw_path };
        let path = match urlencoding::decode(raw_path) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw_path.to_string(),
        };
        let query_params = query_string
            .as_deref()
            .map(parse_query_params)
            .unwrap_or_default();

        let request_id = RequestId::from_header_or_new(
            headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            query_count = query_params.len(),
            header_count = headers.len(),
            body_size_bytes = body.len(),
            "HTTP request parsed"
        );

        Self {
            request_id,
            method,
            path,
            query_string,
            query_params,
            headers,
            body,
            received_at: Instant::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// When the request was built. Middleware measures latency from here
    /// instead of keeping per-request start times of its own.
    #[inline]
    #[must_use]
    pub fn received_at(&self) -> Instant {
        self.received_at
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Decoded request path without the query string
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, if the target had one
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics for repeated names (`?a=1&a=2` gives `2`).
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header by name (case-insensitive). Non-ASCII values read as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8 sequences
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl From<http::Request<Vec<u8>>> for Request {
    fn from(req: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = req.into_parts();
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Request::from_parts(parts.method, target, parts.headers, body)
    }
}

/// Parse a raw query string, URL-decoding names and values
#[must_use]
pub fn parse_query_params(query: &str) -> QueryVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
