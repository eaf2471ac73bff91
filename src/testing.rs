//! In-process test client.
//!
//! Requests go straight through [`App::call`] with no socket involved, so a
//! handler error that was not handled by an exception hook surfaces as the
//! `Err` of the request method and can be downcast to its concrete type.

use crate::app::App;
use crate::error::HandlerError;
use anyhow::Context;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use std::borrow::Cow;

pub struct TestClient<'a> {
    app: &'a App,
    default_headers: HeaderMap,
}

impl<'a> TestClient<'a> {
    #[must_use]
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            default_headers: HeaderMap::new(),
        }
    }

    /// Send `name: value` with every request made by this client
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, HandlerError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name '{name}'"))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid header value for '{name}'"))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn get(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::GET, url, Vec::new())
    }

    pub fn head(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::HEAD, url, Vec::new())
    }

    pub fn delete(&self, url: &str) -> Result<TestResponse, HandlerError> {
        self.request(Method::DELETE, url, Vec::new())
    }

    pub fn post<B: Into<Vec<u8>>>(&self, url: &str, body: B) -> Result<TestResponse, HandlerError> {
        self.request(Method::POST, url, body.into())
    }

    pub fn put<B: Into<Vec<u8>>>(&self, url: &str, body: B) -> Result<TestResponse, HandlerError> {
        self.request(Method::PUT, url, body.into())
    }

    pub fn patch<B: Into<Vec<u8>>>(&self, url: &str, body: B) -> Result<TestResponse, HandlerError> {
        self.request(Method::PATCH, url, body.into())
    }

    /// Issue a request. `url` may be absolute (`http://testserver/home`) or
    /// just a path (`/home`); only the path and query are used.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: Vec<u8>,
    ) -> Result<TestResponse, HandlerError> {
        let mut builder = http::Request::builder().method(method).uri(url);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        let req = builder
            .body(body)
            .with_context(|| format!("invalid test request for '{url}'"))?;
        let inner = self.app.call(req)?;
        Ok(TestResponse { inner })
    }
}

#[derive(Debug)]
pub struct TestResponse {
    inner: http::Response<Vec<u8>>,
}

impl TestResponse {
    #[must_use]
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.inner.body()
    }

    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.inner.body())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.inner.body())
    }

    #[must_use]
    pub fn into_inner(self) -> http::Response<Vec<u8>> {
        self.inner
    }
}
