//! # Middleware Module
//!
//! Before/after hooks wrapped around the dispatcher.
//!
//! Middlewares are kept in registration order and nest like an onion: with
//! `M1` registered before `M2`, a request runs
//! `M1.process_request`, `M2.process_request`, the handler,
//! `M2.process_response`, `M1.process_response`.
//!
//! When the handler fails and no exception hook turns the error into a
//! response, the `process_response` hooks are skipped and each layer gets
//! `process_error` instead, innermost first.
//!
//! Static asset requests are answered before the chain is entered and never
//! reach a middleware.

mod core;
mod metrics;
mod tracing;

pub use core::{Middleware, MiddlewareChain};
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
