//! # Server Module
//!
//! Runs an [`App`](crate::App) on `may_minihttp`'s coroutine-based HTTP
//! server.
//!
//! - [`AppService`] converts wire requests into [`Request`](crate::Request)s
//!   and writes the finalized response back
//! - [`HttpServer`] / [`ServerHandle`] start the listener and manage its lifetime
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchyard::server::{AppService, HttpServer};
//! use switchyard::App;
//!
//! let app = Arc::new(App::new());
//! let handle = HttpServer(AppService::new(app)).start("127.0.0.1:8080").unwrap();
//! handle.join().unwrap();
//! ```

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use service::AppService;
