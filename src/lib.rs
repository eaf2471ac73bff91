//! # Switchyard
//!
//! A small request-dispatch framework: register handlers against URL patterns,
//! wrap them in middleware and serve them over HTTP or drive them in-process
//! from tests.
//!
//! ## Architecture
//!
//! - **[`router`]** - URL patterns with `{name}` placeholders compiled to anchored regexes
//! - **[`handler`]** - function handlers and multi-verb [`Resource`]s
//! - **[`dispatcher`]** - route lookup, 404/405 rejection, exception hook
//! - **[`middleware`]** - before/after hooks around dispatch
//! - **[`static_files`]** - files served under `/static`, ahead of the middleware chain
//! - **[`templates`]** - HTML rendering with `minijinja`
//! - **[`response`]** - the mutable response handlers fill in
//! - **[`app`]** - the composition root
//! - **[`testing`]** - in-process test client
//! - **[`server`]** - `may_minihttp` transport
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use switchyard::{App, HandlerResult, PathParams, Request, Resource, Response};
//!
//! #[derive(Default)]
//! struct Books;
//!
//! impl Books {
//!     fn get(&mut self, _req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
//!         res.text = Some("Books Page".to_string());
//!         Ok(())
//!     }
//! }
//!
//! fn home(_req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
//!     res.text = Some("Hello from the HOME page".to_string());
//!     Ok(())
//! }
//!
//! let mut app = App::new();
//! app.add_route("/home", home, Some(&[Method::GET])).unwrap();
//! app.add_route("/books", Resource::<Books>::new().get(Books::get), None).unwrap();
//!
//! let client = app.test_client();
//! assert_eq!(client.get("/books").unwrap().text(), "Books Page");
//! assert_eq!(client.post("/home", "").unwrap().status(), 405);
//! ```

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod static_files;
pub mod templates;
pub mod testing;

pub use app::App;
pub use config::AppConfig;
pub use error::{HandlerError, HandlerResult, RouteError, TemplateError};
pub use handler::{Handler, IntoHandler, Resource};
pub use middleware::Middleware;
pub use request::Request;
pub use response::Response;
pub use router::PathParams;
pub use testing::{TestClient, TestResponse};
