//! # Application
//!
//! [`App`] ties the pieces together: the dispatcher with its route table and
//! exception hook, the middleware chain, the static file mount and the
//! template environment.
//!
//! ## Request Flow
//!
//! 1. Paths under the static prefix are answered from the static directory.
//!    The middleware chain and the route table are skipped entirely.
//! 2. Every other request enters the middleware chain, whose innermost layer
//!    is [`Dispatcher::dispatch`].
//! 3. The resulting [`Response`] is finalized into an `http::Response`.
//!
//! A handler error that no exception hook handled comes back from
//! [`App::call`] as `Err`. The HTTP server turns it into a 500; the
//! [`TestClient`](crate::testing::TestClient) hands it to the test.
//!
//! ```rust
//! use switchyard::{App, HandlerResult, PathParams, Request, Response};
//!
//! fn hello(_req: &Request, res: &mut Response, params: &PathParams) -> HandlerResult {
//!     res.text = Some(format!("Hello, {}", params.get("name").unwrap_or("stranger")));
//!     Ok(())
//! }
//!
//! let mut app = App::new();
//! app.add_route("/hello/{name}", hello, None).unwrap();
//!
//! let res = app.test_client().get("http://testserver/hello/Matthew").unwrap();
//! assert_eq!(res.text(), "Hello, Matthew");
//! ```

use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, ExceptionHook};
use crate::error::{HandlerError, RouteError, TemplateError};
use crate::handler::IntoHandler;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::request::Request;
use crate::response::Response;
use crate::static_files::StaticFiles;
use crate::templates::Templates;
use crate::testing::TestClient;
use http::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub struct App {
    dispatcher: Dispatcher,
    middleware: MiddlewareChain,
    static_files: StaticFiles,
    templates: Templates,
    config: AppConfig,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Application with default directories (`templates/`, `static/`)
    /// relative to the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    #[must_use]
    pub fn with_config(config: AppConfig) -> Self {
        info!(
            templates_dir = %config.templates_dir.display(),
            static_dir = %config.static_dir.display(),
            static_prefix = %config.static_prefix,
            "Application created"
        );
        Self {
            dispatcher: Dispatcher::new(),
            middleware: MiddlewareChain::new(),
            static_files: StaticFiles::new(config.static_dir.clone(), &config.static_prefix),
            templates: Templates::new(config.templates_dir.clone()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register `handler` for `pattern`.
    ///
    /// `allowed_methods` restricts which verbs reach a function handler;
    /// `None` accepts all of them. Resources ignore it and answer exactly the
    /// verbs they implement. Registering the same pattern twice is an error.
    pub fn add_route<H: IntoHandler>(
        &mut self,
        pattern: &str,
        handler: H,
        allowed_methods: Option<&[Method]>,
    ) -> Result<(), RouteError> {
        self.dispatcher
            .add_route(pattern, handler.into_handler(), allowed_methods)
    }

    /// Like [`add_route`](Self::add_route) but hands `handler` back unchanged,
    /// so it can still be called directly after registration.
    pub fn route<H: IntoHandler + Clone>(
        &mut self,
        pattern: &str,
        handler: H,
        allowed_methods: Option<&[Method]>,
    ) -> Result<H, RouteError> {
        self.add_route(pattern, handler.clone(), allowed_methods)?;
        Ok(handler)
    }

    /// Install the function that turns handler errors into responses.
    ///
    /// Only one hook is kept; a later call replaces the earlier one.
    pub fn add_exception_handler<F>(&mut self, hook: F)
    where
        F: Fn(&Request, &mut Response, &HandlerError) + Send + Sync + 'static,
    {
        let hook: ExceptionHook = Arc::new(hook);
        self.dispatcher.set_exception_hook(hook);
    }

    /// Append a middleware. The first one added is the outermost layer.
    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.add(middleware);
    }

    /// Render a template from the configured templates directory
    pub fn template<S: Serialize>(&self, name: &str, context: S) -> Result<String, TemplateError> {
        self.templates.render(name, context)
    }

    #[must_use]
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    #[must_use]
    pub fn static_files(&self) -> &StaticFiles {
        &self.static_files
    }

    /// Registered patterns in registration order
    #[must_use]
    pub fn routes(&self) -> Vec<&str> {
        self.dispatcher.routes().patterns()
    }

    /// Handle one request up to an unfinalized [`Response`]
    pub fn handle(&self, req: &Request) -> Result<Response, HandlerError> {
        if self.static_files.matches(req.path()) {
            debug!(
                request_id = %req.request_id(),
                path = %req.path(),
                "Static prefix matched, bypassing middleware"
            );
            return Ok(self.static_files.serve(req));
        }
        self.middleware
            .call(req, |req| self.dispatcher.dispatch(req))
    }

    /// Handle a wire request and produce the finalized wire response
    pub fn call(&self, req: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, HandlerError> {
        let req = Request::from(req);
        self.handle(&req).map(Response::into_http)
    }

    /// In-process client for exercising the app without a socket
    #[must_use]
    pub fn test_client(&self) -> TestClient<'_> {
        TestClient::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use crate::router::PathParams;

    fn home(_req: &Request, res: &mut Response, _params: &PathParams) -> HandlerResult {
        res.text = Some("Hello from the HOME page".to_string());
        Ok(())
    }

    #[test]
    fn test_routes_listed_in_order() {
        let mut app = App::new();
        app.add_route("/home", home, None).unwrap();
        app.add_route("/about", home, None).unwrap();
        assert_eq!(app.routes(), vec!["/home", "/about"]);
    }

    #[test]
    fn test_route_returns_handler() {
        let mut app = App::new();
        let f = app
            .route("/home", home as fn(&Request, &mut Response, &PathParams) -> HandlerResult, None)
            .unwrap();
        let req = Request::from_parts(Method::GET, "/home", http::HeaderMap::new(), vec![]);
        let mut res = Response::new();
        f(&req, &mut res, &PathParams::default()).unwrap();
        assert_eq!(res.text.as_deref(), Some("Hello from the HOME page"));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut app = App::new();
        app.add_route("/home", home, None).unwrap();
        let err = app.add_route("/home", home, None).unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }
}
