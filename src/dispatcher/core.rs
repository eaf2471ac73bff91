//! Dispatcher core module - per-request routing and invocation.
//!
//! Each call runs ROUTING, METHOD_CHECK, INVOKING to completion on the
//! caller's stack. The dispatcher itself is immutable during request handling
//! and can be shared across threads.

use crate::error::{HandlerError, RouteError};
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::router::RouteTable;
use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Callback that turns a handler error into a response
///
/// Runs with the same response the handler was writing into. Once it returns,
/// the error counts as handled.
pub type ExceptionHook = Arc<dyn Fn(&Request, &mut Response, &HandlerError) + Send + Sync>;

pub const NOT_FOUND_BODY: &str = "Not Found.";
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method Not Allowed";

/// Requests the dispatcher answers itself without calling a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No route pattern matched the path
    NotFound,
    /// A route matched but the verb is not permitted on it
    MethodNotAllowed,
}

impl Rejection {
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Rejection::NotFound => 404,
            Rejection::MethodNotAllowed => 405,
        }
    }

    /// Write the canned reply into `res`
    pub fn apply(self, res: &mut Response) {
        res.status_code = self.status_code();
        res.text = Some(
            match self {
                Rejection::NotFound => NOT_FOUND_BODY,
                Rejection::MethodNotAllowed => METHOD_NOT_ALLOWED_BODY,
            }
            .to_string(),
        );
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotFound => f.write_str(NOT_FOUND_BODY),
            Rejection::MethodNotAllowed => f.write_str(METHOD_NOT_ALLOWED_BODY),
        }
    }
}

/// Routes requests to handlers and owns the route table
#[derive(Clone, Default)]
pub struct Dispatcher {
    routes: RouteTable,
    exception_hook: Option<ExceptionHook>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route; see [`RouteTable::add`]
    pub fn add_route(
        &mut self,
        pattern: &str,
        handler: Handler,
        allowed_methods: Option<&[Method]>,
    ) -> Result<(), RouteError> {
        self.routes.add(pattern, handler, allowed_methods)
    }

    /// Install the exception hook, replacing any previous one
    pub fn set_exception_hook(&mut self, hook: ExceptionHook) {
        if self.exception_hook.is_some() {
            warn!("Replacing previously registered exception hook");
        }
        self.exception_hook = Some(hook);
    }

    #[must_use]
    pub fn has_exception_hook(&self) -> bool {
        self.exception_hook.is_some()
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Produce the response for one request.
    ///
    /// Unknown paths and forbidden verbs become 404 / 405 responses. A handler
    /// error goes to the exception hook when one is installed; otherwise it is
    /// returned as `Err` for the transport to deal with.
    pub fn dispatch(&self, req: &Request) -> Result<Response, HandlerError> {
        let mut res = Response::new();
        let request_id = req.request_id();

        let Some(route_match) = self.routes.match_path(req.path()) else {
            warn!(
                request_id = %request_id,
                method = %req.method(),
                path = %req.path(),
                "No route for path"
            );
            Rejection::NotFound.apply(&mut res);
            return Ok(res);
        };
        let route = route_match.route;

        let Some(handler_fn) = route
            .handler()
            .resolve(req.method(), route.allowed_methods())
        else {
            warn!(
                request_id = %request_id,
                method = %req.method(),
                path = %req.path(),
                route_pattern = %route.pattern(),
                "Method not allowed on route"
            );
            Rejection::MethodNotAllowed.apply(&mut res);
            return Ok(res);
        };

        debug!(
            request_id = %request_id,
            route_pattern = %route.pattern(),
            path_params = ?route_match.params,
            "Handler execution start"
        );
        let execution_start = Instant::now();

        match handler_fn(req, &mut res, &route_match.params) {
            Ok(()) => {
                info!(
                    request_id = %request_id,
                    method = %req.method(),
                    route_pattern = %route.pattern(),
                    status = res.status_code,
                    execution_time_us = execution_start.elapsed().as_micros(),
                    "Handler execution complete"
                );
                Ok(res)
            }
            Err(err) => match &self.exception_hook {
                Some(hook) => {
                    warn!(
                        request_id = %request_id,
                        route_pattern = %route.pattern(),
                        error = %err,
                        "Handler failed, passing error to exception hook"
                    );
                    hook(req, &mut res, &err);
                    Ok(res)
                }
                None => {
                    error!(
                        request_id = %request_id,
                        route_pattern = %route.pattern(),
                        error = %err,
                        "Handler failed with no exception hook registered"
                    );
                    Err(err)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_bodies() {
        let mut res = Response::new();
        Rejection::NotFound.apply(&mut res);
        assert_eq!(res.status_code, 404);
        assert_eq!(res.text.as_deref(), Some("Not Found."));

        let mut res = Response::new();
        Rejection::MethodNotAllowed.apply(&mut res);
        assert_eq!(res.status_code, 405);
        assert_eq!(res.text.as_deref(), Some("Method Not Allowed"));
    }
}
