use super::request::parse_request;
use super::response::{write_error, write_response};
use crate::app::App;
use http::StatusCode;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Adapts an [`App`] to `may_minihttp`'s service interface.
///
/// Handler errors that reached the transport and handler panics are both
/// answered with a plain 500; the connection stays usable.
#[derive(Clone)]
pub struct AppService {
    app: Arc<App>,
}

impl AppService {
    #[must_use]
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let start = Instant::now();
        let req = match parse_request(req) {
            Ok(req) => req,
            Err(e) => {
                info!(error = %e, "Rejecting request with invalid method");
                write_error(res, StatusCode::BAD_REQUEST);
                return Ok(());
            }
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| self.app.handle(&req)));
        match outcome {
            Ok(Ok(response)) => {
                let response = response.into_http();
                info!(
                    request_id = %req.request_id(),
                    method = %req.method(),
                    path = %req.path(),
                    status = response.status().as_u16(),
                    latency_ms = start.elapsed().as_millis(),
                    "Request complete"
                );
                write_response(res, response);
            }
            Ok(Err(err)) => {
                error!(
                    request_id = %req.request_id(),
                    method = %req.method(),
                    path = %req.path(),
                    error = %err,
                    "Unhandled handler error"
                );
                write_error(res, StatusCode::INTERNAL_SERVER_ERROR);
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    request_id = %req.request_id(),
                    method = %req.method(),
                    path = %req.path(),
                    panic = %message,
                    "Handler panicked"
                );
                write_error(res, StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
        Ok(())
    }
}
