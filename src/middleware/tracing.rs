use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use super::Middleware;
use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;

/// Logs one line when a request enters the chain and one when it leaves.
///
/// Latency is measured from [`Request::received_at`]; the only state kept
/// on the instance is a count of requests currently inside the chain.
#[derive(Default)]
pub struct TracingMiddleware {
    in_flight: AtomicUsize,
}

impl TracingMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that entered but have not left yet
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl Middleware for TracingMiddleware {
    fn process_request(&self, req: &Request) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        info!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            "Request received"
        );
    }

    fn process_response(&self, req: &Request, res: &mut Response) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        info!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            status = res.status_code,
            latency_ms = req.received_at().elapsed().as_millis() as u64,
            "Response generated"
        );
    }

    fn process_error(&self, req: &Request, err: &HandlerError) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        warn!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            error = %err,
            latency_ms = req.received_at().elapsed().as_millis() as u64,
            "Request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method};

    #[test]
    fn test_shared_request_id_does_not_confuse_in_flight() {
        let mw = TracingMiddleware::new();
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "01ARZ3NDEKTSV4RRFFQ69G5FAV".parse().unwrap());
        let a = Request::from_parts(Method::GET, "/a", headers.clone(), vec![]);
        let b = Request::from_parts(Method::GET, "/b", headers, vec![]);
        assert_eq!(a.request_id(), b.request_id());

        mw.process_request(&a);
        mw.process_request(&b);
        assert_eq!(mw.in_flight(), 2);

        mw.process_response(&a, &mut Response::new());
        assert_eq!(mw.in_flight(), 1);
        mw.process_error(&b, &anyhow::anyhow!("boom"));
        assert_eq!(mw.in_flight(), 0);
    }
}
