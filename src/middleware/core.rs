use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;
use std::sync::Arc;

/// Before/after hooks around the dispatch call.
///
/// One instance serves every request, so anything request-scoped must be
/// derived from the request or response, never kept in plain fields.
pub trait Middleware: Send + Sync {
    fn process_request(&self, _req: &Request) {}
    fn process_response(&self, _req: &Request, _res: &mut Response) {}

    /// Called instead of `process_response` when an unhandled error is
    /// unwinding through this layer.
    fn process_error(&self, _req: &Request, _err: &HandlerError) {}
}

/// Ordered middleware stack wrapped around an inner call.
///
/// The first middleware added is the outermost layer: its `process_request`
/// runs first and its `process_response` runs last.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run `inner` wrapped in every layer.
    ///
    /// An `Err` from `inner` unwinds straight out: no `process_response` hook
    /// sees a request whose handler failed unhandled. Every layer whose
    /// `process_request` ran sees it through `process_error`.
    pub fn call<F>(&self, req: &Request, inner: F) -> Result<Response, HandlerError>
    where
        F: FnOnce(&Request) -> Result<Response, HandlerError>,
    {
        self.call_layer(0, req, inner)
    }

    fn call_layer<F>(&self, depth: usize, req: &Request, inner: F) -> Result<Response, HandlerError>
    where
        F: FnOnce(&Request) -> Result<Response, HandlerError>,
    {
        let Some(mw) = self.middlewares.get(depth) else {
            return inner(req);
        };
        mw.process_request(req);
        match self.call_layer(depth + 1, req, inner) {
            Ok(mut res) => {
                mw.process_response(req, &mut res);
                Ok(res)
            }
            Err(err) => {
                mw.process_error(req, &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method};
    use parking_lot::Mutex;

    struct Stamp {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Stamp {
        fn process_request(&self, _req: &Request) {
            self.log.lock().push(format!("{}:request", self.name));
        }

        fn process_response(&self, _req: &Request, res: &mut Response) {
            self.log.lock().push(format!("{}:response", self.name));
            res.set_header("x-last", self.name.to_string());
        }

        fn process_error(&self, _req: &Request, err: &HandlerError) {
            self.log.lock().push(format!("{}:error:{err}", self.name));
        }
    }

    fn request() -> Request {
        Request::from_parts(Method::GET, "/", HeaderMap::new(), Vec::new())
    }

    #[test]
    fn test_onion_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.add(Arc::new(Stamp { name: "m1", log: Arc::clone(&log) }));
        chain.add(Arc::new(Stamp { name: "m2", log: Arc::clone(&log) }));

        let inner_log = Arc::clone(&log);
        let res = chain
            .call(&request(), |_req| {
                inner_log.lock().push("handler".to_string());
                Ok(Response::new())
            })
            .unwrap();

        assert_eq!(
            *log.lock(),
            vec!["m1:request", "m2:request", "handler", "m2:response", "m1:response"]
        );
        // outermost layer writes last
        assert_eq!(res.header("x-last"), Some("m1"));
    }

    #[test]
    fn test_empty_chain_calls_inner() {
        let chain = MiddlewareChain::new();
        let res = chain
            .call(&request(), |_req| {
                let mut res = Response::new();
                res.status_code = 201;
                Ok(res)
            })
            .unwrap();
        assert_eq!(res.status_code, 201);
    }

    #[test]
    fn test_error_skips_process_response() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.add(Arc::new(Stamp { name: "m1", log: Arc::clone(&log) }));
        chain.add(Arc::new(Stamp { name: "m2", log: Arc::clone(&log) }));

        let err = chain
            .call(&request(), |_req| Err(anyhow::anyhow!("boom")))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(
            *log.lock(),
            vec!["m1:request", "m2:request", "m2:error:boom", "m1:error:boom"]
        );
    }
}
