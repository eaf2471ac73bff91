//! Handler references stored in the route table.
//!
//! A route points either at a plain function or at a *resource*: a type with
//! one method per HTTP verb. Resources are instantiated fresh for every request
//! so no state leaks between calls; the verb to method table is built once at
//! registration and consulted by lookup at dispatch time.
//!
//! ```rust,ignore
//! use switchyard::{App, HandlerResult, PathParams, Request, Resource, Response};
//!
//! #[derive(Default)]
//! struct Books;
//!
//! impl Books {
//!     fn get(&mut self, _req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
//!         res.text = Some("Books page".into());
//!         Ok(())
//!     }
//! }
//!
//! let mut app = App::new();
//! app.add_route("/books", Resource::<Books>::new().get(Books::get), None)?;
//! ```

use crate::error::HandlerResult;
use crate::request::Request;
use crate::response::Response;
use crate::router::PathParams;
use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Type-erased handler function
pub type HandlerFn =
    Arc<dyn Fn(&Request, &mut Response, &PathParams) -> HandlerResult + Send + Sync>;

/// Every verb a route accepts when registered without an explicit list.
pub const STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
    Method::PATCH,
];

/// What a route resolves to
#[derive(Clone)]
pub enum Handler {
    /// Plain function, gated by the route's allowed methods
    Function(HandlerFn),
    /// Multi-verb resource; the verb table itself decides what is allowed
    Resource(ResourceMethods),
}

impl Handler {
    /// Resolve the function to call for `method`.
    ///
    /// Functions consult `allowed_methods`; resources consult their verb table
    /// and ignore the route's list.
    #[must_use]
    pub fn resolve(&self, method: &Method, allowed_methods: &[Method]) -> Option<&HandlerFn> {
        match self {
            Handler::Function(f) => allowed_methods.contains(method).then_some(f),
            Handler::Resource(methods) => methods.lookup(method),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Function(_) => f.write_str("Handler::Function"),
            Handler::Resource(methods) => f
                .debug_tuple("Handler::Resource")
                .field(&methods.methods())
                .finish(),
        }
    }
}

/// Wrap a closure as a function handler.
///
/// Passing a closure straight to `add_route` works too, but it then needs its
/// parameter and return types spelled out; this helper lets them be inferred.
pub fn function<F>(f: F) -> Handler
where
    F: Fn(&Request, &mut Response, &PathParams) -> HandlerResult + Send + Sync + 'static,
{
    Handler::Function(Arc::new(f))
}

/// Verb to method table of a registered resource
#[derive(Clone)]
pub struct ResourceMethods {
    type_name: &'static str,
    methods: SmallVec<[(Method, HandlerFn); 4]>,
}

impl ResourceMethods {
    /// Find the method for a verb
    #[must_use]
    pub fn lookup(&self, method: &Method) -> Option<&HandlerFn> {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, f)| f)
    }

    /// Verbs this resource implements, in registration order
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        self.methods.iter().map(|(m, _)| m.clone()).collect()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

type ResourceMethodFn<R> =
    Arc<dyn Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult + Send + Sync>;

/// Builder for a multi-verb handler backed by type `R`.
///
/// Each request gets its own `R` from the factory (`R::default()` for
/// [`Resource::new`]). Registering the same verb twice keeps the last method.
pub struct Resource<R> {
    factory: Arc<dyn Fn() -> R + Send + Sync>,
    methods: Vec<(Method, ResourceMethodFn<R>)>,
}

impl<R> Clone for Resource<R> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            methods: self.methods.clone(),
        }
    }
}

impl<R: Default + 'static> Resource<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(R::default)
    }
}

impl<R: Default + 'static> Default for Resource<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static> Resource<R> {
    /// Build instances with a custom constructor
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            methods: Vec::new(),
        }
    }

    /// Map an arbitrary verb to a method
    #[must_use]
    pub fn method<F>(mut self, verb: Method, f: F) -> Self
    where
        F: Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        self.methods.retain(|(m, _)| *m != verb);
        self.methods.push((verb, Arc::new(f)));
        self
    }

    #[must_use]
    pub fn get<F>(self, f: F) -> Self
    where
        F: Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        self.method(Method::GET, f)
    }

    #[must_use]
    pub fn post<F>(self, f: F) -> Self
    where
        F: Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        self.method(Method::POST, f)
    }

    #[must_use]
    pub fn put<F>(self, f: F) -> Self
    where
        F: Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        self.method(Method::PUT, f)
    }

    #[must_use]
    pub fn patch<F>(self, f: F) -> Self
    where
        F: Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        self.method(Method::PATCH, f)
    }

    #[must_use]
    pub fn delete<F>(self, f: F) -> Self
    where
        F: Fn(&mut R, &Request, &mut Response, &PathParams) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        self.method(Method::DELETE, f)
    }

    fn into_methods(self) -> ResourceMethods {
        let methods = self
            .methods
            .into_iter()
            .map(|(verb, method)| {
                let factory = Arc::clone(&self.factory);
                let call: HandlerFn = Arc::new(
                    move |req: &Request, res: &mut Response, params: &PathParams| {
                        let mut instance = factory();
                        method(&mut instance, req, res, params)
                    },
                );
                (verb, call)
            })
            .collect();
        ResourceMethods {
            type_name: std::any::type_name::<R>(),
            methods,
        }
    }
}

/// Anything that can be registered on a route
pub trait IntoHandler {
    fn into_handler(self) -> Handler;
}

impl IntoHandler for Handler {
    fn into_handler(self) -> Handler {
        self
    }
}

impl<F> IntoHandler for F
where
    F: Fn(&Request, &mut Response, &PathParams) -> HandlerResult + Send + Sync + 'static,
{
    fn into_handler(self) -> Handler {
        Handler::Function(Arc::new(self))
    }
}

impl<R: 'static> IntoHandler for Resource<R> {
    fn into_handler(self) -> Handler {
        Handler::Resource(self.into_methods())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        hits: usize,
    }

    impl Counter {
        fn get(&mut self, _req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
            self.hits += 1;
            res.text = Some(format!("hits={}", self.hits));
            Ok(())
        }
    }

    fn request(method: Method) -> Request {
        Request::from_parts(method, "/counter", HeaderMap::new(), Vec::new())
    }

    #[test]
    fn test_resource_is_instantiated_per_call() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let handler = Resource::with_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Counter::default()
        })
        .get(Counter::get)
        .into_handler();
        let f = handler.resolve(&Method::GET, &[]).unwrap();
        for _ in 0..3 {
            let mut res = Response::new();
            f(&request(Method::GET), &mut res, &PathParams::default()).unwrap();
            assert_eq!(res.text.as_deref(), Some("hits=1"));
        }
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_resource_ignores_route_allowed_methods() {
        let handler = Resource::<Counter>::new().get(Counter::get).into_handler();
        assert!(handler.resolve(&Method::GET, &[Method::POST]).is_some());
        assert!(handler.resolve(&Method::POST, &STANDARD_METHODS).is_none());
    }

    #[test]
    fn test_function_respects_allowed_methods() {
        let handler = function(|_req, res, _p| {
            res.text = Some("ok".into());
            Ok(())
        });
        assert!(handler.resolve(&Method::GET, &[Method::GET]).is_some());
        assert!(handler.resolve(&Method::PUT, &[Method::GET]).is_none());
    }

    #[test]
    fn test_same_verb_registered_twice_keeps_last() {
        let resource = Resource::<Counter>::new()
            .get(Counter::get)
            .get(|_c: &mut Counter, _req: &Request, res: &mut Response, _p: &PathParams| {
                res.text = Some("second".into());
                Ok(())
            });
        let Handler::Resource(methods) = resource.into_handler() else {
            panic!("expected resource");
        };
        assert_eq!(methods.methods(), vec![Method::GET]);
        let mut res = Response::new();
        methods.lookup(&Method::GET).unwrap()(
            &request(Method::GET),
            &mut res,
            &PathParams::default(),
        )
        .unwrap();
        assert_eq!(res.text.as_deref(), Some("second"));
    }
}
