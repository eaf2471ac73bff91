use http::{HeaderMap, Method};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use switchyard::dispatcher::{Dispatcher, Rejection};
use switchyard::handler::{function, IntoHandler};
use switchyard::{HandlerResult, PathParams, Request, Resource, Response};

fn request(method: Method, path: &str) -> Request {
    Request::from_parts(method, path, HeaderMap::new(), Vec::new())
}

fn greeting(_req: &Request, res: &mut Response, params: &PathParams) -> HandlerResult {
    res.text = Some(format!("Hello {}", params.get("name").unwrap_or_default()));
    Ok(())
}

#[test]
fn test_dispatch_with_path_params() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add_route("/hello/{name}", greeting.into_handler(), None)
        .unwrap();

    let mut res = dispatcher.dispatch(&request(Method::GET, "/hello/John")).unwrap();
    res.finalize();
    assert_eq!(res.status_code, 200);
    assert_eq!(res.body, b"Hello John");
    assert_eq!(res.content_type.as_deref(), Some("text/plain"));
}

#[test]
fn test_dispatch_passes_every_param() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add_route(
            "/users/{user_id}/posts/{post_id}",
            function(|_req, res, params| {
                res.json = Some(json!(params.to_map()));
                Ok(())
            }),
            None,
        )
        .unwrap();

    let mut res = dispatcher
        .dispatch(&request(Method::GET, "/users/7/posts/abc"))
        .unwrap();
    res.finalize();
    let body: Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(body, json!({"user_id": "7", "post_id": "abc"}));
}

#[test]
fn test_unknown_path_is_404() {
    let dispatcher = Dispatcher::new();
    let res = dispatcher.dispatch(&request(Method::GET, "/nowhere")).unwrap();
    assert_eq!(res.status_code, Rejection::NotFound.status_code());
    assert_eq!(res.text.as_deref(), Some("Not Found."));
}

#[test]
fn test_function_outside_allowed_methods_is_405() {
    let mut dispatcher = Dispatcher::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    dispatcher
        .add_route(
            "/about",
            function(move |_req, _res, _p| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            Some(&[Method::PUT]),
        )
        .unwrap();

    let res = dispatcher.dispatch(&request(Method::GET, "/about")).unwrap();
    assert_eq!(res.status_code, 405);
    assert_eq!(res.text.as_deref(), Some("Method Not Allowed"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let res = dispatcher.dispatch(&request(Method::PUT, "/about")).unwrap();
    assert_eq!(res.status_code, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_default_allowed_methods_cover_standard_verbs() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add_route("/any", function(|_req, _res, _p| Ok(())), None)
        .unwrap();
    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
        Method::TRACE,
        Method::CONNECT,
        Method::PATCH,
    ] {
        let res = dispatcher.dispatch(&request(method.clone(), "/any")).unwrap();
        assert_eq!(res.status_code, 200, "{method} should be allowed");
    }
}

#[derive(Default)]
struct Books {
    touched: bool,
}

impl Books {
    fn post(&mut self, _req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
        assert!(!self.touched, "resource instance reused across requests");
        self.touched = true;
        res.text = Some("Endpoint to create a book".to_string());
        Ok(())
    }
}

#[test]
fn test_resource_with_only_post() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add_route(
            "/books",
            Resource::<Books>::new().post(Books::post).into_handler(),
            None,
        )
        .unwrap();

    let res = dispatcher.dispatch(&request(Method::GET, "/books")).unwrap();
    assert_eq!(res.status_code, 405);
    assert_eq!(res.text.as_deref(), Some("Method Not Allowed"));

    for _ in 0..2 {
        let res = dispatcher.dispatch(&request(Method::POST, "/books")).unwrap();
        assert_eq!(res.status_code, 200);
        assert_eq!(res.text.as_deref(), Some("Endpoint to create a book"));
    }
}

#[test]
fn test_hook_handles_error() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add_route(
            "/exception",
            function(|_req, res, _p| {
                res.text = Some("partial".to_string());
                Err(anyhow::anyhow!("some exception"))
            }),
            None,
        )
        .unwrap();
    dispatcher.set_exception_hook(Arc::new(|_req: &Request, res: &mut Response, err: &anyhow::Error| {
        assert_eq!(res.text.as_deref(), Some("partial"));
        res.text = Some(format!("handled: {err}"));
    }));
    assert!(dispatcher.has_exception_hook());

    let res = dispatcher.dispatch(&request(Method::GET, "/exception")).unwrap();
    assert_eq!(res.status_code, 200);
    assert_eq!(res.text.as_deref(), Some("handled: some exception"));
}

#[test]
fn test_error_without_hook_is_returned() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add_route(
            "/exception",
            function(|_req, _res, _p| Err(std::io::Error::other("disk on fire").into())),
            None,
        )
        .unwrap();

    let err = dispatcher
        .dispatch(&request(Method::GET, "/exception"))
        .unwrap_err();
    let io = err.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io.to_string(), "disk on fire");
}

#[test]
fn test_rejection_display_matches_body() {
    assert_eq!(Rejection::NotFound.to_string(), "Not Found.");
    assert_eq!(Rejection::MethodNotAllowed.to_string(), "Method Not Allowed");
    assert_eq!(Rejection::MethodNotAllowed.status_code(), 405);
}
