use http::{HeaderMap, Method};
use switchyard::handler::{function, Handler};
use switchyard::router::{PathParams, RouteTable};
use switchyard::{Request, RouteError};

fn noop() -> Handler {
    function(|_req, _res, _params| Ok(()))
}

fn table(patterns: &[&str]) -> RouteTable {
    let mut table = RouteTable::new();
    for pattern in patterns {
        table.add(pattern, noop(), None).unwrap();
    }
    table
}

#[test]
fn test_route_matching() {
    let table = table(&[
        "/",
        "/zoo/animals",
        "/zoo/animals/{id}",
        "/zoo/animals/{id}/feedings/{feeding_id}",
    ]);

    let cases: &[(&str, Option<&str>, &[(&str, &str)])] = &[
        ("/", Some("/"), &[]),
        ("/zoo/animals", Some("/zoo/animals"), &[]),
        ("/zoo/animals/42", Some("/zoo/animals/{id}"), &[("id", "42")]),
        (
            "/zoo/animals/42/feedings/7",
            Some("/zoo/animals/{id}/feedings/{feeding_id}"),
            &[("id", "42"), ("feeding_id", "7")],
        ),
        ("/zoo/animals/42/feedings", None, &[]),
        ("/zoo", None, &[]),
        ("/zoo/animals/", None, &[]),
    ];

    for (path, expected_pattern, expected_params) in cases {
        let matched = table.match_path(path);
        match expected_pattern {
            Some(pattern) => {
                let m = matched.unwrap_or_else(|| panic!("{path} should match"));
                assert_eq!(m.route.pattern(), *pattern);
                let expected: PathParams = expected_params.iter().copied().collect();
                assert_eq!(m.params, expected, "params for {path}");
            }
            None => assert!(matched.is_none(), "{path} should not match"),
        }
    }
}

#[test]
fn test_first_registered_wins() {
    let table = table(&["/books/{id}", "/books/new"]);
    let m = table.match_path("/books/new").unwrap();
    assert_eq!(m.route.pattern(), "/books/{id}");
    assert_eq!(m.params.get("id"), Some("new"));
}

#[test]
fn test_duplicate_pattern_regardless_of_handler() {
    let mut table = table(&["/home"]);
    let other = function(|_req, res, _params| {
        res.text = Some("different".to_string());
        Ok(())
    });
    assert!(matches!(
        table.add("/home", other, Some(&[Method::POST])),
        Err(RouteError::Duplicate { .. })
    ));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_equivalent_patterns_are_distinct() {
    let table = table(&["/hello/{name}", "/hello/{who}"]);
    assert_eq!(table.patterns(), vec!["/hello/{name}", "/hello/{who}"]);
    assert_eq!(
        table.match_path("/hello/John").unwrap().route.pattern(),
        "/hello/{name}"
    );
}

#[test]
fn test_percent_encoded_path_is_decoded_before_matching() {
    let table = table(&["/hello/{name}"]);
    let req = Request::from_parts(Method::GET, "/hello/John%20Smith", HeaderMap::new(), vec![]);
    let m = table.match_path(req.path()).unwrap();
    assert_eq!(m.params.get("name"), Some("John Smith"));
}

#[test]
fn test_query_string_is_not_matched() {
    let table = table(&["/search"]);
    let req = Request::from_parts(Method::GET, "/search?q=rust", HeaderMap::new(), vec![]);
    assert!(table.match_path(req.path()).is_some());
    assert_eq!(req.query_param("q"), Some("rust"));
}

#[test]
fn test_allowed_methods_recorded() {
    let mut table = RouteTable::new();
    table
        .add("/about", noop(), Some(&[Method::PUT]))
        .unwrap();
    table.add("/home", noop(), None).unwrap();

    assert_eq!(
        table.match_path("/about").unwrap().route.allowed_methods(),
        &[Method::PUT]
    );
    assert_eq!(
        table.match_path("/home").unwrap().route.allowed_methods().len(),
        9
    );
}
