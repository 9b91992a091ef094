//! Route matching, groups, and URL generation through the public API.

use axum::http::{Method, StatusCode};
use site_router::error::RouterError;
use site_router::http::{handler_fn, middleware_fn, Response};
use site_router::routing::{Params, RouteRegistrar, Router};

mod common;
use common::request;

#[test]
fn test_first_registered_route_wins() {
    let mut router = Router::new();
    router.get("/posts/{slug}", handler_fn(|_, _| Ok("first"))).unwrap();
    router.get("/posts/featured", handler_fn(|_, _| Ok("second"))).unwrap();

    let response = router.dispatch(request("GET", "/posts/featured")).unwrap();
    assert_eq!(response.body_text(), "first");
}

#[test]
fn test_registered_method_matches_and_other_methods_404() {
    let mut router = Router::new();
    router.set_base_path("/sub/");
    router.get("/test/123", handler_fn(|_, _| Ok("abc123"))).unwrap();

    let response = router.dispatch(request("GET", "/sub/test/123")).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_text(), "abc123");

    let response = router.dispatch(request("POST", "/sub/test/123")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[test]
fn test_verb_helpers_register_single_method() {
    let mut router = Router::new();
    let cases: [(Method, fn(&mut Router) -> Method); 6] = [
        (Method::GET, |r| r.get("/t", "h").unwrap().methods()[0].clone()),
        (Method::POST, |r| r.post("/t", "h").unwrap().methods()[0].clone()),
        (Method::PUT, |r| r.put("/t", "h").unwrap().methods()[0].clone()),
        (Method::PATCH, |r| r.patch("/t", "h").unwrap().methods()[0].clone()),
        (Method::DELETE, |r| r.delete("/t", "h").unwrap().methods()[0].clone()),
        (Method::OPTIONS, |r| r.options("/t", "h").unwrap().methods()[0].clone()),
    ];
    for (expected, register) in cases {
        assert_eq!(register(&mut router), expected);
    }
    assert_eq!(router.routes().len(), 6);
    assert!(router.routes().iter().all(|r| r.uri() == "/t"));
}

#[test]
fn test_map_keeps_methods_and_uri() {
    let mut router = Router::new();
    let route = router.map(["GET"], "/test/123", "handler").unwrap();
    assert_eq!(route.methods(), &[Method::GET]);
    assert_eq!(route.uri(), "/test/123");
}

#[test]
fn test_empty_method_set_is_rejected() {
    let mut router = Router::new();
    let err = router.map(Vec::<&str>::new(), "/x", "h").err().unwrap();
    assert!(matches!(err, RouterError::InvalidMethod { .. }));
    assert!(router.routes().is_empty());
}

#[test]
fn test_invalid_pattern_leaves_table_untouched() {
    let mut router = Router::new();
    router.get("/ok", "h").unwrap();
    let err = router.get("/posts/{id}/{id}", "h").err().unwrap();
    assert!(matches!(err, RouterError::InvalidPattern { .. }));
    assert_eq!(router.routes().len(), 1);
}

#[test]
fn test_url_round_trip() {
    for base in ["/", "/sub/"] {
        let mut router = Router::new();
        router.set_base_path(base);
        router.get("/posts/{id}/", "show").unwrap().name("post.show").unwrap();

        let url = router.url("post.show", &Params::from([("id", "42")])).unwrap();
        assert_eq!(url, format!("{}posts/42/", base));
    }
}

#[test]
fn test_url_always_has_trailing_slash() {
    let mut router = Router::new();
    router.get("/posts/all", "h").unwrap().name("test.name").unwrap();
    assert_eq!(router.url("test.name", &Params::new()).unwrap(), "/posts/all/");
}

#[test]
fn test_url_errors() {
    let mut router = Router::new();
    router.get("/posts/{id}", "h").unwrap().name("post.show").unwrap();

    assert!(matches!(
        router.url("post.show", &Params::new()),
        Err(RouterError::MissingParameter { ref parameter, .. }) if parameter == "id"
    ));
    assert!(matches!(
        router.url("nope", &Params::new()),
        Err(RouterError::RouteNotFound { ref name }) if name == "nope"
    ));
}

#[test]
fn test_group_composes_prefix() {
    let mut router = Router::new();
    router.set_base_path("/site/");
    let mut calls = 0;
    router
        .group("api", |group| {
            calls += 1;
            group.get("widgets", handler_fn(|_, _| Ok("abc123")))?;
            Ok(())
        })
        .unwrap();
    assert_eq!(calls, 1);

    let response = router.dispatch(request("GET", "/site/api/widgets")).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_text(), "abc123");
}

#[test]
fn test_changing_base_path_changes_matches() {
    let mut router = Router::new();
    router.get("/page", handler_fn(|_, _| Ok("page"))).unwrap();

    assert_eq!(router.dispatch(request("GET", "/page")).unwrap().status(), StatusCode::OK);
    assert_eq!(router.dispatch(request("GET", "/sub/page")).unwrap().status(), StatusCode::NOT_FOUND);

    router.set_base_path("/sub/");
    assert_eq!(router.dispatch(request("GET", "/page")).unwrap().status(), StatusCode::NOT_FOUND);
    assert_eq!(router.dispatch(request("GET", "/sub/page")).unwrap().status(), StatusCode::OK);
}

#[test]
fn test_routes_added_after_dispatch_are_seen() {
    let mut router = Router::new();
    assert_eq!(router.dispatch(request("GET", "/late")).unwrap().status(), StatusCode::NOT_FOUND);
    router.get("/late", handler_fn(|_, _| Ok("late"))).unwrap();
    assert_eq!(router.dispatch(request("GET", "/late")).unwrap().body_text(), "late");
}

#[test]
fn test_middleware_order_group_then_route() {
    let mut router = Router::new();
    let tag = |label: &'static str| {
        middleware_fn(move |request, next| {
            let response = next.run(request)?;
            let body = format!("{label}({})", response.body_text());
            Ok(response.with_body(body))
        })
    };

    router
        .group("g", |group| {
            group.middleware(tag("outer"));
            group.get("x", handler_fn(|_, _| Ok("h")))?.middleware(tag("inner"));
            Ok(())
        })
        .unwrap();

    let response = router.dispatch(request("GET", "/g/x")).unwrap();
    assert_eq!(response.body_text(), "outer(inner(h))");
}

#[test]
fn test_handler_response_passes_through() {
    let mut router = Router::new();
    router
        .get("/created", handler_fn(|_, _| Ok(Response::text("made").with_status(StatusCode::CREATED))))
        .unwrap();

    let response = router.dispatch(request("GET", "/created")).unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.body_text(), "made");
}
