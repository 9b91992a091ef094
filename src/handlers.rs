//! Built-in named handlers and middleware available to configured routes.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use serde_json::{json, Map, Value};

use crate::http::Registry;

/// Handler names every configuration can reference.
pub const BUILTIN_HANDLERS: [&str; 2] = ["health", "echo"];

/// Middleware names every configuration can reference.
pub const BUILTIN_MIDDLEWARE: [&str; 2] = ["trace", "no_store"];

/// Registry holding the built-ins plus one text handler per page.
pub fn builtin_registry(pages: &BTreeMap<String, String>) -> Registry {
    let mut registry = Registry::new();

    registry
        .register_handler("health", |_, _| Ok(json!({ "status": "ok" })))
        .register_handler("echo", |request, params| {
            let params: Map<String, Value> = params
                .iter()
                .map(|(name, value)| (name.to_string(), Value::from(value)))
                .collect();
            Ok(json!({
                "request_id": request.id(),
                "method": request.method().as_str(),
                "path": request.path(),
                "query": request.query(),
                "params": params,
                "body": String::from_utf8_lossy(request.body()),
            }))
        })
        .register_middleware("trace", |request, next| {
            let start = Instant::now();
            let request_id = request.id().to_string();
            let response = next.run(request)?;
            tracing::info!(
                request_id = %request_id,
                status = response.status_code(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Route handled"
            );
            Ok(response)
        })
        .register_middleware("no_store", |request, next| {
            Ok(next
                .run(request)?
                .with_header(CACHE_CONTROL, HeaderValue::from_static("no-store")))
        });

    for (name, body) in pages {
        let body = body.clone();
        registry.register_handler(name.as_str(), move |_, _| Ok(body.clone()));
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Resolver};
    use crate::routing::{RouteRegistrar, Router};
    use std::sync::Arc;

    fn router() -> Router {
        let mut pages = BTreeMap::new();
        pages.insert("about".to_string(), "About us".to_string());

        let mut router = Router::new();
        router.set_resolver(Arc::new(builtin_registry(&pages)));
        router
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = builtin_registry(&BTreeMap::new());
        for name in BUILTIN_HANDLERS {
            assert!(registry.handler(name).is_some(), "{name}");
        }
        for name in BUILTIN_MIDDLEWARE {
            assert!(registry.middleware(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_echo_reports_params() {
        let mut router = router();
        router.post("/echo/{word}", "echo").unwrap();

        let request = Request::create("POST", "/echo/hi%20there?x=1").unwrap().with_body("payload");
        let response = router.dispatch(request).unwrap();
        let body: Value = serde_json::from_slice(response.body()).unwrap();

        assert_eq!(body["method"], "POST");
        assert_eq!(body["params"]["word"], "hi there");
        assert_eq!(body["query"], "x=1");
        assert_eq!(body["body"], "payload");
    }

    #[test]
    fn test_page_and_no_store() {
        let mut router = router();
        router.get("/about", "about").unwrap().middleware("trace").middleware("no_store");

        let response = router.dispatch(Request::create("GET", "/about").unwrap()).unwrap();
        assert_eq!(response.body_text(), "About us");
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");
    }
}
