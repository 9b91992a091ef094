//! Process-per-request front-end (CGI).
//!
//! The web server starts one process per request with the request in
//! environment variables and the body on stdin. A routed response is
//! written to stdout and the process exits; otherwise the host's fallback
//! page is written.

use std::io::{self, Read, Write};
use std::sync::Arc;

use axum::body::Bytes;

use crate::config::{apply_config, ConfigError, SiteConfig};
use crate::error::HostError;
use crate::host::{Emitter, Outcome, SiteHost, SiteRouter, WireEmitter};
use crate::http::Request;
use crate::lifecycle::{ExitProcess, Terminate};

/// Serve the request described by this process's environment.
pub fn run_cgi(config: &SiteConfig) -> Result<Outcome, HostError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_cgi_with(config, std::env::vars(), stdin.lock(), stdout.lock(), Arc::new(ExitProcess))
}

/// [`run_cgi`] with explicit environment, streams and termination.
pub fn run_cgi_with<I, R, W>(
    config: &SiteConfig,
    vars: I,
    mut input: R,
    output: W,
    terminate: Arc<dyn Terminate>,
) -> Result<Outcome, HostError>
where
    I: IntoIterator<Item = (String, String)>,
    R: Read,
    W: Write,
{
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let content_length = vars
        .iter()
        .find(|(key, _)| key == "CONTENT_LENGTH")
        .and_then(|(_, value)| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
        .min(config.listener.max_body_bytes as u64);

    let mut body = Vec::new();
    if content_length > 0 {
        input.by_ref().take(content_length).read_to_end(&mut body)?;
    }
    let request = Request::from_cgi(vars, Bytes::from(body))?;

    let mut host = SiteHost::new(config.site_url.clone()).with_fallback_body(config.host.fallback_body.clone());
    let mut site = SiteRouter::init(&mut host, terminate);
    apply_config(site.router_mut(), config).map_err(ConfigError::Routes)?;

    tracing::debug!(request_id = %request.id(), method = %request.method(), path = %request.path(), "CGI request");

    let mut emitter = WireEmitter::cgi(output);
    let outcome = host.fire_loaded(&site, request, &mut emitter)?;
    if outcome == Outcome::Deferred {
        emitter.emit(&host.fallback_response())?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn env(method: &str, uri: &str) -> Vec<(String, String)> {
        vec![
            ("REQUEST_METHOD".to_string(), method.to_string()),
            ("REQUEST_URI".to_string(), uri.to_string()),
        ]
    }

    fn config() -> SiteConfig {
        parse_config(
            r#"
            site_url = "http://example.com/site"

            [host]
            fallback_body = "host page"

            [pages]
            about = "About us"

            [[routes]]
            uri = "/about"
            handler = "about"

            [[routes]]
            methods = ["POST"]
            uri = "/echo"
            handler = "echo"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_routed_request_is_written_and_terminated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut out = Vec::new();

        let outcome = run_cgi_with(
            &config(),
            env("GET", "/site/about"),
            io::empty(),
            &mut out,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        assert!(matches!(outcome, Outcome::Handled { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Status: 200 OK\r\n"));
        assert!(out.ends_with("About us"));
    }

    #[test]
    fn test_body_is_read_up_to_content_length() {
        let mut vars = env("POST", "/site/echo");
        vars.push(("CONTENT_LENGTH".to_string(), "5".to_string()));
        let mut out = Vec::new();

        run_cgi_with(&config(), vars, &b"helloEXTRA"[..], &mut out, Arc::new(|| {})).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(r#""body":"hello""#));
    }

    #[test]
    fn test_unrouted_request_gets_host_page() {
        let mut out = Vec::new();
        let outcome = run_cgi_with(
            &config(),
            env("GET", "/site/elsewhere"),
            io::empty(),
            &mut out,
            Arc::new(|| panic!("terminated a deferred request")),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Deferred);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Status: 404 Not Found\r\n"));
        assert!(out.ends_with("host page"));
    }
}
