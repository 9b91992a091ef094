//! Incoming request representation.
//!
//! # Responsibilities
//! - Carry method, URI, headers and the buffered body into the router
//! - Build requests from an `http::Request` (server host) or from CGI
//!   environment variables (process-per-request host)
//! - Tag each request with an ID for log correlation
//!
//! # Design Decisions
//! - Bodies are fully buffered; the router is synchronous
//! - An incoming `x-request-id` header wins over a freshly generated ID

use std::str::FromStr;

use axum::body::Bytes;
use axum::http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use uuid::Uuid;

use crate::error::RequestError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A buffered HTTP request as seen by routes and middleware.
#[derive(Debug)]
pub struct Request {
    id: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            extensions: Extensions::new(),
        }
    }

    /// Build a request from a method name and a URI string.
    pub fn create(method: &str, uri: &str) -> Result<Self, RequestError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
        let uri = Uri::from_str(uri)?;
        Ok(Self::new(method, uri))
    }

    /// Build a request from a fully buffered `http::Request`.
    pub fn from_http(request: axum::http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        let id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            id,
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            extensions: parts.extensions,
        }
    }

    /// Build a request from CGI meta-variables (RFC 3875).
    ///
    /// `REQUEST_URI` is used when present, otherwise the URI is assembled
    /// from `SCRIPT_NAME`, `PATH_INFO` and `QUERY_STRING`. `HTTP_*`
    /// variables become headers.
    pub fn from_cgi<I, K, V>(vars: I, body: Bytes) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut method = String::from("GET");
        let mut request_uri = None;
        let mut script_name = String::new();
        let mut path_info = String::new();
        let mut query = String::new();
        let mut headers = HeaderMap::new();

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "REQUEST_METHOD" => method = value.to_string(),
                "REQUEST_URI" => request_uri = Some(value.to_string()),
                "SCRIPT_NAME" => script_name = value.to_string(),
                "PATH_INFO" => path_info = value.to_string(),
                "QUERY_STRING" => query = value.to_string(),
                "CONTENT_TYPE" => insert_header(&mut headers, "content-type", value),
                "CONTENT_LENGTH" => insert_header(&mut headers, "content-length", value),
                _ => {
                    if let Some(name) = key.strip_prefix("HTTP_") {
                        let name = name.to_ascii_lowercase().replace('_', "-");
                        insert_header(&mut headers, &name, value);
                    }
                }
            }
        }

        let uri = request_uri.unwrap_or_else(|| {
            let mut uri = format!("{script_name}{path_info}");
            if !uri.starts_with('/') {
                uri.insert(0, '/');
            }
            if !query.is_empty() {
                uri.push('?');
                uri.push_str(&query);
            }
            uri
        });

        let mut request = Self::create(&method, &uri)?;
        if let Some(id) = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
            request.id = id.to_string();
        }
        request.headers = headers;
        request.body = body;
        Ok(request)
    }

    /// Build a request from this process's environment.
    pub fn from_env(body: Bytes) -> Result<Self, RequestError> {
        Self::from_cgi(std::env::vars(), body)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path component, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::debug!(header = %name, "Skipping malformed CGI header"),
    }
}
