//! HTTP server host.
//!
//! # Responsibilities
//! - Create the Axum app with a single fallback handler
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Buffer each request and fire the host's `loaded` event for it
//! - Serve the host fallback page for deferred requests
//! - Swap in a freshly built router when the config changes
//!
//! # Design Decisions
//! - Dispatch is synchronous and runs on the blocking pool
//! - Each reload builds a new router; requests in flight keep the old one

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{apply_config, ConfigError, SiteConfig};
use crate::host::{CaptureEmitter, Outcome, SiteHost, SiteRouter};
use crate::http::{Request, Response};
use crate::lifecycle::EndRequest;
use crate::observability::metrics;

/// One generation of the site: host plus the router it initialized.
pub struct ServedSite {
    pub host: SiteHost,
    pub site: SiteRouter,
}

impl ServedSite {
    pub fn build(config: &SiteConfig) -> Result<Self, ConfigError> {
        let mut host = SiteHost::new(config.site_url.clone()).with_fallback_body(config.host.fallback_body.clone());
        let mut site = SiteRouter::init(&mut host, Arc::new(EndRequest));
        apply_config(site.router_mut(), config)?;
        Ok(Self { host, site })
    }

    /// Fire `loaded` for one request and produce the reply.
    fn respond(&self, request: Request) -> Response {
        let request_id = request.id().to_string();
        let mut emitter = CaptureEmitter::new();

        match self.host.fire_loaded(&self.site, request, &mut emitter) {
            Ok(Outcome::Handled { .. }) => emitter.take().unwrap_or_else(Response::not_found),
            Ok(Outcome::Deferred) => self.host.fallback_response(),
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Request processing failed");
                Response::text("Internal Server Error").with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<ArcSwap<ServedSite>>,
    pub max_body_bytes: usize,
}

/// HTTP server for a site.
pub struct HttpServer {
    config: SiteConfig,
    state: AppState,
}

impl HttpServer {
    /// Build the site from `config`. Fails if the routes cannot be registered.
    pub fn new(config: SiteConfig) -> Result<Self, ConfigError> {
        let site = ServedSite::build(&config)?;
        let state = AppState {
            site: Arc::new(ArcSwap::from_pointee(site)),
            max_body_bytes: config.listener.max_body_bytes,
        };
        Ok(Self { config, state })
    }

    /// The Axum app with all middleware layers.
    #[allow(deprecated)]
    pub fn app(&self) -> AxumRouter {
        AxumRouter::new()
            .fallback(site_handler)
            .with_state(self.state.clone())
            .layer(RequestBodyLimitLayer::new(self.config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Rebuild the site from `config` and swap it in.
    pub fn reload(&self, config: &SiteConfig) -> Result<(), ConfigError> {
        swap_site(&self.state, config)
    }

    /// Run the server until `shutdown` fires, applying config updates as
    /// they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<SiteConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.state.site.load().site.router().routes().len(), "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(e) = swap_site(&state, &config) {
                    tracing::error!(error = %e, "Failed to apply reloaded config, keeping current routes");
                }
            }
        });

        axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

fn swap_site(state: &AppState, config: &SiteConfig) -> Result<(), ConfigError> {
    let site = ServedSite::build(config)?;
    let routes = site.site.router().routes().len();
    state.site.store(Arc::new(site));
    tracing::info!(routes, "Routes reloaded");
    Ok(())
}

async fn site_handler(State(state): State<AppState>, request: axum::extract::Request) -> AxumResponse {
    let start = Instant::now();
    let method = request.method().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer request body");
            metrics::record_request(&method, 413, start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };
    let request = Request::from_http(axum::http::Request::from_parts(parts, body));

    let site = state.site.load_full();
    let response = match tokio::task::spawn_blocking(move || site.respond(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            Response::text("Internal Server Error").with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    metrics::record_request(&method, response.status_code(), start);
    response.into_response()
}
