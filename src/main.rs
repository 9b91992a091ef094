//! `site-router`: serve a configured route table.
//!
//! # Architecture Overview
//!
//! ```text
//!     site.toml ──▶ config (load, validate) ──▶ apply (register routes)
//!                                                   │
//!                                                   ▼
//!     ┌──────────┐   loaded    ┌────────────┐   ┌─────────┐
//!     │ SiteHost │────────────▶│ SiteRouter │──▶│ Router  │──▶ middleware ──▶ handler
//!     └──────────┘             └────────────┘   └─────────┘
//!          ▲                         │
//!          │ deferred (404)          │ handled: emit + terminate
//!          └─────────────────────────┘
//!
//!     front-ends:  serve (axum, hot reload)  |  cgi (one process per request)
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use site_router::config::{load_config, ConfigWatcher, SiteConfig};
use site_router::host::cgi::run_cgi;
use site_router::http::HttpServer;
use site_router::lifecycle::{signals, Shutdown};
use site_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "site-router", version, about = "Route requests for a site installed under a base path")]
struct Cli {
    /// Path to the TOML site configuration.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Reload routes when the config file changes.
        #[arg(long)]
        watch: bool,
    },
    /// Handle the single request described by the CGI environment.
    Cgi,
    /// Print the registered route table.
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SiteConfig::default(),
    };
    logging::init_logging(&config.observability.log_level);

    match cli.command {
        Command::Serve { watch } => serve(config, cli.config, watch).await,
        Command::Cgi => {
            run_cgi(&config)?;
            Ok(())
        }
        Command::Routes => print_routes(config),
    }
}

async fn serve(config: SiteConfig, path: Option<PathBuf>, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        site_url = %config.site_url,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let (_watcher, config_updates) = match (&path, watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        (None, true) => {
            tracing::warn!("--watch needs --config, hot reload disabled");
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move { signals::shutdown_on_ctrl_c(&shutdown).await });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(config: SiteConfig) -> Result<(), Box<dyn std::error::Error>> {
    let server = HttpServer::new(config)?;
    let served = server.state().site.load();
    let router = served.site.router();

    println!("base path: {}", router.base_path());
    for route in router.routes() {
        let methods = route
            .methods()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("|");
        println!("{:<16} {:<40} {}", methods, route.uri(), route.name().unwrap_or("-"));
    }
    Ok(())
}
