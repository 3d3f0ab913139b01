//! HTTP dispatcher demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────┐    ┌──────────┐    ┌───────────────┐
//!     ───────────────────▶│  http    │───▶│ routing  │───▶│   dispatch    │
//!                         │ server   │    │  trees   │    │ context+chain │
//!                         └──────────┘    └──────────┘    └───────┬───────┘
//!                                                                 │
//!                                                                 ▼
//!     Client Response     ┌──────────┐                    ┌───────────────┐
//!     ◀───────────────────│ response │◀───────────────────│  middleware   │
//!                         │ snapshot │                    │ recovery/     │
//!                         └──────────┘                    │ timeout/cost  │
//!                                                         └───────────────┘
//! ```

use std::path::PathBuf;

use axum::http::StatusCode;
use clap::Parser;
use tokio::net::TcpListener;

use http_dispatch::config::{load_config, DispatcherConfig};
use http_dispatch::middleware::{Cost, Recovery, RequestId, Timeout};
use http_dispatch::observability::{logging, metrics};
use http_dispatch::{chain, Context, HandlerResult, HttpServer, RouteError, Router, Shutdown};

#[derive(Parser)]
#[command(name = "http-dispatch")]
#[command(about = "Trie-routed HTTP dispatcher demo server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatcherConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_ms = config.timeouts.request_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = build_router(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, router);
    let serving = tokio::spawn(server.run(listener, shutdown.signal()));

    shutdown.trigger_on_ctrl_c().await;
    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(config: &DispatcherConfig) -> Result<Router, RouteError> {
    let mut router = Router::new();
    router.use_middleware(chain![Recovery, RequestId, Cost]);
    if let Some(timeout) = config.timeouts.request() {
        router.use_middleware(chain![Timeout::new(timeout)]);
    }

    router.get("/test", chain![hello])?;

    let mut group = router.group("/aaa");
    group.get("/ccc", chain![hello])?;
    group.get("/ccc/:id", chain![show_id])?;

    Ok(router)
}

async fn hello(ctx: Context) -> HandlerResult {
    ctx.set_ok_status().text("hello")
}

async fn show_id(ctx: Context) -> HandlerResult {
    match ctx.param_i64("id") {
        Some(id) => ctx.json(&serde_json::json!({ "id": id })),
        None => ctx
            .set_status(StatusCode::BAD_REQUEST)
            .json("id must be an integer"),
    }
}
