//! Frontend dev server.
//!
//! Serves the health display page and proxies backend paths during local
//! development.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 DEV SERVER                   │
//!                        │                                              │
//!   Browser request      │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!   ─────────────────────┼─▶│   net   │──▶│  http   │──▶│  routing   │  │
//!                        │  │listener │   │ server  │   │   table    │  │
//!                        │  └─────────┘   └─────────┘   └─────┬──────┘  │
//!                        │                       ┌────────────┴───┐      │
//!                        │                       ▼                ▼      │
//!                        │              ┌──────────────┐  ┌────────────┐ │
//!   Page / response      │              │ health view  │  │  forward   │─┼──▶ Backend
//!   ◀────────────────────┼──────────────│ mount+render │  │ /api /health│ │    origin
//!                        │              └──────────────┘  └────────────┘ │
//!                        │                                              │
//!                        │  config (file + .env + env) · lifecycle ·    │
//!                        │  observability                               │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use frontend_devserver::config::{watcher::ConfigWatcher, DEFAULT_MODE};
use frontend_devserver::lifecycle::signals::spawn_signal_listener;
use frontend_devserver::lifecycle::startup::{prepare, StartupOptions};
use frontend_devserver::net::bind_listener;
use frontend_devserver::observability::{logging, metrics};
use frontend_devserver::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "frontend-devserver")]
#[command(about = "Dev server for the health display frontend", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mode selecting `.env.<mode>` files.
    #[arg(short, long, default_value = DEFAULT_MODE)]
    mode: String,

    /// Directory holding the `.env` files.
    #[arg(long, default_value = ".")]
    env_dir: PathBuf,

    /// Override `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Reload proxy rules when the config file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let options = StartupOptions {
        config_path: args.config.clone(),
        mode: args.mode,
        env_dir: args.env_dir,
        host: args.host,
        port: args.port,
    };

    // The log level lives in the config; a failed load still gets logged at info.
    let prepared = match prepare(&options) {
        Ok(prepared) => {
            logging::init(&prepared.config.observability.log_level);
            prepared
        }
        Err(e) => {
            logging::init("info");
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    tracing::info!("frontend-devserver v{} starting", env!("CARGO_PKG_VERSION"));
    prepared.log_summary(&options.mode);

    let observability = prepared.config.observability.clone();
    if observability.metrics_enabled {
        match observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                metrics::init_metrics(addr).await;
            }
            Err(e) => tracing::error!(
                metrics_address = %observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = bind_listener(&prepared.config.server).await?;

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        (None, true) => {
            tracing::warn!("--watch needs --config; hot reload disabled");
            (mpsc::unbounded_channel().1, None)
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(prepared)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
