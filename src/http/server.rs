//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Forward requests under proxy prefixes to the backend
//! - Serve the health page for browser navigations
//! - Swap in reloaded configuration without restarting

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use futures_util::{future, stream, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validation::validate_config, ConfigError, DevServerConfig, EnvLayer, ViewConfig};
use crate::http::forward::{forward, UpstreamClients};
use crate::http::request::make_request_span;
use crate::lifecycle::startup::Prepared;
use crate::routing::RouteTable;
use crate::view::{render_closing, render_opening, HealthView, HttpHealthProbe, PageContext};

/// Error type for server construction and serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The reloadable part of the configuration.
#[derive(Debug)]
pub struct LiveConfig {
    pub routes: RouteTable,
    pub view: ViewConfig,
    pub max_body_bytes: usize,
}

impl LiveConfig {
    fn from_prepared(prepared: &Prepared) -> Self {
        Self {
            routes: prepared.routes.clone(),
            view: prepared.config.view.clone(),
            max_body_bytes: prepared.config.server.max_body_bytes,
        }
    }

    fn page_context(&self) -> PageContext {
        PageContext {
            title: self.view.title.clone(),
            api_hint_path: self.view.api_hint_path.clone(),
            backend_origin: self.routes.origin().to_string(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    live: Arc<ArcSwap<LiveConfig>>,
    clients: UpstreamClients,
}

/// Applies reloaded configuration to a running server.
#[derive(Clone)]
pub struct ConfigReloader {
    live: Arc<ArcSwap<LiveConfig>>,
    env: EnvLayer,
}

impl ConfigReloader {
    /// Validate and swap in `config`. On error the current routes stay.
    ///
    /// Listener settings (`host`, `port`) only take effect on restart.
    pub fn apply(&self, config: DevServerConfig) -> Result<(), ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let prepared = Prepared::new(config, self.env.clone())?;
        let live = LiveConfig::from_prepared(&prepared);

        tracing::info!(
            backend_origin = %live.routes.origin(),
            rules = live.routes.routes().len(),
            "Configuration reloaded"
        );
        self.live.store(Arc::new(live));
        Ok(())
    }

    pub fn current(&self) -> Arc<LiveConfig> {
        self.live.load_full()
    }
}

/// HTTP server for the dev frontend.
pub struct HttpServer {
    router: Router,
    live: Arc<ArcSwap<LiveConfig>>,
    env: EnvLayer,
    config: DevServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server from prepared startup state.
    pub fn new(prepared: Prepared) -> Result<Self, ServerError> {
        let timeout = prepared.config.proxy.request_timeout_secs.map(Duration::from_secs);
        let clients = UpstreamClients::new(timeout)?;
        let live = Arc::new(ArcSwap::from_pointee(LiveConfig::from_prepared(&prepared)));

        let state = AppState {
            live: live.clone(),
            clients,
        };

        Ok(Self {
            router: Self::build_router(state),
            live,
            env: prepared.env,
            config: prepared.config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn reloader(&self) -> ConfigReloader {
        ConfigReloader {
            live: self.live.clone(),
            env: self.env.clone(),
        }
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<DevServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend_origin = %self.live.load().routes.origin(),
            "Dev server listening"
        );

        let reloader = self.reloader();
        let reload_task = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(e) = reloader.apply(config) {
                    tracing::error!(error = %e, "Rejected config reload, keeping current routes");
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reload_task.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Proxy matching prefixes; serve the page to browser navigations; 404 the rest.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let live = state.live.load_full();

    if let Some(route) = live.routes.match_path(request.uri().path()) {
        let client = state.clients.for_route(route);
        return forward(client, route, request, live.max_body_bytes).await;
    }

    if accepts_html(&request) {
        return health_page(&state.clients, &live);
    }

    tracing::debug!(path = %request.uri().path(), "No route matched");
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn accepts_html(request: &Request<Body>) -> bool {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return false;
    }
    request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html") || accept.contains("*/*"))
        .unwrap_or(false)
}

/// Mount a view and stream the page: the pending page right away, then the
/// settled text once the single check resolves.
///
/// The view lives in the body stream. A client that goes away drops it, and
/// the late result is discarded.
fn health_page(clients: &UpstreamClients, live: &LiveConfig) -> Response {
    let mut view = mount_health_view(clients, &live.routes, &live.view.health_path);
    let opening = render_opening(&live.page_context());

    let closing = async move {
        let outcome = view.settled().await;
        view.unmount();
        Ok::<_, Infallible>(render_closing(&outcome))
    };
    let body = stream::once(future::ready(Ok::<_, Infallible>(opening))).chain(stream::once(closing));

    Html(Body::from_stream(body)).into_response()
}

/// Mount a health view whose check follows the proxy rule for `health_path`.
///
/// Without a matching rule the path would land on the page itself, which is
/// not JSON, so the view settles as unreachable without a request.
pub fn mount_health_view(
    clients: &UpstreamClients,
    routes: &RouteTable,
    health_path: &str,
) -> HealthView {
    match routes.match_path(health_path) {
        Some(route) => HealthView::mount(HttpHealthProbe::new(
            clients.for_route(route).clone(),
            route.target_uri(health_path),
        )),
        None => HealthView::mount_unroutable(),
    }
}
