//! HTTP host: wraps module routers with the shared middleware stack and
//! serves them until cancelled.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
pub mod shutdown;
mod web;

pub use config::ApiIngressConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiIngress {
    config: ApiIngressConfig,
    timeout: Duration,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-request timeout; zero keeps the default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// `routes` plus `/health`, wrapped (outermost first) in:
    /// SetRequestId → PropagateRequestId → Trace → request-id scope →
    /// error envelope → Timeout → BodyLimit → CORS (optional).
    pub fn build_router(&self, routes: Router) -> Router {
        let x_request_id = request_id::header();

        let mut router = routes
            .route("/health", get(web::health_check))
            .fallback(web::not_found);

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                request_id::MakeReqId,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(from_fn(web::envelope_bare_errors))
            .layer(TimeoutLayer::new(self.timeout))
            .map_response(axum::response::IntoResponse::into_response)
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        tracing::debug!(
            timeout_ms = self.timeout.as_millis() as u64,
            body_limit = self.config.body_limit_bytes,
            cors = self.config.cors_enabled,
            "router built"
        );
        router.layer(middleware)
    }

    /// Bind `addr` and serve `router` until `cancel` fires; in-flight
    /// requests are drained first.
    pub async fn serve(&self, addr: &str, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid bind address '{addr}'"))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        serve_on(listener, router, cancel).await
    }
}

pub async fn serve_on(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "HTTP server listening");

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
