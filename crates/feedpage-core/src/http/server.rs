//! HTTP server for the feed API
//!
//! Binds a TCP listener and serves the routes in `protocol::routes` until the
//! shutdown channel flips to `true`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::protocol::*;
use crate::config::ServerConfig;
use crate::pager::FeedPager;
use crate::Result;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pager: Arc<FeedPager>,
    start_time: Instant,
}

impl AppState {
    pub fn new(pager: Arc<FeedPager>) -> Self {
        Self {
            pager,
            start_time: Instant::now(),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(routes::FEED, get(list_feed))
        .route(routes::VALUES, get(list_values))
        .route(routes::HEALTH, get(health))
        .route(routes::STATUS, get(status))
        .with_state(state)
}

/// HTTP server owning the listener lifecycle
pub struct HttpServer {
    pager: Arc<FeedPager>,
    bind_addr: String,
}

impl HttpServer {
    pub fn new(pager: Arc<FeedPager>, config: &ServerConfig) -> Self {
        Self {
            pager,
            bind_addr: config.bind_addr.clone(),
        }
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        self.serve(listener, shutdown_rx).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        info!(
            "HTTP server listening on: {} (strategy: {})",
            listener.local_addr()?,
            self.pager.strategy()
        );

        let app = router(AppState::new(Arc::clone(&self.pager)));
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
            .await?;

        info!("HTTP server shut down");
        Ok(())
    }
}

/// Resolve once the flag is set or the sender is gone
async fn wait_for_shutdown(mut shutdown_rx: watch::Receiver<bool>) {
    while !*shutdown_rx.borrow() {
        if shutdown_rx.changed().await.is_err() {
            break;
        }
    }
}

async fn list_feed(
    State(state): State<AppState>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> std::result::Result<Json<PageResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    async move {
        let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
        let request = params.into_request()?;
        debug!("Listing page {} (size {})", request.page(), request.page_size());

        let result = state.pager.list_page(&request).await?;
        Ok::<_, ApiError>(Json(PageResponse::from(result)))
    }
    .instrument(info_span!("list_feed", %request_id))
    .await
}

async fn list_values(
    State(state): State<AppState>,
    params: std::result::Result<Query<ValuesParams>, QueryRejection>,
) -> std::result::Result<Json<Vec<String>>, ApiError> {
    let request_id = Uuid::new_v4();
    async move {
        let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
        let request = params.page_request()?;
        let keys = params.key_list();
        debug!("Reading {} keys, page {}", keys.len(), request.page());

        let values = state.pager.values_page(&keys, &request).await?;
        Ok::<_, ApiError>(Json(values))
    }
    .instrument(info_span!("list_values", %request_id))
    .await
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.pager.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        strategy: state.pager.strategy().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
