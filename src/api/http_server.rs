// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::{sync::Arc, time::Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::errors::{ApiError, ApiErrorResponse};
use super::handlers::{ClearCacheResponse, HealthResponse, IndexResponse, SearchParams};
use crate::catalog::{AnimeDetail, CatalogService, HomeResponse, SearchResponse, StreamResult};
use crate::config::RelayConfig;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog: Arc::new(catalog),
            started_at: Instant::now(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service index
        .route("/", get(index_handler))
        .route("/home", get(home_handler))
        .route("/search", get(search_handler))
        .route("/detail/*path", get(detail_handler))
        .route("/stream/*path", get(stream_handler))
        .route("/cache/clear", post(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: RelayConfig) -> anyhow::Result<()> {
    let catalog = CatalogService::from_config(&config)?;
    let app = create_router(AppState::new(catalog));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Relay for {} listening on {}", config.origin, addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse::new(state.catalog.origin().as_str()))
}

async fn home_handler(
    State(state): State<AppState>,
) -> Result<Json<HomeResponse>, ApiErrorResponse> {
    Ok(Json(state.catalog.home().await?))
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiErrorResponse> {
    let query = params.q.ok_or_else(|| {
        ApiError::InvalidRequest("Query parameter 'q' is required".to_string())
    })?;
    Ok(Json(state.catalog.search(&query).await?))
}

async fn detail_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<AnimeDetail>, ApiErrorResponse> {
    Ok(Json(state.catalog.detail(&path).await?))
}

async fn stream_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<StreamResult>, ApiErrorResponse> {
    Ok(Json(state.catalog.stream(&path).await?))
}

async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    state.catalog.clear_cache();
    Json(ClearCacheResponse {
        status: "cleared".to_string(),
    })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let timestamp = Utc::now().timestamp_micros() as f64 / 1_000_000.0;

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        cache_size: state.catalog.cache_size(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
