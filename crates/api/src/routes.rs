use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use orbit_core::aggregate;
use orbit_core::domain::neo::NeoFeed;
use orbit_core::domain::summary::DashboardSummary;
use orbit_core::nasa::{RoverPhotoQuery, SpaceDataProvider};

use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn SpaceDataProvider>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/dashboard/summary", get(dashboard_summary))
        .route("/neo/feed", get(neo_feed))
        .route("/neo/stats", get(neo_stats))
        .route("/mars/rovers", get(mars_rovers))
        .route("/mars/rovers/:rover/photos", get(rover_photos))
        .route("/mars/rovers/:rover/latest_photos", get(rover_latest_photos))
        .route("/apod", get(apod))
        .route("/apod/random", get(apod_random));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

/// Any origin, method and header, with credentials. A literal `*` is not allowed
/// alongside credentials, so the request's own values are mirrored back.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = aggregate::dashboard_summary(state.provider.as_ref()).await?;
    Ok(Json(summary))
}

async fn neo_feed(State(state): State<AppState>) -> Json<NeoFeed> {
    Json(aggregate::neo_feed(state.provider.as_ref()).await)
}

async fn neo_stats(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.provider.neo_stats().await?))
}

async fn mars_rovers(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.provider.mars_rovers().await?))
}

async fn rover_photos(
    State(state): State<AppState>,
    Path(rover): Path<String>,
    Query(query): Query<RoverPhotoQuery>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.provider.rover_photos(&rover, &query).await?))
}

async fn rover_latest_photos(
    State(state): State<AppState>,
    Path(rover): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.provider.rover_latest_photos(&rover).await?))
}

#[derive(Debug, Deserialize)]
struct ApodQuery {
    date: Option<String>,
}

async fn apod(
    State(state): State<AppState>,
    Query(query): Query<ApodQuery>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.provider.apod(query.date.as_deref()).await?))
}

#[derive(Debug, Deserialize)]
struct RandomApodQuery {
    #[serde(default = "default_random_count")]
    count: u32,
}

fn default_random_count() -> u32 {
    1
}

async fn apod_random(
    State(state): State<AppState>,
    Query(query): Query<RandomApodQuery>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.provider.apod_random(query.count).await?))
}
