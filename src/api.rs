use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::error::CacheError;
use crate::timeline::{CycleOutcome, TimelineService, TimelineSnapshot};

#[derive(Clone)]
pub struct AppState {
    service: Arc<TimelineService>,
}

/// Timeline routes. `/metrics` is merged in by the binary, which owns the recorder.
pub fn create_router(service: Arc<TimelineService>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/timeline", get(get_timeline))
        .route("/timeline/load", post(load_timeline))
        .route("/timeline/refresh", post(refresh_timeline))
        .route("/timeline/cache", delete(clear_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(AppState { service })
}

#[derive(Debug, Serialize)]
pub struct TimelineResp {
    #[serde(flatten)]
    pub snapshot: TimelineSnapshot,
    pub show_full_error: bool,
    pub is_stale: bool,
}

#[derive(Debug, Serialize)]
pub struct CycleResp {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<crate::timeline::SkipReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error_details: Vec<String>,
    pub timeline: TimelineResp,
}

type ApiError = (StatusCode, String);

async fn timeline_resp(service: &TimelineService) -> TimelineResp {
    let snapshot = service.snapshot().await;
    TimelineResp {
        show_full_error: snapshot.show_full_error(),
        is_stale: service.is_stale().await,
        snapshot,
    }
}

async fn get_timeline(State(state): State<AppState>) -> Json<TimelineResp> {
    Json(timeline_resp(&state.service).await)
}

async fn load_timeline(State(state): State<AppState>) -> Result<Json<CycleResp>, ApiError> {
    run_cycle(state.service, false).await
}

async fn refresh_timeline(State(state): State<AppState>) -> Result<Json<CycleResp>, ApiError> {
    run_cycle(state.service, true).await
}

async fn run_cycle(service: Arc<TimelineService>, force: bool) -> Result<Json<CycleResp>, ApiError> {
    // Detached so a dropped request cannot cancel a cycle halfway.
    let svc = service.clone();
    let outcome = tokio::spawn(async move {
        if force {
            svc.refresh_events().await
        } else {
            svc.load_events().await
        }
    })
    .await
    .map_err(|e| {
        tracing::error!(target: "timeline", error = %e, "cycle task failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "refresh cycle failed".to_string())
    })?;

    let (skipped, error_details) = match &outcome {
        CycleOutcome::Skipped(reason) => (Some(*reason), Vec::new()),
        CycleOutcome::FellBackToCache { error, .. } | CycleOutcome::Failed { error } => {
            (None, error.details())
        }
        CycleOutcome::Updated { .. } => (None, Vec::new()),
    };

    Ok(Json(CycleResp {
        outcome: outcome.label(),
        skipped,
        error_details,
        timeline: timeline_resp(&service).await,
    }))
}

async fn clear_cache(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state
        .service
        .clear_all_caches()
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| match e {
            CacheError::Busy => (StatusCode::CONFLICT, e.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        })
}
