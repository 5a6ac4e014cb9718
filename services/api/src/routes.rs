use crate::infra::AppState;
use appraisal_intake::workflows::intake::address::AddressLookup;
use appraisal_intake::workflows::intake::intake_router;
use appraisal_intake::workflows::intake::session::IntakeSession;
use appraisal_intake::workflows::intake::submission::{NotificationChannel, PersistenceChannel};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_intake_routes<P, N, L>(session: Arc<IntakeSession<P, N, L>>) -> axum::Router
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    intake_router(session)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
