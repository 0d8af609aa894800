use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use mealpass::canteen::verification::{
    verification_router, AttendanceProvider, EmployeeDirectory, MealLedger, MealSessionProvider,
    MealVerificationService, RuleProvider,
};
use serde_json::json;
use std::sync::Arc;

/// Kiosk-facing verification routes plus the operational endpoints every
/// deployment of this service carries.
pub(crate) fn with_verification_routes<D, S, A, L, R>(
    service: Arc<MealVerificationService<D, S, A, L, R>>,
) -> axum::Router
where
    D: EmployeeDirectory + 'static,
    S: MealSessionProvider + 'static,
    A: AttendanceProvider + 'static,
    L: MealLedger + 'static,
    R: RuleProvider + 'static,
{
    verification_router(service)
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
