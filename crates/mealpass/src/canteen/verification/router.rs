use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::MealSessionId;
use super::providers::{
    AttendanceProvider, EmployeeDirectory, MealLedger, MealSessionProvider, RuleProvider,
};
use super::service::{MealVerificationService, VerificationError, VerificationRequest};

/// Router builder exposing the kiosk verification and rule listing endpoints.
pub fn verification_router<D, S, A, L, R>(
    service: Arc<MealVerificationService<D, S, A, L, R>>,
) -> Router
where
    D: EmployeeDirectory + 'static,
    S: MealSessionProvider + 'static,
    A: AttendanceProvider + 'static,
    L: MealLedger + 'static,
    R: RuleProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/canteen/meals/verify",
            post(verify_handler::<D, S, A, L, R>),
        )
        .route(
            "/api/v1/canteen/sessions/:session_id/rules",
            get(session_rules_handler::<D, S, A, L, R>),
        )
        .with_state(service)
}

/// Both authorized and denied verdicts answer 200; only a provider fault is
/// an HTTP error, so a kiosk can tell "no" apart from "unknown".
pub(crate) async fn verify_handler<D, S, A, L, R>(
    State(service): State<Arc<MealVerificationService<D, S, A, L, R>>>,
    axum::Json(request): axum::Json<VerificationRequest>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    S: MealSessionProvider + 'static,
    A: AttendanceProvider + 'static,
    L: MealLedger + 'static,
    R: RuleProvider + 'static,
{
    match service.verify(&request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(VerificationError::Provider(error)) => {
            tracing::warn!(error = %error, "meal verification provider fault");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn session_rules_handler<D, S, A, L, R>(
    State(service): State<Arc<MealVerificationService<D, S, A, L, R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    S: MealSessionProvider + 'static,
    A: AttendanceProvider + 'static,
    L: MealLedger + 'static,
    R: RuleProvider + 'static,
{
    let id = MealSessionId(session_id);
    match service.session_rules(&id) {
        Ok(rules) => {
            let payload = json!({
                "sessionId": id.0,
                "rules": rules,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(VerificationError::Provider(error)) => {
            tracing::warn!(error = %error, "rule listing provider fault");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
