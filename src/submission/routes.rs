//! REST endpoints for submitting and listing stock requests.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::{error, info, warn};

use super::model::SubmissionPayload;
use crate::config::{DeliveryMode, IntakeConfig};
use crate::error::ValidationError;
use crate::notify::Dispatcher;
use crate::store::SubmissionStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    pub dispatcher: Dispatcher,
    pub intake: IntakeConfig,
}

/// Build the intake routes: `POST`/`GET /back-in-stock` and `GET /health`.
pub fn submission_routes(state: AppState) -> Router {
    Router::new()
        .route("/back-in-stock", get(list_submissions).post(submit))
        .route("/health", get(health))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "stock-notify"
    }))
}

// ── Intake ──────────────────────────────────────────────────────────────

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": self.to_string()})),
        )
            .into_response()
    }
}

/// POST /back-in-stock
///
/// Validates, records, then notifies. The record is in the store before the
/// notification is dispatched and before the response leaves.
async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let err = ValidationError::InvalidBody(rejection.body_text());
            warn!(error = ?err, "Rejected malformed submission");
            return err.into_response();
        }
    };

    let record = match payload.validate(state.intake.default_request_type) {
        Ok(record) => record,
        Err(err) => {
            warn!(error = ?err, "Rejected submission");
            return err.into_response();
        }
    };

    if let Err(e) = state.store.append(record.clone()).await {
        error!(submission_id = %record.id(), error = %e, "Failed to record submission");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "Failed to record submission"})),
        )
            .into_response();
    }

    info!(
        submission_id = %record.id(),
        request_type = %record.request_type(),
        email = %record.email(),
        product_id = %record.product_id(),
        product_title = record.product_title().unwrap_or("-"),
        "New submission recorded"
    );

    match state.intake.delivery_mode {
        DeliveryMode::Queued => {
            // Not awaited: the caller never waits on SMTP.
            drop(state.dispatcher.dispatch(record));
            Json(json!({"success": true, "queued": true})).into_response()
        }
        DeliveryMode::Await => {
            let emailed = state.dispatcher.deliver(&record).await;
            Json(json!({"success": true, "emailed": emailed})).into_response()
        }
    }
}

/// GET /back-in-stock
///
/// Every recorded submission, oldest first. Unauthenticated; for operator debugging.
async fn list_submissions(State(state): State<AppState>) -> Response {
    match state.store.list_all().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list submissions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "Failed to list submissions"})),
            )
                .into_response()
        }
    }
}
