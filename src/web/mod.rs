pub mod handlers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::components::{AssistantModel, ScheduleHandle};
use crate::error::Error;
use handlers::{
    agenda_handler, chat_handler, create_event_handler, health_handler, next_week_handler,
    previous_week_handler, schedule_handler, today_handler, view_event_handler, view_handler,
    week_handler,
};

#[derive(Clone)]
pub struct AppState {
    /// Handle to the schedule actor
    pub schedule: ScheduleHandle,
    /// Scheduling assistant, absent when no model is configured
    pub assistant: Option<Arc<dyn AssistantModel>>,
}

/// Crate error rendered as a JSON `{"error": ...}` response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            Error::FetchFailure(_) | Error::Assistant(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/schedule", get(schedule_handler))
        .route("/api/week", get(week_handler))
        .route("/api/week/next", post(next_week_handler))
        .route("/api/week/prev", post(previous_week_handler))
        .route("/api/week/today", post(today_handler))
        .route("/api/agenda", get(agenda_handler))
        .route("/api/events", post(create_event_handler))
        .route("/api/view", get(view_handler).post(view_event_handler))
        .route("/api/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
