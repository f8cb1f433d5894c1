use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};
use crate::components::schedule::{
    AgendaRow, Navigation, NewEventPayload, RenderedSchedule, ViewEvent, WeekView,
};
use crate::components::assistant::{self, require_prompt, ChatOutcome};
use crate::error::{component_error, validation_error};

/// Week grid plus whether the fetch behind it failed
#[derive(Debug, Serialize, Deserialize)]
pub struct WeekResponse {
    #[serde(flatten)]
    pub week: WeekView,
    pub degraded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgendaResponse {
    pub rows: Vec<AgendaRow>,
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub anchor: Option<String>,
}

impl From<RenderedSchedule> for WeekResponse {
    fn from(rendered: RenderedSchedule) -> Self {
        Self {
            week: rendered.week,
            degraded: rendered.degraded,
        }
    }
}

/// Health check handler
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Refresh and return both the week and the agenda
pub async fn schedule_handler(
    State(state): State<AppState>,
) -> Result<Json<RenderedSchedule>, ApiError> {
    Ok(Json(state.schedule.refresh().await?))
}

/// Render the week, jumping to `anchor` when given
pub async fn week_handler(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, ApiError> {
    let rendered = match query.anchor.as_deref().map(str::trim) {
        Some(anchor) if !anchor.is_empty() => {
            let date = NaiveDate::parse_from_str(anchor, "%Y-%m-%d").map_err(|_| {
                validation_error(&format!("Invalid anchor date: {}", anchor))
            })?;
            state.schedule.navigate(Navigation::To(date)).await?
        }
        _ => state.schedule.refresh().await?,
    };

    Ok(Json(rendered.into()))
}

pub async fn next_week_handler(
    State(state): State<AppState>,
) -> Result<Json<WeekResponse>, ApiError> {
    let rendered = state.schedule.navigate(Navigation::Next).await?;
    Ok(Json(rendered.into()))
}

pub async fn previous_week_handler(
    State(state): State<AppState>,
) -> Result<Json<WeekResponse>, ApiError> {
    let rendered = state.schedule.navigate(Navigation::Previous).await?;
    Ok(Json(rendered.into()))
}

pub async fn today_handler(
    State(state): State<AppState>,
) -> Result<Json<WeekResponse>, ApiError> {
    let rendered = state.schedule.navigate(Navigation::Today).await?;
    Ok(Json(rendered.into()))
}

pub async fn agenda_handler(
    State(state): State<AppState>,
) -> Result<Json<AgendaResponse>, ApiError> {
    let rendered = state.schedule.refresh().await?;
    Ok(Json(AgendaResponse {
        rows: rendered.agenda,
        degraded: rendered.degraded,
    }))
}

/// Create an event through the configured source
pub async fn create_event_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Creating event {:?}", payload.title);
    let submitted = state.schedule.submit_event(payload).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

pub async fn view_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.schedule.current_view().await?))
}

pub async fn view_event_handler(
    State(state): State<AppState>,
    Json(event): Json<ViewEvent>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.schedule.apply_view_event(event).await?))
}

/// Pass a natural-language request to the scheduling assistant
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, ApiError> {
    let prompt = require_prompt(&request.prompt)?;
    let model = state
        .assistant
        .as_ref()
        .ok_or_else(|| component_error("Assistant is not configured"))?;

    let outcome = assistant::ask(model.as_ref(), &state.schedule, prompt).await?;
    Ok(Json(outcome))
}
