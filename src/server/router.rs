use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};
use tower::limit::ConcurrencyLimitLayer;
use uuid::Uuid;

use crate::leads::LeadForwarder;
use crate::rsvp::{Rsvp, RsvpInput, RsvpStore};
use crate::server::error::{ApiError, MessageBody};
use crate::server::health::health;
use crate::update::UpdateService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub updates: UpdateService,
    pub rsvps: RsvpStore,
    pub leads: LeadForwarder,
}

/// Body of `POST /api/config/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
}

pub fn build_router(state: AppState, max_concurrent_requests: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(get_config))
        .route("/api/config/update", post(update_config))
        .route("/api/rsvp", post(upsert_rsvp).get(list_rsvps))
        .route("/api/rsvp/{id}", get(get_rsvp))
        .route("/api/leads", post(submit_lead))
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        .with_state(state)
}

async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(Value::Object(state.updates.current_document().await))
}

async fn update_config(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(request) = payload?;

    let section = request.section.unwrap_or_default();
    let config = match request.config {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Err(ApiError::BadRequest("Config must be an object".to_string())),
    };

    let message = state.updates.apply_update(&section, config).await?;
    Ok(Json(MessageBody::new(message)))
}

async fn upsert_rsvp(
    State(state): State<AppState>,
    payload: Result<Json<RsvpInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Rsvp>), ApiError> {
    let Json(input) = payload?;
    let (record, created) = state.rsvps.upsert(input)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    tracing::info!(id = %record.id, created, "RSVP saved");
    Ok((status, Json(record)))
}

async fn list_rsvps(State(state): State<AppState>) -> Json<Vec<Rsvp>> {
    Json(state.rsvps.list())
}

async fn get_rsvp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Rsvp>, ApiError> {
    Uuid::parse_str(&id)
        .ok()
        .and_then(|id| state.rsvps.get(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("RSVP not found".to_string()))
}

async fn submit_lead(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(fields) = payload?;
    state.leads.submit(fields).await?;
    Ok(Json(MessageBody::new("Lead submitted successfully")))
}
