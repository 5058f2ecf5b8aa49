// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Minimal HTTP surface (SPEC_FULL §6 [ADDED]) exercising the core engine
// end-to-end. Grounded on `presentation::api::app`/`AppState` from the
// orchestrator lineage: one `AppState` holding `Arc`s to application
// services, handlers returning `impl IntoResponse` via `Json(json!({...}))`,
// no auth or request-validation framework beyond `serde` — the teacher's
// MVP posture, carried forward.

use crate::application::{IncidentService, JobScheduler};
use crate::domain::incident::IncidentId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub incidents: IncidentService,
    pub scheduler: Arc<JobScheduler>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/incidents", post(submit_incident).get(list_incidents))
        .route("/incidents/:id", get(get_incident))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Deserialize)]
struct SubmitIncidentRequest {
    description: String,
}

async fn submit_incident(
    State(state): State<AppState>,
    Json(request): Json<SubmitIncidentRequest>,
) -> impl IntoResponse {
    if request.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "description must not be empty" })),
        );
    }

    if !state.scheduler.is_ready() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "service is not ready to accept new investigations" })),
        );
    }

    match state.scheduler.submit(request.description).await {
        Ok(id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "incident_id": id.to_string(), "status": "pending" })),
        ),
        Err(crate::application::SchedulerError::Unavailable(message)) => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": message })))
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}

async fn get_incident(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let incident_id = match parse_incident_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.incidents.get(incident_id).await {
        Ok(incident) => (StatusCode::OK, Json(json!(incident))),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("incident '{id}' not found") })),
        ),
    }
}

async fn list_incidents(State(state): State<AppState>) -> impl IntoResponse {
    match state.incidents.list().await {
        Ok(incidents) => (StatusCode::OK, Json(json!({ "incidents": incidents }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}

/// Reports readiness per subsystem (spec §6): the LLM provider (was a key
/// configured at startup?), the MCP tool registry (did it connect?), and
/// the incident store (always ready for the in-memory repository). Overall
/// status is `degraded` if any required subsystem isn't ready, rather than
/// a bare "ok" that can't distinguish a healthy service from one that
/// can't actually run an investigation.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let llm_ready = state.scheduler.llm_key_present();
    let tools_ready = state.scheduler.tools_ready();
    let overall = if llm_ready && tools_ready {
        "ok"
    } else {
        "degraded"
    };

    let subsystem = |ready: bool| if ready { "ok" } else { "unavailable" };

    (
        StatusCode::OK,
        Json(json!({
            "status": overall,
            "subsystems": {
                "llm_provider": subsystem(llm_ready),
                "mcp_tool_registry": subsystem(tools_ready),
                "incident_store": "ok",
            }
        })),
    )
}

fn parse_incident_id(raw: &str) -> Result<IncidentId, (StatusCode, Json<serde_json::Value>)> {
    Uuid::from_str(raw)
        .map(IncidentId)
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("'{raw}' is not a valid incident id") })),
            )
        })
}
