//! Root, health and info endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::server::AppState;

/// Body of `GET /`.
#[derive(Serialize)]
pub struct RootResponse {
    message: String,
    version: String,
    health: &'static str,
    leads: &'static str,
    campaigns: &'static str,
}

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// Body of `GET /info`.
#[derive(Serialize)]
pub struct InfoResponse {
    app_name: String,
    version: String,
    environment: String,
    llm_model: String,
}

/// Entry point listing the main routes.
pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} API", state.settings.app_name),
        version: state.settings.app_version.clone(),
        health: "/health",
        leads: "/api/v1/leads",
        campaigns: "/api/v1/campaigns/run",
    })
}

/// Liveness check; does not touch collaborators.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ai-sales-crm",
    })
}

/// Application name, version, environment and model.
pub async fn info_handler(State(state): State<AppState>) -> Json<InfoResponse> {
    let settings = &state.settings;
    Json(InfoResponse {
        app_name: settings.app_name.clone(),
        version: settings.app_version.clone(),
        environment: settings.environment.clone(),
        llm_model: settings.llm_model.clone(),
    })
}
