use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use seoquote_core::QuoteRuntime;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    runtime: Arc<dyn QuoteRuntime>,
    proposal_provider: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub proposal: HealthCheck,
    pub checked_at: String,
}

pub fn router(runtime: Arc<dyn QuoteRuntime>, proposal_provider: impl Into<String>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { runtime, proposal_provider: proposal_provider.into() })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let tiers = state.runtime.catalog().iter().count();

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "seoquote-server runtime initialized".to_string(),
        },
        catalog: HealthCheck { status: "ready", detail: format!("{tiers} tiers available") },
        // Proposal failures degrade to fallback text, so they never fail health.
        proposal: HealthCheck {
            status: "ready",
            detail: format!("{} client configured", state.proposal_provider),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
