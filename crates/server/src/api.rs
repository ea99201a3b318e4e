use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use seoquote_agent::{ProposalGenerator, ProposalSession, ProposalState, SessionUpdate};
use seoquote_core::config::ServerConfig;
use seoquote_core::{
    ApplicationError, InterfaceError, QuoteEvaluation, QuoteRuntime, QuoteSnapshot, TierCatalog,
};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAX_SESSION_ID_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(3600), max_sessions: 10_000 }
    }
}

impl SessionLimits {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            ttl: Duration::from_secs(server.session_ttl_secs),
            max_sessions: usize::try_from(server.max_sessions).unwrap_or(usize::MAX),
        }
    }
}

struct SessionEntry {
    session: Arc<ProposalSession>,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<dyn QuoteRuntime>,
    generator: Arc<ProposalGenerator>,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    limits: SessionLimits,
}

impl ApiState {
    pub fn new(runtime: Arc<dyn QuoteRuntime>, generator: Arc<ProposalGenerator>) -> Self {
        Self {
            runtime,
            generator,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            limits: SessionLimits::default(),
        }
    }

    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    fn session(&self, session_id: &str) -> Arc<ProposalSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.last_seen = now;
            return entry.session.clone();
        }

        self.prune(&mut sessions, now);
        let session = Arc::new(ProposalSession::new());
        sessions.insert(
            session_id.to_string(),
            SessionEntry { session: session.clone(), last_seen: now },
        );
        session
    }

    fn existing_session(&self, session_id: &str) -> Option<Arc<ProposalSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = sessions.get_mut(session_id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Makes room for one more session. Expired sessions go first, then the
    /// least recently touched ones while the map is full.
    fn prune(&self, sessions: &mut HashMap<String, SessionEntry>, now: Instant) {
        let before = sessions.len();
        let ttl = self.limits.ttl;
        sessions.retain(|_, entry| {
            entry.session.state().is_generating() || now.duration_since(entry.last_seen) < ttl
        });

        while !sessions.is_empty() && sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(session_id, _)| session_id.clone());
            match oldest {
                Some(session_id) => sessions.remove(&session_id),
                None => break,
            };
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(
                event_name = "api.sessions.evicted",
                evicted,
                retained = sessions.len(),
                "dropped idle proposal sessions"
            );
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/tiers", get(list_tiers))
        .route("/api/v1/estimate", post(estimate))
        .route("/api/v1/proposals/{session_id}", post(generate_proposal).get(proposal_state))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub correlation_id: String,
}

pub struct ApiError(InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(
            event_name = "api.request.rejected",
            correlation_id = %self.0.correlation_id(),
            error = %self.0,
            "request rejected"
        );
        let body =
            ErrorBody { error: self.0.user_message(), correlation_id: self.0.correlation_id().to_string() };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub session_id: String,
    pub superseded: bool,
    pub proposal: ProposalState,
}

async fn list_tiers(State(state): State<ApiState>) -> Json<TierCatalog> {
    Json(state.runtime.catalog().clone())
}

async fn estimate(
    State(state): State<ApiState>,
    Json(snapshot): Json<QuoteSnapshot>,
) -> Result<Json<QuoteEvaluation>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let evaluation = evaluate(&state, &snapshot, &correlation_id)?;
    Ok(Json(evaluation))
}

async fn generate_proposal(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Json(snapshot): Json<QuoteSnapshot>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    validate_session_id(&session_id, &correlation_id)?;
    let evaluation = evaluate(&state, &snapshot, &correlation_id)?;

    let session = state.session(&session_id);
    let update = session.generate(&state.generator, &evaluation).await;
    let superseded = update == SessionUpdate::Superseded;
    info!(
        event_name = "api.proposal.completed",
        correlation_id = %correlation_id,
        session_id = %session_id,
        superseded,
        "proposal request completed"
    );

    let proposal = match update {
        SessionUpdate::Applied(state) => state,
        SessionUpdate::Superseded => session.state(),
    };
    Ok(Json(ProposalResponse { session_id, superseded, proposal }))
}

async fn proposal_state(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    validate_session_id(&session_id, &correlation_id)?;

    let proposal = state
        .existing_session(&session_id)
        .map(|session| session.state())
        .unwrap_or(ProposalState::Idle);
    Ok(Json(ProposalResponse { session_id, superseded: false, proposal }))
}

fn evaluate(
    state: &ApiState,
    snapshot: &QuoteSnapshot,
    correlation_id: &str,
) -> Result<QuoteEvaluation, ApiError> {
    snapshot
        .configuration
        .validate()
        .map_err(|error| ApiError(ApplicationError::from(error).into_interface(correlation_id)))?;

    let evaluation = state.runtime.evaluate(&snapshot.configuration, &snapshot.addons);
    info!(
        event_name = "api.quote.evaluated",
        correlation_id = %correlation_id,
        tier = %evaluation.tier.id,
        setup_cost = %evaluation.estimate.setup_cost,
        monthly_cost = %evaluation.estimate.monthly_cost,
        "quote evaluated"
    );
    Ok(evaluation)
}

fn validate_session_id(session_id: &str, correlation_id: &str) -> Result<(), ApiError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        return Ok(());
    }
    Err(ApiError(InterfaceError::BadRequest {
        message: format!("invalid session id `{session_id}`"),
        correlation_id: correlation_id.to_string(),
    }))
}
