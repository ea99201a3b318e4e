use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use seoquote_core::{QuoteEvaluation, QuoteSnapshot};
use tracing::{debug, info};

use crate::generator::{fallback_message, FallbackReason, ProposalGenerator, ProposalOutcome};

/// Identifies one generation request. Only the most recent ticket may
/// publish its result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalTicket {
    pub sequence: u64,
    pub fingerprint: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProposalState {
    Idle,
    Generating { sequence: u64, fingerprint: String },
    Ready { text: String, generated_at: DateTime<Utc>, fingerprint: String },
    Failed { message: String, fingerprint: String },
}

impl ProposalState {
    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating { .. })
    }

    /// Text to show in the proposal panel, if any.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::Ready { text, .. } => Some(text),
            Self::Failed { message, .. } => Some(message),
            Self::Idle | Self::Generating { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    Applied(ProposalState),
    Superseded,
}

/// Proposal slot for one user. A newer request supersedes any request
/// still in flight, so a slow older reply can never overwrite a newer one.
#[derive(Debug)]
pub struct ProposalSession {
    sequence: AtomicU64,
    state: Mutex<ProposalState>,
}

impl Default for ProposalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalSession {
    pub fn new() -> Self {
        Self { sequence: AtomicU64::new(0), state: Mutex::new(ProposalState::Idle) }
    }

    pub fn state(&self) -> ProposalState {
        self.lock().clone()
    }

    pub fn begin(&self, snapshot: &QuoteSnapshot) -> ProposalTicket {
        let fingerprint = snapshot.fingerprint();
        let mut state = self.lock();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        *state = ProposalState::Generating { sequence, fingerprint: fingerprint.clone() };
        debug!(event_name = "proposal.session.begin", sequence, fingerprint = %fingerprint);
        ProposalTicket { sequence, fingerprint }
    }

    /// Publishes `outcome` unless a newer request began after `ticket`.
    pub fn complete(&self, ticket: &ProposalTicket, outcome: ProposalOutcome) -> bool {
        let mut state = self.lock();
        let latest = self.sequence.load(Ordering::SeqCst);
        if ticket.sequence != latest {
            info!(
                event_name = "proposal.session.superseded",
                sequence = ticket.sequence,
                latest,
                "discarding stale proposal result"
            );
            return false;
        }

        *state = match outcome {
            ProposalOutcome::Generated { text } => ProposalState::Ready {
                text,
                generated_at: Utc::now(),
                fingerprint: ticket.fingerprint.clone(),
            },
            ProposalOutcome::Fallback { message, .. } => {
                ProposalState::Failed { message, fingerprint: ticket.fingerprint.clone() }
            }
        };
        true
    }

    /// Settles an abandoned request as failed, unless a newer request began
    /// or `ticket` already published.
    pub fn abandon(&self, ticket: &ProposalTicket, message: impl Into<String>) -> bool {
        let mut state = self.lock();
        let latest = self.sequence.load(Ordering::SeqCst);
        let pending = matches!(
            &*state,
            ProposalState::Generating { sequence, .. } if *sequence == ticket.sequence
        );
        if ticket.sequence != latest || !pending {
            return false;
        }

        info!(
            event_name = "proposal.session.abandoned",
            sequence = ticket.sequence,
            "proposal request dropped before completion"
        );
        *state =
            ProposalState::Failed { message: message.into(), fingerprint: ticket.fingerprint.clone() };
        true
    }

    /// Dropping the returned future part-way leaves the session `Failed`,
    /// never stuck in `Generating`.
    pub async fn generate(
        &self,
        generator: &ProposalGenerator,
        evaluation: &QuoteEvaluation,
    ) -> SessionUpdate {
        let mut pending = PendingRequest {
            session: self,
            ticket: self.begin(&evaluation.snapshot),
            cancel_message: fallback_message(generator.language(), FallbackReason::Timeout),
            settled: false,
        };
        let outcome = generator.generate(evaluation).await;
        pending.settled = true;

        if self.complete(&pending.ticket, outcome) {
            SessionUpdate::Applied(self.state())
        } else {
            SessionUpdate::Superseded
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProposalState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct PendingRequest<'a> {
    session: &'a ProposalSession,
    ticket: ProposalTicket,
    cancel_message: &'static str,
    settled: bool,
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.abandon(&self.ticket, self.cancel_message);
        }
    }
}
