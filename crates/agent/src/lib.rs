//! Proposal agent - LLM-written executive summaries for a priced quote
//!
//! This crate wraps the one fallible, asynchronous collaborator of the
//! estimator: the external text-generation service that turns an evaluated
//! quote into a short commercial proposal.
//!
//! # Architecture
//!
//! 1. **Prompt rendering** (`prompt`) - quote evaluation → consultant prompt (English or Spanish)
//! 2. **Generation** (`generator`) - prompt → prose, with timeout, retries and fallback text
//! 3. **Sessions** (`session`) - one visible request per user; newer requests supersede older ones
//! 4. **Providers** (`llm`) - Gemini and OpenAI-compatible HTTP clients behind `LlmClient`
//!
//! # Safety Principle
//!
//! The LLM is strictly a copywriter. It NEVER decides tiers or prices. Those
//! come from the deterministic engine in `seoquote-core`, and a failed
//! generation can never alter them.

pub mod generator;
pub mod llm;
pub mod prompt;
pub mod session;

pub use generator::{FallbackReason, ProposalGenerator, ProposalOutcome};
pub use llm::{client_from_config, LlmClient};
pub use session::{ProposalSession, ProposalState, ProposalTicket, SessionUpdate};
