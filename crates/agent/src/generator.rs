use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use seoquote_core::config::{AppConfig, ProposalLanguage};
use seoquote_core::QuoteEvaluation;
use tracing::{info, warn};

use crate::llm::{client_from_config, LlmClient};
use crate::prompt::{PromptRenderer, ProposalContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    EmptyResponse,
    ServiceError,
    Timeout,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty_response",
            Self::ServiceError => "service_error",
            Self::Timeout => "timeout",
        }
    }
}

/// Result of one generation attempt. Failures are still displayable text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalOutcome {
    Generated { text: String },
    Fallback { message: String, reason: FallbackReason },
}

impl ProposalOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { text } => text,
            Self::Fallback { message, .. } => message,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

pub fn fallback_message(language: ProposalLanguage, reason: FallbackReason) -> &'static str {
    match (language, reason) {
        (ProposalLanguage::English, FallbackReason::EmptyResponse) => "Could not generate text.",
        (ProposalLanguage::English, _) => "Error connecting to AI. Please check your connection.",
        (ProposalLanguage::Spanish, FallbackReason::EmptyResponse) => {
            "No se pudo generar el texto."
        }
        (ProposalLanguage::Spanish, _) => {
            "Error al conectar con la IA. Por favor, revisa tu conexión."
        }
    }
}

pub struct ProposalGenerator {
    client: Arc<dyn LlmClient>,
    renderer: PromptRenderer,
    language: ProposalLanguage,
    currency_symbol: String,
    timeout: Duration,
    max_retries: u32,
}

impl ProposalGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        language: ProposalLanguage,
        currency_symbol: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client,
            renderer: PromptRenderer::new()?,
            language,
            currency_symbol: currency_symbol.into(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = client_from_config(&config.llm)?;
        Ok(Self::new(client, config.proposal.language, config.pricing.currency_symbol.clone())?
            .with_timeout(Duration::from_secs(config.llm.timeout_secs))
            .with_max_retries(config.llm.max_retries))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_language(mut self, language: ProposalLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn language(&self) -> ProposalLanguage {
        self.language
    }

    pub fn prompt_for(&self, evaluation: &QuoteEvaluation) -> Result<String> {
        let context = ProposalContext::from_evaluation(evaluation, &self.currency_symbol);
        self.renderer.render(self.language, &context)
    }

    /// Never fails: errors, timeouts and empty replies become fallback text.
    pub async fn generate(&self, evaluation: &QuoteEvaluation) -> ProposalOutcome {
        let prompt = match self.prompt_for(evaluation) {
            Ok(prompt) => prompt,
            Err(error) => {
                warn!(
                    event_name = "proposal.prompt.failed",
                    error = %error,
                    "failed to render proposal prompt"
                );
                return self.fallback(FallbackReason::ServiceError);
            }
        };

        let attempts = self.max_retries.saturating_add(1);
        let mut last_reason = FallbackReason::ServiceError;

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, self.client.complete(&prompt)).await {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    info!(
                        event_name = "proposal.generated",
                        tier = %evaluation.tier.id,
                        attempt,
                        chars = text.len(),
                        "proposal text generated"
                    );
                    return ProposalOutcome::Generated { text };
                }
                Ok(Ok(_)) => {
                    // An empty reply is an answer, not a transport failure.
                    warn!(
                        event_name = "proposal.empty_response",
                        tier = %evaluation.tier.id,
                        attempt,
                        "text service returned no content"
                    );
                    return self.fallback(FallbackReason::EmptyResponse);
                }
                Ok(Err(error)) => {
                    warn!(
                        event_name = "proposal.service_error",
                        attempt,
                        attempts,
                        error = %error,
                        "text service request failed"
                    );
                    last_reason = FallbackReason::ServiceError;
                }
                Err(_) => {
                    warn!(
                        event_name = "proposal.timeout",
                        attempt,
                        attempts,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "text service request timed out"
                    );
                    last_reason = FallbackReason::Timeout;
                }
            }
        }

        self.fallback(last_reason)
    }

    fn fallback(&self, reason: FallbackReason) -> ProposalOutcome {
        ProposalOutcome::Fallback {
            message: fallback_message(self.language, reason).to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use seoquote_core::config::ProposalLanguage;
    use seoquote_core::{
        AddonQuantities, Complexity, DeterministicQuoteRuntime, ProjectConfiguration,
        QuoteEvaluation, QuoteRuntime,
    };

    use super::{FallbackReason, ProposalGenerator, ProposalOutcome};
    use crate::llm::LlmClient;

    struct ScriptedClient {
        replies: Mutex<Vec<Result<String>>>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().expect("prompts lock").push(prompt.to_string());
            let mut replies = self.replies.lock().expect("replies lock");
            if replies.is_empty() {
                return Err(anyhow!("no scripted reply"));
            }
            replies.remove(0)
        }
    }

    struct SlowClient;

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn evaluation() -> QuoteEvaluation {
        DeterministicQuoteRuntime::default().evaluate(
            &ProjectConfiguration::default().with_complexity(Complexity::High),
            &AddonQuantities::new(1, 0, 2),
        )
    }

    #[tokio::test]
    async fn generated_text_is_returned_verbatim() {
        let client = ScriptedClient::new(vec![Ok("## Strategic Challenge\n...".to_string())]);
        let generator = ProposalGenerator::new(client.clone(), ProposalLanguage::English, "€")
            .expect("generator");

        let outcome = generator.generate(&evaluation()).await;
        assert_eq!(outcome, ProposalOutcome::Generated { text: "## Strategic Challenge\n...".into() });
        assert!(outcome.is_generated());

        let prompts = client.prompts.lock().expect("prompts lock");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Recommended plan: International Enterprise"));
        assert!(prompts[0].contains("Extras: 1 extra articles, 0 extra landings, 2 technical sprints."));
    }

    #[tokio::test]
    async fn empty_reply_uses_localized_fallback_without_retry() {
        let client = ScriptedClient::new(vec![Ok("   ".to_string()), Ok("unused".to_string())]);
        let generator = ProposalGenerator::new(client.clone(), ProposalLanguage::Spanish, "€")
            .expect("generator")
            .with_max_retries(2);

        let outcome = generator.generate(&evaluation()).await;
        assert_eq!(
            outcome,
            ProposalOutcome::Fallback {
                message: "No se pudo generar el texto.".to_string(),
                reason: FallbackReason::EmptyResponse,
            }
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn service_errors_are_retried_then_fall_back() {
        let client = ScriptedClient::new(vec![Err(anyhow!("503")), Err(anyhow!("503"))]);
        let generator = ProposalGenerator::new(client.clone(), ProposalLanguage::English, "€")
            .expect("generator")
            .with_max_retries(1);

        let outcome = generator.generate(&evaluation()).await;
        assert_eq!(outcome.text(), "Error connecting to AI. Please check your connection.");
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_recovers_after_transient_error() {
        let client =
            ScriptedClient::new(vec![Err(anyhow!("connection reset")), Ok("Our Solution".to_string())]);
        let generator = ProposalGenerator::new(client.clone(), ProposalLanguage::English, "€")
            .expect("generator")
            .with_max_retries(1);

        let outcome = generator.generate(&evaluation()).await;
        assert_eq!(outcome.text(), "Our Solution");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_service_times_out_into_fallback() {
        let generator = ProposalGenerator::new(Arc::new(SlowClient), ProposalLanguage::English, "€")
            .expect("generator")
            .with_timeout(Duration::from_millis(50));

        let outcome = generator.generate(&evaluation()).await;
        assert_eq!(
            outcome,
            ProposalOutcome::Fallback {
                message: "Error connecting to AI. Please check your connection.".to_string(),
                reason: FallbackReason::Timeout,
            }
        );
    }
}
