use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use seoquote_agent::{
    LlmClient, ProposalGenerator, ProposalSession, ProposalState, SessionUpdate,
};
use seoquote_core::config::ProposalLanguage;
use seoquote_core::{
    AddonQuantities, Complexity, DeterministicQuoteRuntime, ProjectConfiguration, QuoteRuntime,
    SiteType, TierId,
};
use tokio::sync::Notify;

/// Replies with the tier line of the prompt, optionally waiting for a signal
/// first when the prompt mentions the gated tier.
struct EchoClient {
    gate: Arc<Notify>,
    gated_plan: &'static str,
}

#[async_trait]
impl LlmClient for EchoClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let plan = prompt
            .lines()
            .find(|line| line.contains("Recommended plan:"))
            .ok_or_else(|| anyhow!("prompt without plan"))?
            .trim()
            .to_string();
        if plan.contains(self.gated_plan) {
            self.gate.notified().await;
        }
        Ok(plan)
    }
}

struct FailingClient;

#[async_trait]
impl LlmClient for FailingClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("connection refused"))
    }
}

#[tokio::test]
async fn proposal_text_follows_the_deterministic_quote() {
    let runtime = DeterministicQuoteRuntime::default();
    let evaluation = runtime.evaluate(
        &ProjectConfiguration::default()
            .with_language_count(6)
            .with_complexity(Complexity::High)
            .with_site_type(SiteType::Ecommerce),
        &AddonQuantities::default(),
    );
    assert_eq!(evaluation.tier.id, TierId::Enterprise);

    let client = Arc::new(EchoClient { gate: Arc::new(Notify::new()), gated_plan: "none" });
    let generator =
        ProposalGenerator::new(client, ProposalLanguage::English, "€").expect("generator");
    let session = ProposalSession::new();

    let update = session.generate(&generator, &evaluation).await;
    match update {
        SessionUpdate::Applied(ProposalState::Ready { text, .. }) => {
            assert_eq!(text, "- Recommended plan: International Enterprise");
        }
        other => panic!("unexpected update: {other:?}"),
    }

    // Generation never touches the figures it describes.
    assert_eq!(evaluation.estimate.setup_cost, Decimal::from(2900 * 12 / 10 + 3 * 400));
}

#[tokio::test]
async fn slow_older_request_is_superseded_by_newer_edit() {
    let runtime = DeterministicQuoteRuntime::default();
    let first = runtime.evaluate(
        &ProjectConfiguration::default().with_language_count(1).with_complexity(Complexity::Low),
        &AddonQuantities::default(),
    );
    let second = runtime.evaluate(
        &ProjectConfiguration::default().with_language_count(5),
        &AddonQuantities::default(),
    );
    assert_eq!(first.tier.id, TierId::Starter);

    let gate = Arc::new(Notify::new());
    let client = Arc::new(EchoClient { gate: gate.clone(), gated_plan: "Starter" });
    let generator = Arc::new(
        ProposalGenerator::new(client, ProposalLanguage::English, "€").expect("generator"),
    );
    let session = Arc::new(ProposalSession::new());

    let older = {
        let session = session.clone();
        let generator = generator.clone();
        tokio::spawn(async move { session.generate(&generator, &first).await })
    };
    // Let the older request register before the newer edit arrives.
    while !matches!(session.state(), ProposalState::Generating { sequence: 1, .. }) {
        tokio::task::yield_now().await;
    }

    let newer = session.generate(&generator, &second).await;
    assert!(matches!(newer, SessionUpdate::Applied(ProposalState::Ready { .. })));

    gate.notify_one();
    let older = older.await.expect("older task should join");
    assert_eq!(older, SessionUpdate::Superseded);
    assert_eq!(
        session.state().display_text(),
        Some("- Recommended plan: International Enterprise")
    );
}

#[tokio::test]
async fn connection_failure_surfaces_localized_message_in_place_of_proposal() {
    let evaluation = DeterministicQuoteRuntime::default()
        .evaluate(&ProjectConfiguration::default(), &AddonQuantities::default());
    let generator = ProposalGenerator::new(Arc::new(FailingClient), ProposalLanguage::Spanish, "€")
        .expect("generator")
        .with_max_retries(2);
    let session = ProposalSession::new();

    let update = session.generate(&generator, &evaluation).await;
    match update {
        SessionUpdate::Applied(ProposalState::Failed { message, fingerprint }) => {
            assert_eq!(message, "Error al conectar con la IA. Por favor, revisa tu conexión.");
            assert_eq!(fingerprint, evaluation.snapshot.fingerprint());
        }
        other => panic!("unexpected update: {other:?}"),
    }
}
