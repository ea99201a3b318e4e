use std::sync::Arc;

use seoquote_agent::ProposalGenerator;
use seoquote_core::config::{AppConfig, ConfigError, LoadOptions};
use seoquote_core::pricing::catalog::CatalogLoadError;
use seoquote_core::{DeterministicQuoteRuntime, DomainError, QuoteRuntime};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<dyn QuoteRuntime>,
    pub generator: Arc<ProposalGenerator>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("tier catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogLoadError),
    #[error("pricing policy rejected: {0}")]
    Policy(#[source] DomainError),
    #[error("proposal client could not be initialized: {0:#}")]
    ProposalClient(#[source] anyhow::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let (catalog, policy) = config.pricing.resolve_catalog()?;
    let runtime =
        DeterministicQuoteRuntime::with_catalog(catalog, policy).map_err(BootstrapError::Policy)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        catalog_path = config
            .pricing
            .catalog_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "tier catalog loaded"
    );

    let generator =
        ProposalGenerator::from_config(&config).map_err(BootstrapError::ProposalClient)?;
    info!(
        event_name = "system.bootstrap.proposal_client_ready",
        correlation_id = "bootstrap",
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "proposal client initialized"
    );

    Ok(Application { config, runtime: Arc::new(runtime), generator: Arc::new(generator) })
}
