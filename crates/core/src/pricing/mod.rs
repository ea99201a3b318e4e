pub mod breakdown;
pub mod catalog;
pub mod estimator;
pub mod policy;
pub mod selector;

use serde::{Deserialize, Serialize};

use crate::domain::{
    addons::AddonQuantities, estimate::EstimatedPrice, project::ProjectConfiguration,
    snapshot::QuoteSnapshot, tier::Tier,
};
use crate::errors::DomainError;

use self::{
    breakdown::CostBreakdown,
    catalog::TierCatalog,
    estimator::{DeterministicPriceEstimator, PriceEstimator},
    policy::PricingPolicy,
    selector::{DeterministicTierSelector, TierSelector},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub snapshot: QuoteSnapshot,
    pub tier: Tier,
    pub estimate: EstimatedPrice,
    pub breakdown: CostBreakdown,
}

pub trait QuoteRuntime: Send + Sync {
    fn catalog(&self) -> &TierCatalog;
    fn policy(&self) -> &PricingPolicy;
    fn evaluate(
        &self,
        configuration: &ProjectConfiguration,
        addons: &AddonQuantities,
    ) -> QuoteEvaluation;
}

/// Catalog and policy are fixed at construction; every evaluation is a pure
/// function of its arguments.
pub struct DeterministicQuoteRuntime<S, E> {
    catalog: TierCatalog,
    policy: PricingPolicy,
    selector: S,
    estimator: E,
}

impl<S, E> DeterministicQuoteRuntime<S, E> {
    pub fn new(
        catalog: TierCatalog,
        policy: PricingPolicy,
        selector: S,
        estimator: E,
    ) -> Result<Self, DomainError> {
        policy.validate()?;
        Ok(Self { catalog, policy, selector, estimator })
    }
}

impl DeterministicQuoteRuntime<DeterministicTierSelector, DeterministicPriceEstimator> {
    pub fn with_catalog(catalog: TierCatalog, policy: PricingPolicy) -> Result<Self, DomainError> {
        Self::new(catalog, policy, DeterministicTierSelector, DeterministicPriceEstimator)
    }
}

impl Default for DeterministicQuoteRuntime<DeterministicTierSelector, DeterministicPriceEstimator> {
    fn default() -> Self {
        Self {
            catalog: TierCatalog::partner_2025(),
            policy: PricingPolicy::partner_2025(),
            selector: DeterministicTierSelector,
            estimator: DeterministicPriceEstimator,
        }
    }
}

impl<S, E> QuoteRuntime for DeterministicQuoteRuntime<S, E>
where
    S: TierSelector,
    E: PriceEstimator,
{
    fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    fn evaluate(
        &self,
        configuration: &ProjectConfiguration,
        addons: &AddonQuantities,
    ) -> QuoteEvaluation {
        let tier = self.catalog.get(self.selector.select(&self.policy, configuration));
        let estimate = self.estimator.estimate(&self.policy, configuration, tier, addons);
        let breakdown = CostBreakdown::build(tier, &estimate, addons);

        QuoteEvaluation {
            snapshot: QuoteSnapshot::new(*configuration, *addons),
            tier: tier.clone(),
            estimate,
            breakdown,
        }
    }
}
