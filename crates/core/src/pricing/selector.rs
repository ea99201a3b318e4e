use crate::domain::{
    project::{Complexity, ProjectConfiguration, SiteType},
    tier::{Tier, TierId},
};
use crate::pricing::{catalog::TierCatalog, policy::PricingPolicy};

pub trait TierSelector: Send + Sync {
    fn select(&self, policy: &PricingPolicy, configuration: &ProjectConfiguration) -> TierId;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicTierSelector;

impl TierSelector for DeterministicTierSelector {
    fn select(&self, policy: &PricingPolicy, configuration: &ProjectConfiguration) -> TierId {
        select_tier_id(policy, configuration)
    }
}

/// Ordered rules, first match wins. Enterprise triggers are checked before
/// Growth triggers. Add-ons never influence the result.
pub fn select_tier_id(policy: &PricingPolicy, configuration: &ProjectConfiguration) -> TierId {
    let thresholds = &policy.thresholds;

    if configuration.language_count >= thresholds.enterprise_min_languages
        || configuration.site_type == SiteType::Enterprise
        || configuration.complexity == Complexity::High
    {
        return TierId::Enterprise;
    }

    if configuration.language_count >= thresholds.growth_min_languages
        || configuration.site_type == SiteType::Ecommerce
        || configuration.complexity == Complexity::Medium
    {
        return TierId::Growth;
    }

    TierId::Starter
}

pub fn select_tier<'a>(
    catalog: &'a TierCatalog,
    policy: &PricingPolicy,
    configuration: &ProjectConfiguration,
) -> &'a Tier {
    catalog.get(select_tier_id(policy, configuration))
}
