use rust_decimal::Decimal;

use crate::domain::{
    addons::{AddonKind, AddonQuantities},
    estimate::{EstimatedPrice, PricingTrace, PricingTraceStep},
    project::{Complexity, ProjectConfiguration},
    tier::Tier,
};
use crate::pricing::policy::PricingPolicy;

pub trait PriceEstimator: Send + Sync {
    fn estimate(
        &self,
        policy: &PricingPolicy,
        configuration: &ProjectConfiguration,
        tier: &Tier,
        addons: &AddonQuantities,
    ) -> EstimatedPrice;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPriceEstimator;

impl PriceEstimator for DeterministicPriceEstimator {
    fn estimate(
        &self,
        policy: &PricingPolicy,
        configuration: &ProjectConfiguration,
        tier: &Tier,
        addons: &AddonQuantities,
    ) -> EstimatedPrice {
        estimate(policy, configuration, tier, addons)
    }
}

/// Quotes the low end of the tier's ranges, loads setup for risk, then adds
/// extra-language and add-on charges. Total over every input.
pub fn estimate(
    policy: &PricingPolicy,
    configuration: &ProjectConfiguration,
    tier: &Tier,
    addons: &AddonQuantities,
) -> EstimatedPrice {
    let mut steps = Vec::new();
    let mut setup = tier.setup_range.low;
    let mut monthly = tier.monthly_range.low;
    steps.push(step("base", format!("{} low-end ranges", tier.name), setup, monthly));

    if configuration.complexity == Complexity::High {
        setup = capped_mul(setup, policy.multipliers.high_complexity);
        steps.push(step(
            "high_complexity",
            format!("setup x{}", policy.multipliers.high_complexity),
            setup,
            monthly,
        ));
    }
    if configuration.technical_debt == Complexity::High {
        setup = capped_mul(setup, policy.multipliers.high_technical_debt);
        steps.push(step(
            "high_technical_debt",
            format!("setup x{}", policy.multipliers.high_technical_debt),
            setup,
            monthly,
        ));
    }

    let allowance = policy.allowance.for_tier(tier.id);
    let extra_language_count = configuration.language_count.saturating_sub(allowance);
    if extra_language_count > 0 {
        let extras = Decimal::from(extra_language_count);
        setup = capped_add(setup, capped_mul(extras, policy.languages.setup_per_extra));
        monthly = capped_add(monthly, capped_mul(extras, policy.languages.monthly_per_extra));
        steps.push(step(
            "extra_languages",
            format!(
                "{extra_language_count} beyond the {allowance} included (setup +{} each, monthly +{} each)",
                policy.languages.setup_per_extra, policy.languages.monthly_per_extra
            ),
            setup,
            monthly,
        ));
    }

    for (kind, quantity) in addons.selected() {
        monthly =
            capped_add(monthly, capped_mul(Decimal::from(quantity), policy.addons.unit_price(kind)));
        steps.push(step(
            addon_stage(kind),
            format!("{quantity} x {}", policy.addons.unit_price(kind)),
            setup,
            monthly,
        ));
    }

    let setup_cost = policy.rounding.round(setup);
    let monthly_cost = policy.rounding.round(monthly);
    steps.push(step(
        "rounding",
        format!("{:?} to whole currency units", policy.rounding),
        setup_cost,
        monthly_cost,
    ));

    EstimatedPrice {
        setup_cost,
        monthly_cost,
        recommended_linkbuilding_low: tier.linkbuilding_range.low,
        recommended_linkbuilding_high: tier.linkbuilding_range.high,
        extra_language_count,
        trace: PricingTrace { tier: tier.id, steps },
    }
}

fn addon_stage(kind: AddonKind) -> &'static str {
    match kind {
        AddonKind::ExtraArticle => "extra_articles",
        AddonKind::ExtraLanding => "extra_landings",
        AddonKind::ExtraTechSprint => "extra_tech_sprints",
    }
}

// Amounts and rates are non-negative, so overflow can only go upwards.
fn capped_mul(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_mul(rhs).unwrap_or(Decimal::MAX)
}

fn capped_add(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_add(rhs).unwrap_or(Decimal::MAX)
}

fn step(stage: &str, detail: String, setup: Decimal, monthly: Decimal) -> PricingTraceStep {
    PricingTraceStep { stage: stage.to_string(), detail, setup, monthly }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::estimate;
    use crate::domain::{
        addons::{AddonKind, AddonQuantities},
        project::{Complexity, ProjectConfiguration, SiteType},
        tier::{PriceRange, TierId},
    };
    use crate::pricing::{
        catalog::TierCatalog,
        policy::{PricingPolicy, RoundingMode},
        selector::select_tier,
    };

    fn low_blog(languages: u32) -> ProjectConfiguration {
        ProjectConfiguration {
            language_count: languages,
            complexity: Complexity::Low,
            site_type: SiteType::BlogOrSaas,
            technical_debt: Complexity::Low,
            content_volume: Complexity::Low,
        }
    }

    fn no_addons() -> AddonQuantities {
        AddonQuantities::default()
    }

    #[test]
    fn oversized_policy_prices_saturate_instead_of_overflowing() {
        let catalog = TierCatalog::partner_2025();
        let mut policy = PricingPolicy::default();
        policy.addons.landing = Decimal::MAX;
        policy.languages.setup_per_extra = Decimal::MAX;
        let configuration = low_blog(u32::MAX).with_complexity(Complexity::High);
        let tier = select_tier(&catalog, &policy, &configuration);
        assert!(policy.validate().is_ok());

        let price = estimate(&policy, &configuration, tier, &AddonQuantities::new(0, u32::MAX, 0));

        assert_eq!(price.setup_cost, Decimal::MAX);
        assert_eq!(price.monthly_cost, Decimal::MAX);
    }

    #[test]
    fn starter_baseline_quotes_low_end_exactly() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let configuration = low_blog(1);
        let tier = select_tier(&catalog, &policy, &configuration);

        let price = estimate(&policy, &configuration, tier, &no_addons());

        assert_eq!(tier.id, TierId::Starter);
        assert_eq!(price.extra_language_count, 0);
        assert_eq!(price.setup_cost, Decimal::from(1300));
        assert_eq!(price.monthly_cost, Decimal::from(850));
        assert_eq!(price.recommended_linkbuilding_low, Decimal::from(200));
        assert_eq!(price.recommended_linkbuilding_high, Decimal::from(400));
    }

    #[test]
    fn growth_with_five_languages_charges_three_extras() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let growth = catalog.get(TierId::Growth);

        let price = estimate(&policy, &low_blog(5), growth, &no_addons());
        assert_eq!(price.extra_language_count, 3);
        assert_eq!(price.setup_cost, Decimal::from(1800 + 3 * 400));
        assert_eq!(price.monthly_cost, Decimal::from(1350 + 3 * 400));

        let loaded = low_blog(5)
            .with_complexity(Complexity::High)
            .with_technical_debt(Complexity::High);
        let price = estimate(&policy, &loaded, growth, &no_addons());
        // 1800 x 1.2 x 1.1 = 2376
        assert_eq!(price.setup_cost, Decimal::from(2376 + 1200));
        assert_eq!(price.monthly_cost, Decimal::from(1350 + 1200));
    }

    #[test]
    fn risk_multipliers_apply_to_setup_only_and_compose() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let enterprise = catalog.get(TierId::Enterprise);

        let complexity_only = low_blog(1).with_complexity(Complexity::High);
        let price = estimate(&policy, &complexity_only, enterprise, &no_addons());
        assert_eq!(price.setup_cost, Decimal::from(3480));
        assert_eq!(price.monthly_cost, Decimal::from(2200));

        let debt_only = low_blog(1).with_technical_debt(Complexity::High);
        let price = estimate(&policy, &debt_only, enterprise, &no_addons());
        assert_eq!(price.setup_cost, Decimal::from(3190));

        let both = complexity_only.with_technical_debt(Complexity::High);
        let price = estimate(&policy, &both, enterprise, &no_addons());
        assert_eq!(price.setup_cost, Decimal::from(3828));
        assert_eq!(price.monthly_cost, Decimal::from(2200));
    }

    #[test]
    fn fewer_languages_than_allowance_earn_no_discount() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let enterprise = catalog.get(TierId::Enterprise);

        let price = estimate(&policy, &low_blog(1), enterprise, &no_addons());
        assert_eq!(price.extra_language_count, 0);
        assert_eq!(price.setup_cost, Decimal::from(2900));
        assert_eq!(price.monthly_cost, Decimal::from(2200));

        let price = estimate(&policy, &low_blog(0), enterprise, &no_addons());
        assert_eq!(price.extra_language_count, 0);
    }

    #[test]
    fn addons_add_exact_unit_prices_to_monthly_only() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();

        for tier in catalog.iter() {
            for languages in [1, 3, 7] {
                let configuration = low_blog(languages);
                let base = estimate(&policy, &configuration, tier, &no_addons());

                for (kind, unit) in [
                    (AddonKind::ExtraArticle, 400),
                    (AddonKind::ExtraLanding, 625),
                    (AddonKind::ExtraTechSprint, 325),
                ] {
                    let mut addons = no_addons();
                    addons.increment(kind);
                    let one = estimate(&policy, &configuration, tier, &addons);
                    addons.increment(kind);
                    let two = estimate(&policy, &configuration, tier, &addons);

                    assert_eq!(one.monthly_cost - base.monthly_cost, Decimal::from(unit));
                    assert_eq!(two.monthly_cost - base.monthly_cost, Decimal::from(2 * unit));
                    assert_eq!(one.setup_cost, base.setup_cost);
                    assert_eq!(one.extra_language_count, base.extra_language_count);
                }
            }
        }
    }

    #[test]
    fn mixed_addons_sum_independently() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let starter = catalog.get(TierId::Starter);

        let price =
            estimate(&policy, &low_blog(1), starter, &AddonQuantities::new(2, 1, 3));
        assert_eq!(price.monthly_cost, Decimal::from(850 + 800 + 625 + 975));
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let configuration = low_blog(6).with_complexity(Complexity::High);
        let addons = AddonQuantities::new(1, 1, 1);
        let tier = select_tier(&catalog, &policy, &configuration);

        let first = estimate(&policy, &configuration, tier, &addons);
        let second = estimate(&policy, &configuration, tier, &addons);
        assert_eq!(first, second);
    }

    #[test]
    fn costs_are_whole_units_under_either_rounding_mode() {
        let mut tiers: Vec<_> = TierCatalog::partner_2025().iter().cloned().collect();
        tiers[0].setup_range = PriceRange::whole(1305, 1700).expect("valid range");
        let catalog = TierCatalog::new(tiers).expect("valid catalog");
        let starter = catalog.get(TierId::Starter);

        // 1305 x 1.1 = 1435.5, a midpoint.
        let configuration = low_blog(1).with_technical_debt(Complexity::High);

        let mut policy = PricingPolicy::default();
        let half_up = estimate(&policy, &configuration, starter, &no_addons());
        assert_eq!(half_up.setup_cost, Decimal::from(1436));
        assert_eq!(half_up.setup_cost.scale(), 0);

        policy.rounding = RoundingMode::HalfEven;
        let half_even = estimate(&policy, &configuration, starter, &no_addons());
        assert_eq!(half_even.setup_cost, Decimal::from(1436));

        tiers = catalog.iter().cloned().collect();
        tiers[0].setup_range = PriceRange::whole(1315, 1700).expect("valid range");
        let catalog = TierCatalog::new(tiers).expect("valid catalog");
        // 1315 x 1.1 = 1446.5
        let half_even = estimate(&policy, &configuration, catalog.get(TierId::Starter), &no_addons());
        assert_eq!(half_even.setup_cost, Decimal::from(1446));
        assert_eq!(half_even.monthly_cost.scale(), 0);
    }

    #[test]
    fn language_rates_are_independent_policy_constants() {
        let catalog = TierCatalog::partner_2025();
        let mut policy = PricingPolicy::default();
        policy.languages.setup_per_extra = Decimal::from(500);
        policy.languages.monthly_per_extra = Decimal::from(250);

        let price = estimate(&policy, &low_blog(4), catalog.get(TierId::Growth), &no_addons());
        assert_eq!(price.setup_cost, Decimal::from(1800 + 1000));
        assert_eq!(price.monthly_cost, Decimal::from(1350 + 500));
    }

    #[test]
    fn trace_records_each_applied_stage() {
        let catalog = TierCatalog::partner_2025();
        let policy = PricingPolicy::default();
        let configuration = low_blog(5).with_complexity(Complexity::High);

        let price = estimate(
            &policy,
            &configuration,
            catalog.get(TierId::Enterprise),
            &AddonQuantities::new(0, 1, 0),
        );
        let stages: Vec<&str> = price.trace.steps.iter().map(|step| step.stage.as_str()).collect();
        assert_eq!(
            stages,
            vec!["base", "high_complexity", "extra_languages", "extra_landings", "rounding"]
        );
        assert_eq!(price.trace.tier, TierId::Enterprise);
    }
}
