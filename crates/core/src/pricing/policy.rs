//! Declarative pricing policy.
//!
//! Every number the selector and estimator use lives here, so a revised price
//! list is a data change rather than a code change.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::{addons::AddonKind, tier::TierId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionThresholds {
    /// Language count at or above which Enterprise is recommended.
    pub enterprise_min_languages: u32,
    /// Language count at or above which Growth is recommended.
    pub growth_min_languages: u32,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self { enterprise_min_languages: 4, growth_min_languages: 2 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMultipliers {
    pub high_complexity: Decimal,
    pub high_technical_debt: Decimal,
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        Self { high_complexity: Decimal::new(12, 1), high_technical_debt: Decimal::new(11, 1) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageRates {
    /// One-time localization setup per language beyond the tier allowance.
    pub setup_per_extra: Decimal,
    /// Ongoing maintenance fee per language beyond the tier allowance.
    pub monthly_per_extra: Decimal,
}

impl Default for LanguageRates {
    fn default() -> Self {
        Self { setup_per_extra: Decimal::from(400), monthly_per_extra: Decimal::from(400) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonPrices {
    pub article: Decimal,
    pub landing: Decimal,
    pub tech_sprint: Decimal,
}

impl AddonPrices {
    pub fn unit_price(&self, kind: AddonKind) -> Decimal {
        match kind {
            AddonKind::ExtraArticle => self.article,
            AddonKind::ExtraLanding => self.landing,
            AddonKind::ExtraTechSprint => self.tech_sprint,
        }
    }
}

impl Default for AddonPrices {
    fn default() -> Self {
        Self {
            article: Decimal::from(400),
            landing: Decimal::from(625),
            tech_sprint: Decimal::from(325),
        }
    }
}

/// Languages included in each tier's base price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineAllowance {
    pub starter: u32,
    pub growth: u32,
    pub enterprise: u32,
}

impl BaselineAllowance {
    pub fn for_tier(&self, tier: TierId) -> u32 {
        match tier {
            TierId::Starter => self.starter,
            TierId::Growth => self.growth,
            TierId::Enterprise => self.enterprise,
        }
    }
}

impl Default for BaselineAllowance {
    fn default() -> Self {
        Self { starter: 1, growth: 2, enterprise: 3 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.5 rounds up for positive amounts.
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding.
    HalfEven,
}

impl RoundingMode {
    pub fn round(&self, amount: Decimal) -> Decimal {
        let strategy = match self {
            Self::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        };
        amount.round_dp_with_strategy(0, strategy).normalize()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    pub thresholds: SelectionThresholds,
    pub multipliers: RiskMultipliers,
    pub languages: LanguageRates,
    pub addons: AddonPrices,
    pub allowance: BaselineAllowance,
    pub rounding: RoundingMode,
}

impl PricingPolicy {
    /// Partner pricing 2025, the policy the built-in catalog is quoted with.
    pub fn partner_2025() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.thresholds.growth_min_languages > self.thresholds.enterprise_min_languages {
            return Err(DomainError::InvalidPolicy(format!(
                "thresholds.growth_min_languages ({}) must not exceed thresholds.enterprise_min_languages ({})",
                self.thresholds.growth_min_languages, self.thresholds.enterprise_min_languages
            )));
        }

        for (field, value) in [
            ("multipliers.high_complexity", self.multipliers.high_complexity),
            ("multipliers.high_technical_debt", self.multipliers.high_technical_debt),
        ] {
            if value <= Decimal::ZERO {
                return Err(DomainError::InvalidPolicy(format!("{field} must be greater than zero")));
            }
        }

        for (field, value) in [
            ("languages.setup_per_extra", self.languages.setup_per_extra),
            ("languages.monthly_per_extra", self.languages.monthly_per_extra),
            ("addons.article", self.addons.article),
            ("addons.landing", self.addons.landing),
            ("addons.tech_sprint", self.addons.tech_sprint),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(DomainError::InvalidPolicy(format!("{field} must not be negative")));
            }
        }

        Ok(())
    }
}
