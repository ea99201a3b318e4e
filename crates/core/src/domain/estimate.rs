use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::tier::TierId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub setup: Decimal,
    pub monthly: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub tier: TierId,
    pub steps: Vec<PricingTraceStep>,
}

/// Derived price figures. Costs are always whole currency units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedPrice {
    pub setup_cost: Decimal,
    pub monthly_cost: Decimal,
    pub recommended_linkbuilding_low: Decimal,
    pub recommended_linkbuilding_high: Decimal,
    pub extra_language_count: u32,
    pub trace: PricingTrace,
}
