use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    addons::{AddonKind, AddonQuantities},
    estimate::EstimatedPrice,
    tier::Tier,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownBar {
    pub label: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAddon {
    pub kind: AddonKind,
    pub label: String,
    pub quantity: u32,
}

/// Investment chart data: base monthly fee, monthly extras, one-off setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub bars: Vec<BreakdownBar>,
    pub selected_addons: Vec<SelectedAddon>,
}

impl CostBreakdown {
    pub fn build(tier: &Tier, estimate: &EstimatedPrice, addons: &AddonQuantities) -> Self {
        let base_monthly = tier.monthly_range.low;
        let extras = (estimate.monthly_cost - base_monthly).max(Decimal::ZERO);

        Self {
            bars: vec![
                BreakdownBar { label: "Base Monthly".to_string(), amount: base_monthly },
                BreakdownBar { label: "Extras/Langs".to_string(), amount: extras },
                BreakdownBar { label: "Setup".to_string(), amount: estimate.setup_cost },
            ],
            selected_addons: addons
                .selected()
                .into_iter()
                .map(|(kind, quantity)| SelectedAddon {
                    kind,
                    label: kind.label().to_string(),
                    quantity,
                })
                .collect(),
        }
    }

    pub fn bar(&self, label: &str) -> Option<Decimal> {
        self.bars.iter().find(|bar| bar.label == label).map(|bar| bar.amount)
    }
}
