use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonKind {
    ExtraArticle,
    ExtraLanding,
    ExtraTechSprint,
}

impl AddonKind {
    pub const ALL: [AddonKind; 3] = [Self::ExtraArticle, Self::ExtraLanding, Self::ExtraTechSprint];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExtraArticle => "Extra article",
            Self::ExtraLanding => "Extra landing",
            Self::ExtraTechSprint => "Tech sprint (2-4h)",
        }
    }
}

impl fmt::Display for AddonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Add-on quantities. Counts are unsigned and every mutation saturates at
/// zero, so a quantity can never go negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonQuantities {
    pub extra_articles: u32,
    pub extra_landings: u32,
    pub extra_tech_sprints: u32,
}

impl AddonQuantities {
    pub fn new(extra_articles: u32, extra_landings: u32, extra_tech_sprints: u32) -> Self {
        Self { extra_articles, extra_landings, extra_tech_sprints }
    }

    pub fn get(&self, kind: AddonKind) -> u32 {
        match kind {
            AddonKind::ExtraArticle => self.extra_articles,
            AddonKind::ExtraLanding => self.extra_landings,
            AddonKind::ExtraTechSprint => self.extra_tech_sprints,
        }
    }

    fn slot(&mut self, kind: AddonKind) -> &mut u32 {
        match kind {
            AddonKind::ExtraArticle => &mut self.extra_articles,
            AddonKind::ExtraLanding => &mut self.extra_landings,
            AddonKind::ExtraTechSprint => &mut self.extra_tech_sprints,
        }
    }

    pub fn increment(&mut self, kind: AddonKind) {
        self.adjust(kind, 1);
    }

    pub fn decrement(&mut self, kind: AddonKind) {
        self.adjust(kind, -1);
    }

    /// Applies a signed delta, clamping the result to `0..=u32::MAX`.
    pub fn adjust(&mut self, kind: AddonKind, delta: i64) {
        let slot = self.slot(kind);
        let next = (i64::from(*slot) + delta).clamp(0, i64::from(u32::MAX));
        *slot = u32::try_from(next).unwrap_or(0);
    }

    pub fn is_empty(&self) -> bool {
        AddonKind::ALL.iter().all(|kind| self.get(*kind) == 0)
    }

    /// Non-zero add-ons in display order.
    pub fn selected(&self) -> Vec<(AddonKind, u32)> {
        AddonKind::ALL
            .iter()
            .map(|kind| (*kind, self.get(*kind)))
            .filter(|(_, quantity)| *quantity > 0)
            .collect()
    }
}
