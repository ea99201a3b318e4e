use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identity of a catalog tier, ordered by scope and price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierId {
    Starter,
    Growth,
    Enterprise,
}

impl TierId {
    pub const ALL: [TierId; 3] = [Self::Starter, Self::Growth, Self::Enterprise];

    pub fn rank(&self) -> u8 {
        match self {
            Self::Starter => 0,
            Self::Growth => 1,
            Self::Enterprise => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Growth => "growth",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "starter" => Ok(Self::Starter),
            "growth" => Ok(Self::Growth),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(DomainError::InvalidCatalog(format!(
                "unknown tier `{other}` (expected starter|growth|enterprise)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: Decimal,
    pub high: Decimal,
}

impl PriceRange {
    pub fn new(low: Decimal, high: Decimal) -> Result<Self, DomainError> {
        let range = Self { low, high };
        range.validate("price range")?;
        Ok(range)
    }

    pub fn whole(low: i64, high: i64) -> Result<Self, DomainError> {
        Self::new(Decimal::from(low), Decimal::from(high))
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), DomainError> {
        if self.low.is_sign_negative() {
            return Err(DomainError::InvalidCatalog(format!("{field} low end must not be negative")));
        }
        if self.low > self.high {
            return Err(DomainError::InvalidCatalog(format!(
                "{field} low end {} exceeds high end {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub name: String,
    pub target: String,
    pub setup_range: PriceRange,
    pub monthly_range: PriceRange,
    pub features: Vec<String>,
    pub linkbuilding_range: PriceRange,
}

impl Tier {
    /// Second word of the display name ("Growth" for "International Growth"),
    /// or the whole name when it is a single word.
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().nth(1).unwrap_or(&self.name)
    }

    pub fn headline_features(&self, count: usize) -> &[String] {
        &self.features[..count.min(self.features.len())]
    }

    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidCatalog(format!("tier `{}` has an empty name", self.id)));
        }
        self.setup_range.validate(&format!("{}.setup_range", self.id))?;
        self.monthly_range.validate(&format!("{}.monthly_range", self.id))?;
        self.linkbuilding_range.validate(&format!("{}.linkbuilding_range", self.id))?;
        Ok(())
    }
}
