use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::tier::{PriceRange, Tier, TierId};
use crate::errors::DomainError;
use crate::pricing::policy::PricingPolicy;

/// The three service tiers, held in Starter, Growth, Enterprise order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TierCatalog {
    tiers: [Tier; 3],
}

impl TierCatalog {
    pub fn new(tiers: Vec<Tier>) -> Result<Self, DomainError> {
        let tiers: [Tier; 3] = tiers.try_into().map_err(|tiers: Vec<Tier>| {
            DomainError::InvalidCatalog(format!("expected exactly 3 tiers, found {}", tiers.len()))
        })?;

        for (expected, tier) in TierId::ALL.iter().zip(tiers.iter()) {
            if tier.id != *expected {
                return Err(DomainError::InvalidCatalog(format!(
                    "tiers must be ordered starter, growth, enterprise (found `{}` where `{}` was expected)",
                    tier.id, expected
                )));
            }
            tier.validate()?;
        }

        Ok(Self { tiers })
    }

    pub fn get(&self, id: TierId) -> &Tier {
        &self.tiers[usize::from(id.rank())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }

    pub fn partner_2025() -> Self {
        Self {
            tiers: [
                builtin_tier(
                    TierId::Starter,
                    "International Starter",
                    "1–2 languages, low complexity",
                    (1300, 1700),
                    (850, 1150),
                    &[
                        "1 monthly call",
                        "On-page/interlinking up to 10 URLs/mo",
                        "No copywriting included",
                        "Basic tech + hreflang",
                        "Standard monthly reporting",
                    ],
                    (200, 400),
                ),
                builtin_tier(
                    TierId::Growth,
                    "International Growth",
                    "2–3 languages, the standard choice",
                    (1800, 2400),
                    (1350, 1750),
                    &[
                        "1–2 monthly calls",
                        "On-page up to 20 URLs/mo",
                        "2 articles/mo or 1 landing/mo",
                        "Continuous technical SEO + hreflang",
                        "AI SEO (AIO, entities, Q&A)",
                        "Quick wins UX/CRO",
                    ],
                    (300, 500),
                ),
                builtin_tier(
                    TierId::Enterprise,
                    "International Enterprise",
                    "3+ languages / high complexity",
                    (2900, 4500),
                    (2200, 3800),
                    &[
                        "2–4 monthly calls",
                        "On-page up to 35 URLs/mo",
                        "4 articles/mo or 2 landings/mo",
                        "Advanced technical + Int. Governance",
                        "Intensive Digital PR",
                        "Advanced AI Overviews tracking",
                    ],
                    (800, 2000),
                ),
            ],
        }
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::partner_2025()
    }
}

fn builtin_tier(
    id: TierId,
    name: &str,
    target: &str,
    setup: (i64, i64),
    monthly: (i64, i64),
    features: &[&str],
    linkbuilding: (i64, i64),
) -> Tier {
    Tier {
        id,
        name: name.to_string(),
        target: target.to_string(),
        setup_range: whole_range(setup),
        monthly_range: whole_range(monthly),
        features: features.iter().map(|feature| feature.to_string()).collect(),
        linkbuilding_range: whole_range(linkbuilding),
    }
}

fn whole_range((low, high): (i64, i64)) -> PriceRange {
    PriceRange { low: low.into(), high: high.into() }
}

/// On-disk form of a catalog: `[[tiers]]` tables plus an optional `[policy]`.
#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    pub tiers: Vec<Tier>,
    #[serde(default)]
    pub policy: PricingPolicy,
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("catalog file `{path}` is invalid: {source}")]
    Invalid { path: PathBuf, source: DomainError },
}

pub fn parse_catalog(raw: &str) -> Result<(TierCatalog, PricingPolicy), CatalogParseError> {
    let document: CatalogDocument = toml::from_str(raw)?;
    document.policy.validate()?;
    let catalog = TierCatalog::new(document.tiers)?;
    Ok((catalog, document.policy))
}

#[derive(Debug, Error)]
pub enum CatalogParseError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub fn load_catalog_file(path: &Path) -> Result<(TierCatalog, PricingPolicy), CatalogLoadError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CatalogLoadError::ReadFile { path: path.to_path_buf(), source })?;

    parse_catalog(&raw).map_err(|error| match error {
        CatalogParseError::Toml(source) => {
            CatalogLoadError::ParseFile { path: path.to_path_buf(), source }
        }
        CatalogParseError::Domain(source) => {
            CatalogLoadError::Invalid { path: path.to_path_buf(), source }
        }
    })
}
