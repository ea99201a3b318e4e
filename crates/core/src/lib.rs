pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::addons::{AddonKind, AddonQuantities};
pub use domain::estimate::{EstimatedPrice, PricingTrace, PricingTraceStep};
pub use domain::project::{Complexity, ProjectConfiguration, SiteType};
pub use domain::snapshot::QuoteSnapshot;
pub use domain::tier::{PriceRange, Tier, TierId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    breakdown::CostBreakdown,
    catalog::TierCatalog,
    estimator::estimate,
    policy::PricingPolicy,
    selector::{select_tier, select_tier_id},
    DeterministicQuoteRuntime, QuoteEvaluation, QuoteRuntime,
};
