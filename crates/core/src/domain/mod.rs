pub mod addons;
pub mod estimate;
pub mod project;
pub mod snapshot;
pub mod tier;
