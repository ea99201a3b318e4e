use serde::{Deserialize, Serialize};

use crate::domain::{addons::AddonQuantities, project::ProjectConfiguration};

/// Everything the user controls, captured at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub configuration: ProjectConfiguration,
    #[serde(default)]
    pub addons: AddonQuantities,
}

impl QuoteSnapshot {
    pub fn new(configuration: ProjectConfiguration, addons: AddonQuantities) -> Self {
        Self { configuration, addons }
    }

    /// Stable content hash of the snapshot, hex encoded.
    pub fn fingerprint(&self) -> String {
        let canonical = format!(
            "languages={};complexity={};site_type={};technical_debt={};content_volume={};\
             articles={};landings={};sprints={}",
            self.configuration.language_count,
            self.configuration.complexity.as_str(),
            self.configuration.site_type.as_str(),
            self.configuration.technical_debt.as_str(),
            self.configuration.content_volume.as_str(),
            self.addons.extra_articles,
            self.addons.extra_landings,
            self.addons.extra_tech_sprints,
        );
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}
