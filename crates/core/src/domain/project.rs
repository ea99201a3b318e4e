use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Three-level scale shared by technical complexity, technical debt and
/// content volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Complexity {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unsupported level `{other}` (expected low|medium|high)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    BlogOrSaas,
    Ecommerce,
    Enterprise,
}

impl SiteType {
    pub const ALL: [SiteType; 3] = [Self::BlogOrSaas, Self::Ecommerce, Self::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogOrSaas => "blog_or_saas",
            Self::Ecommerce => "ecommerce",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BlogOrSaas => "Blog / SaaS / Lead Gen",
            Self::Ecommerce => "Ecommerce (Medium)",
            Self::Enterprise => "Enterprise / Marketplace",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SiteType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "blog_or_saas" | "blog" | "saas" | "lead_gen" => Ok(Self::BlogOrSaas),
            "ecommerce" => Ok(Self::Ecommerce),
            "enterprise" | "marketplace" => Ok(Self::Enterprise),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unsupported site type `{other}` (expected blog_or_saas|ecommerce|enterprise)"
            ))),
        }
    }
}

/// Snapshot of the user's project inputs. Always complete; the pricing engine
/// only ever reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    pub language_count: u32,
    pub complexity: Complexity,
    pub site_type: SiteType,
    pub technical_debt: Complexity,
    pub content_volume: Complexity,
}

impl ProjectConfiguration {
    pub fn new(
        language_count: u32,
        complexity: Complexity,
        site_type: SiteType,
        technical_debt: Complexity,
        content_volume: Complexity,
    ) -> Result<Self, DomainError> {
        let configuration =
            Self { language_count, complexity, site_type, technical_debt, content_volume };
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.language_count == 0 {
            return Err(DomainError::InvalidConfiguration(
                "language_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_language_count(mut self, language_count: u32) -> Self {
        self.language_count = language_count;
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_site_type(mut self, site_type: SiteType) -> Self {
        self.site_type = site_type;
        self
    }

    pub fn with_technical_debt(mut self, technical_debt: Complexity) -> Self {
        self.technical_debt = technical_debt;
        self
    }

    pub fn with_content_volume(mut self, content_volume: Complexity) -> Self {
        self.content_volume = content_volume;
        self
    }
}

impl Default for ProjectConfiguration {
    fn default() -> Self {
        Self {
            language_count: 2,
            complexity: Complexity::Medium,
            site_type: SiteType::BlogOrSaas,
            technical_debt: Complexity::Medium,
            content_volume: Complexity::Medium,
        }
    }
}
