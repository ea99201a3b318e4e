use anyhow::{Context as _, Result};
use serde::Serialize;
use seoquote_core::{config::ProposalLanguage, QuoteEvaluation};
use tera::{Context, Tera};

const ENGLISH_TEMPLATE: &str = r#"Act as a Senior International SEO Consultant.
Generate a persuasive executive summary for a commercial SEO proposal under the "Partner" pricing model.
Project details:
- Total languages: {{ languages }} (includes {{ extra_languages }} additional languages)
- Site type: {{ site_type }}
- Complexity: {{ complexity }}
- Recommended plan: {{ tier_name }}
- Extras: {{ extra_articles }} extra articles, {{ extra_landings }} extra landings, {{ extra_tech_sprints }} technical sprints.
- Setup Cost: {{ setup_cost }}{{ currency }}
- Monthly Fee: {{ monthly_cost }}{{ currency }}

The tone must be professional, strategic, and results-oriented.
Output in English. Structure the text in:
1. Strategic Challenge.
2. Our Solution (detail why the {{ tier_name }} plan is the right fit).
3. Value of selected Add-ons.
4. Estimated investment and next steps.
Use Markdown for formatting. Maximum {{ max_words }} words.
"#;

const SPANISH_TEMPLATE: &str = r#"Actúa como un Consultor Senior de SEO Internacional.
Genera un resumen ejecutivo persuasivo para una propuesta comercial de SEO bajo el modelo de precios "Partner".
Detalles del proyecto:
- Idiomas totales: {{ languages }} (incluye {{ extra_languages }} idiomas adicionales)
- Tipo de sitio: {{ site_type }}
- Complejidad: {{ complexity }}
- Plan recomendado: {{ tier_name }}
- Extras: {{ extra_articles }} artículos extra, {{ extra_landings }} landings extra, {{ extra_tech_sprints }} sprints técnicos.
- Coste de Setup: {{ setup_cost }}{{ currency }}
- Fee Mensual: {{ monthly_cost }}{{ currency }}

El tono debe ser profesional, estratégico y orientado a resultados.
Escribe en español. Estructura el texto en:
1. Reto Estratégico.
2. Nuestra Solución (detalla por qué el plan {{ tier_name }} es el adecuado).
3. Valor de los Add-ons seleccionados.
4. Inversión estimada y próximos pasos.
Usa Markdown para el formato. Máximo {{ max_words }} palabras.
"#;

pub const MAX_PROPOSAL_WORDS: u32 = 300;

/// Everything the prompt needs, flattened for the template engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalContext {
    pub languages: u32,
    pub extra_languages: u32,
    pub site_type: String,
    pub complexity: String,
    pub tier_name: String,
    pub extra_articles: u32,
    pub extra_landings: u32,
    pub extra_tech_sprints: u32,
    pub setup_cost: String,
    pub monthly_cost: String,
    pub currency: String,
    pub max_words: u32,
}

impl ProposalContext {
    pub fn from_evaluation(evaluation: &QuoteEvaluation, currency: &str) -> Self {
        let configuration = &evaluation.snapshot.configuration;
        let addons = &evaluation.snapshot.addons;

        Self {
            languages: configuration.language_count,
            extra_languages: evaluation.estimate.extra_language_count,
            site_type: configuration.site_type.label().to_string(),
            complexity: configuration.complexity.label().to_string(),
            tier_name: evaluation.tier.name.clone(),
            extra_articles: addons.extra_articles,
            extra_landings: addons.extra_landings,
            extra_tech_sprints: addons.extra_tech_sprints,
            setup_cost: evaluation.estimate.setup_cost.to_string(),
            monthly_cost: evaluation.estimate.monthly_cost.to_string(),
            currency: currency.to_string(),
            max_words: MAX_PROPOSAL_WORDS,
        }
    }
}

pub struct PromptRenderer {
    tera: Tera,
}

impl PromptRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (template_name(ProposalLanguage::English), ENGLISH_TEMPLATE),
            (template_name(ProposalLanguage::Spanish), SPANISH_TEMPLATE),
        ])
        .context("failed to register proposal prompt templates")?;
        // Prompts are plain text, not HTML.
        tera.autoescape_on(vec![]);
        Ok(Self { tera })
    }

    pub fn render(&self, language: ProposalLanguage, context: &ProposalContext) -> Result<String> {
        let context =
            Context::from_serialize(context).context("failed to build prompt template context")?;
        self.tera
            .render(template_name(language), &context)
            .context("failed to render proposal prompt")
    }
}

fn template_name(language: ProposalLanguage) -> &'static str {
    match language {
        ProposalLanguage::English => "proposal_en.txt",
        ProposalLanguage::Spanish => "proposal_es.txt",
    }
}

#[cfg(test)]
mod tests {
    use seoquote_core::{
        config::ProposalLanguage, AddonQuantities, DeterministicQuoteRuntime,
        ProjectConfiguration, QuoteRuntime,
    };

    use super::{ProposalContext, PromptRenderer};

    fn context() -> ProposalContext {
        let runtime = DeterministicQuoteRuntime::default();
        let evaluation = runtime.evaluate(
            &ProjectConfiguration::default().with_language_count(5),
            &AddonQuantities::new(2, 1, 0),
        );
        ProposalContext::from_evaluation(&evaluation, "€")
    }

    #[test]
    fn context_reflects_the_evaluated_quote() {
        let context = context();
        assert_eq!(context.languages, 5);
        assert_eq!(context.extra_languages, 2);
        assert_eq!(context.tier_name, "International Enterprise");
        assert_eq!(context.site_type, "Blog / SaaS / Lead Gen");
        assert_eq!(context.setup_cost, "3700");
        assert_eq!(context.monthly_cost, "4425");
    }

    #[test]
    fn english_prompt_carries_figures_and_structure() {
        let renderer = PromptRenderer::new().expect("templates should register");
        let prompt =
            renderer.render(ProposalLanguage::English, &context()).expect("prompt should render");

        assert!(prompt.contains("Total languages: 5 (includes 2 additional languages)"));
        assert!(prompt.contains("Recommended plan: International Enterprise"));
        assert!(prompt.contains("Extras: 2 extra articles, 1 extra landings, 0 technical sprints."));
        assert!(prompt.contains("Setup Cost: 3700€"));
        assert!(prompt.contains("Monthly Fee: 4425€"));
        assert!(prompt.contains("Site type: Blog / SaaS / Lead Gen"));
        assert!(prompt.contains("Maximum 300 words."));
        assert!(prompt.contains("Output in English."));
    }

    #[test]
    fn spanish_prompt_uses_the_same_figures() {
        let renderer = PromptRenderer::new().expect("templates should register");
        let prompt =
            renderer.render(ProposalLanguage::Spanish, &context()).expect("prompt should render");

        assert!(prompt.contains("Idiomas totales: 5 (incluye 2 idiomas adicionales)"));
        assert!(prompt.contains("Coste de Setup: 3700€"));
        assert!(prompt.contains("Escribe en español."));
    }
}
