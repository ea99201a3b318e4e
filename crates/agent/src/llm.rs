use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use seoquote_core::config::{LlmConfig, LlmProvider};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("failed to build http client")?;
    let api_key = config
        .api_key
        .as_ref()
        .map(|key| SecretString::from(key.expose_secret().to_string()));

    match config.provider {
        LlmProvider::Gemini => {
            let api_key = api_key.ok_or_else(|| anyhow!("gemini provider requires llm.api_key"))?;
            Ok(Arc::new(GeminiClient {
                http,
                base_url: base_url_or(config, GEMINI_DEFAULT_BASE_URL),
                model: config.model.clone(),
                api_key,
            }))
        }
        LlmProvider::OpenAi => Ok(Arc::new(ChatCompletionsClient {
            http,
            base_url: base_url_or(config, OPENAI_DEFAULT_BASE_URL),
            model: config.model.clone(),
            api_key,
        })),
        LlmProvider::Ollama => {
            let base_url = config
                .base_url
                .clone()
                .ok_or_else(|| anyhow!("ollama provider requires llm.base_url"))?;
            Ok(Arc::new(ChatCompletionsClient {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
                api_key,
            }))
        }
    }
}

fn base_url_or(config: &LlmConfig, fallback: &str) -> String {
    config.base_url.as_deref().unwrap_or(fallback).trim_end_matches('/').to_string()
}

/// Google Generative Language API (`models/{model}:generateContent`).
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiRequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content.parts.iter().filter_map(|part| part.text.as_deref()).collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiRequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&request)
            .send()
            .await
            .context("gemini request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            bail!("gemini returned {status}: {body}");
        }

        let payload: GeminiResponse =
            response.json().await.context("failed to decode gemini response")?;
        Ok(payload.text())
    }
}

/// OpenAI-compatible `chat/completions` endpoint, also served by Ollama.
pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn text(&self) -> String {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let mut builder = self.http.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.context("chat completions request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            bail!("chat completions endpoint returned {status}: {body}");
        }

        let payload: ChatResponse =
            response.json().await.context("failed to decode chat completions response")?;
        Ok(payload.text())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use seoquote_core::config::{AppConfig, LlmProvider};

    use super::{client_from_config, ChatResponse, GeminiResponse};

    #[test]
    fn gemini_text_joins_parts_of_first_candidate() {
        let payload: GeminiResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"parts":[{"text":"## Strategic "},{"text":"Challenge"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"###,
        )
        .expect("payload should decode");
        assert_eq!(payload.text(), "## Strategic Challenge");
    }

    #[test]
    fn gemini_without_candidates_yields_empty_text() {
        let payload: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
                .expect("payload should decode");
        assert!(payload.text().is_empty());
    }

    #[test]
    fn chat_text_reads_first_choice() {
        let payload: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Our Solution"}}]}"#,
        )
        .expect("payload should decode");
        assert_eq!(payload.text(), "Our Solution");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).expect("decode");
        assert!(empty.text().is_empty());
    }

    #[test]
    fn gemini_client_requires_api_key() {
        let mut config = AppConfig::default().llm;
        config.provider = LlmProvider::Gemini;
        assert!(client_from_config(&config).is_err());

        config.api_key = Some(SecretString::from("test-key".to_string()));
        assert!(client_from_config(&config).is_ok());
    }

    #[test]
    fn default_ollama_config_builds_a_client() {
        assert!(client_from_config(&AppConfig::default().llm).is_ok());
    }
}
