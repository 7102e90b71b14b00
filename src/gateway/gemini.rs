use super::prompts;
use super::{AnalysisGateway, GatewayOperation, Result, ValidationResult};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::locale::Locale;
use crate::workspace::ArtifactSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// Analysis gateway backed by a `generateContent` REST endpoint
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentRequest {
    fn new(prompt: String, generation_config: Option<GenerationConfig>) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("bindlab/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(
        &self,
        operation: GatewayOperation,
        prompt: String,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingApiKey)?;

        debug!(
            "Sending {} request to {} ({} prompt bytes)",
            operation,
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::new(prompt, generation_config))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Analysis service returned {} for {}", status, operation);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        body.text().ok_or(GatewayError::EmptyResponse)
    }
}

#[async_trait]
impl AnalysisGateway for GeminiGateway {
    async fn validate(
        &self,
        content: &str,
        filename: &str,
        locale: Locale,
    ) -> Result<ValidationResult> {
        let generation_config = GenerationConfig {
            response_mime_type: Some("application/json"),
            response_schema: Some(prompts::validation_schema()),
            temperature: Some(self.config.validation_temperature),
        };

        let text = self
            .generate(
                GatewayOperation::Validate,
                prompts::validation_prompt(content, filename, locale),
                Some(generation_config),
            )
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    async fn explain(&self, content: &str, filename: &str, locale: Locale) -> Result<String> {
        self.generate(
            GatewayOperation::Explain,
            prompts::explanation_prompt(content, filename, locale),
            None,
        )
        .await
    }

    async fn simulate_lookup(
        &self,
        args: &str,
        artifacts: &[ArtifactSnapshot],
        locale: Locale,
    ) -> Result<String> {
        self.generate(
            GatewayOperation::Lookup,
            prompts::lookup_prompt(args, artifacts, locale),
            None,
        )
        .await
    }
}
