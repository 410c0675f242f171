use crate::config::credentials::ApiCredential;
use crate::domain::ports::{AdviceGenerator, ConfigProvider};
use crate::utils::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl GeminiSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            endpoint: config.model_endpoint().to_string(),
            model: config.model_name().to_string(),
            temperature: config.temperature(),
            timeout: config.request_timeout(),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(30),
            retry_attempts: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini `generateContent` 介面的建議產生器
pub struct GeminiAdviceGenerator {
    client: Client,
    settings: GeminiSettings,
    api_key: ApiCredential,
}

impl GeminiAdviceGenerator {
    pub fn new(settings: GeminiSettings, api_key: ApiCredential) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C, api_key: ApiCredential) -> Result<Self> {
        Self::new(GeminiSettings::from_config(config), api_key)
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn should_retry(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(TriageError::generation(format!(
                "prompt was blocked by the model ({})",
                reason
            )));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| TriageError::generation("model returned no candidates"))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(TriageError::generation(format!(
                "model returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl AdviceGenerator for GeminiAdviceGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.url();
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
            },
        };

        let max_attempts = self.settings.retry_attempts + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::debug!(
                "Calling {} (attempt {}/{})",
                self.settings.model,
                attempt,
                max_attempts
            );

            let sent = self
                .client
                .post(&url)
                .header("x-goog-api-key", self.api_key.expose())
                .json(&body)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    let err = TriageError::from(e);
                    if err.is_retryable() && attempt < max_attempts {
                        tracing::warn!("🔁 Advice request failed, retrying: {}", err);
                        tokio::time::sleep(self.settings.retry_delay).await;
                        continue;
                    }
                    return Err(err);
                }
            };

            let status = response.status();
            tracing::debug!("Advice service response status: {}", status);

            if status.is_success() {
                let parsed: GenerateContentResponse = response.json().await?;
                return Self::extract_text(parsed);
            }

            if Self::should_retry(status) && attempt < max_attempts {
                tracing::warn!("🔁 Advice service returned {}, retrying", status);
                tokio::time::sleep(self.settings.retry_delay).await;
                continue;
            }

            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(TriageError::generation(format!(
                "advice service returned {}: {}",
                status,
                detail.trim()
            )));
        }
    }
}
