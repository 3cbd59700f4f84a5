//! Gemini `generateContent` 客户端

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Explainer, Explanation};
use crate::config::ModelConfig;
use crate::error::{ExplainerError, Result};
use crate::prompt::PromptContext;

/// Gemini 客户端
///
/// 持有一个长连接 `reqwest::Client`，请求超时由 `ModelConfig::timeout_secs` 决定
pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
    max_output_lines: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                ExplainerError::configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: generate_content_url(&config.endpoint, &config.model),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            timeout: config.timeout(),
            max_output_lines: config.max_output_lines,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `{endpoint}/v1beta/models/{model}:generateContent`
fn generate_content_url(endpoint: &str, model: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if model.starts_with("models/") {
        format!("{}/v1beta/{}:generateContent", endpoint, model)
    } else {
        format!("{}/v1beta/models/{}:generateContent", endpoint, model)
    }
}

#[async_trait]
impl Explainer for GeminiClient {
    async fn explain(&self, prompt: &PromptContext) -> Result<Explanation> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: prompt.as_str(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExplainerError::from(e).with_timeout(self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExplainerError::from(e).with_timeout(self.timeout))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(ExplainerError::remote_status(status.as_u16(), reason));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ExplainerError::remote_call(format!("malformed model response: {}", e))
        })?;

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ExplainerError::remote_call(format!(
                "prompt blocked: {}",
                reason
            )));
        }

        let completion: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        debug!(chars = completion.len(), "Model completion received");

        Explanation::from_completion(&completion, self.max_output_lines)
    }
}
