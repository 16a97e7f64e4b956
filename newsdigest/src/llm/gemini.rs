use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionError, CompletionProvider, CompletionRequest};

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

/// Google Generative Language (`generateContent`) provider
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// `base_url` is the API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CompletionError::Transport(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait::async_trait]
impl CompletionProvider for GeminiProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let req_body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                CompletionError::Transport(format!("failed to read response body: {}", e))
            })?;

        if !status.is_success() {
            // {"error": {"code": 429, "message": "...", "status": "RESOURCE_EXHAUSTED"}}
            let detail = serde_json::from_str::<ErrorEnvelope>(&body).ok().map(|e| e.error);
            return Err(CompletionError::Api {
                code: status.as_u16(),
                status: detail.as_ref().and_then(|d| d.status.clone()),
                message: detail
                    .and_then(|d| d.message)
                    .unwrap_or_else(|| body.trim().to_string()),
            });
        }

        let resp_body: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(format!("failed to parse response: {}", e)))?;

        let candidate = resp_body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Malformed("response has no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(text)
    }
}

// generateContent request/response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}
