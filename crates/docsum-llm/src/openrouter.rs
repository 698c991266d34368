//! OpenRouter analyzer implementation.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; OpenRouter
//! is the default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use docsum_core::{Analyzer, DocsumError, DocsumResult, DocumentAnalysis, LlmSettings};

use crate::prompt::build_prompt;
use crate::response::parse_analysis;

const REFERER: &str = "https://github.com/docsum/docsum";

/// Analyzer backed by an OpenAI-compatible chat completions API.
pub struct OpenRouterAnalyzer {
    client: Client,
    model: String,
    base_url: String,
    max_chars: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenRouterAnalyzer {
    /// Create a new analyzer from settings. Fails without an API key.
    pub fn new(settings: &LlmSettings) -> DocsumResult<Self> {
        let api_key = settings.require_api_key()?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse()
                .map_err(|_| DocsumError::Configuration("Invalid API key format".to_string()))?,
        );
        headers.insert(
            "HTTP-Referer",
            REFERER
                .parse()
                .map_err(|_| DocsumError::Configuration("Invalid referer header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                DocsumError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_chars: settings.max_chars,
        })
    }
}

#[async_trait]
impl Analyzer for OpenRouterAnalyzer {
    async fn analyze(&self, text: &str) -> DocsumResult<DocumentAnalysis> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(text, self.max_chars),
            }],
        };

        debug!(model = %self.model, "sending analysis request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| DocsumError::llm_connection("OpenRouter API request failed", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocsumError::llm_connection("Failed to read response body", e))?;

        if !status.is_success() {
            error!(status = %status, body = %body, "OpenRouter API error");
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.clone());
            return Err(DocsumError::llm(format!(
                "OpenRouter API error ({}): {}",
                status, message
            )));
        }

        let response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            DocsumError::invalid_response(format!("Failed to parse response: {}", e))
        })?;

        if let Some(err) = response.error {
            return Err(DocsumError::llm(format!("OpenRouter API error: {}", err.message)));
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DocsumError::invalid_response("no choices in response"))?;

        parse_analysis(&content).map_err(|e| {
            error!(content = %content, "failed to parse LLM response");
            e
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
