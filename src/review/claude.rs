use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::ReviewPass;
use crate::review::parser::parse_assessment;
use crate::review::prompts::{ReviewRequest, SYSTEM_PROMPT};
use crate::review::provider::ReviewProvider;

/// Assessment backend over the Anthropic Messages API. Each call carries an
/// explicit timeout and one retry for transient failures; anything else is
/// returned as an error for the pipeline to degrade.
pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
            timeout,
        })
    }

    async fn request_once(&self, prompt: &str) -> Result<String> {
        let request_body = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&request_body)
                .send(),
        )
        .await
        .map_err(|_| Error::BackendTimeout(self.timeout.as_secs()))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "assessment API error ({}): {}",
                status, body
            )));
        }

        let result: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("failed to parse API envelope: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::Backend(error.message));
        }

        let text = result
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(Error::Backend("empty response from backend".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl ReviewProvider for ClaudeProvider {
    async fn assess(&self, request: ReviewRequest) -> Result<ReviewPass> {
        let prompt = request.to_prompt();
        tracing::debug!(
            reviewer = request.reviewer.name,
            tokens = request.estimate_tokens(),
            "sending assessment request"
        );

        let text = match self.request_once(&prompt).await {
            Ok(text) => text,
            Err(e) if e.is_retryable() => {
                tracing::warn!(reviewer = request.reviewer.name, "retrying after: {}", e);
                self.request_once(&prompt).await?
            }
            Err(e) => return Err(e),
        };

        Ok(parse_assessment(request.reviewer, &text))
    }

    fn name(&self) -> &str {
        "Claude"
    }
}
