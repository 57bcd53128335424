//! Entity extraction over the Anthropic Messages API with a single tool.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{schema, EntityExtraction, EntityExtractor, FinancialEntities};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "v1/messages";

#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    tools: Vec<Value>,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        #[serde(default)]
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Picks the first `tool_use` block naming our tool.
pub fn select_entities(response: MessagesResponse) -> EntityExtraction {
    let input = response.content.into_iter().find_map(|block| match block {
        ContentBlock::ToolUse { name, input, .. } if name == schema::TOOL_NAME => Some(input),
        _ => None,
    });

    match input {
        // An empty object carries no data.
        Some(Value::Object(map)) if map.is_empty() => EntityExtraction::NoMatch,
        Some(input) => match FinancialEntities::from_tool_input(input) {
            Ok(entities) => EntityExtraction::Structured(entities),
            Err(e) => EntityExtraction::CallFailed(format!("Malformed tool input: {}", e)),
        },
        None => EntityExtraction::NoMatch,
    }
}

pub struct AnthropicExtractor {
    client: Client,
    config: AnthropicConfig,
    endpoint: Url,
}

impl AnthropicExtractor {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: AnthropicConfig) -> Result<Self> {
        let mut base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid Anthropic base URL: {}", config.base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(MESSAGES_PATH)?;

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, text: &str) -> Result<MessagesResponse> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            tools: vec![schema::tool_definition()],
            messages: vec![RequestMessage {
                role: "user",
                content: schema::prompt(text),
            }],
        };

        log::debug!(
            "Anthropic API request: POST {} (model {}, {} chars of text)",
            self.endpoint,
            self.config.model,
            text.len()
        );

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("Anthropic API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => format!("{}: {}", parsed.error.kind, parsed.error.message),
                Err(_) => body,
            };
            return Err(anyhow!(
                "Anthropic API request failed with status {}: {}",
                status,
                detail
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;
        Ok(parsed)
    }
}

#[async_trait]
impl EntityExtractor for AnthropicExtractor {
    async fn extract(&self, text: &str) -> EntityExtraction {
        match self.send(text).await {
            Ok(response) => {
                let stop_reason = response.stop_reason.clone();
                let outcome = select_entities(response);
                if outcome == EntityExtraction::NoMatch {
                    log::warn!(
                        "No {} tool invocation in response (stop reason: {:?})",
                        schema::TOOL_NAME,
                        stop_reason
                    );
                }
                outcome
            }
            Err(e) => {
                log::error!("Error calling Anthropic API: {:#}", e);
                EntityExtraction::CallFailed(format!("{:#}", e))
            }
        }
    }
}
