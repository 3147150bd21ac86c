use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docket_core::{DocketError, LlmProvider, LlmRequest, LlmResponse};

/// How the chat-completions endpoint is addressed and authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFlavor {
    /// `{endpoint}/openai/deployments/{model}/chat/completions?api-version=..`, `api-key` header.
    Azure { api_version: String },
    /// `{endpoint}/chat/completions`, bearer token.
    OpenAiCompatible,
}

/// Chat-completions provider for Azure OpenAI and OpenAI-compatible servers.
pub struct ChatCompletionsProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    flavor: ChatFlavor,
}

impl ChatCompletionsProvider {
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self::with_flavor(
            endpoint,
            api_key,
            ChatFlavor::Azure {
                api_version: api_version.into(),
            },
        )
    }

    pub fn openai_compatible(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_flavor(endpoint, api_key, ChatFlavor::OpenAiCompatible)
    }

    fn with_flavor(endpoint: impl Into<String>, api_key: impl Into<String>, flavor: ChatFlavor) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            flavor,
        }
    }

    fn completions_url(&self, model: &str) -> String {
        match &self.flavor {
            ChatFlavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.endpoint, model, api_version
            ),
            ChatFlavor::OpenAiCompatible => format!("{}/chat/completions", self.endpoint),
        }
    }

    fn provider_name(&self) -> &'static str {
        match self.flavor {
            ChatFlavor::Azure { .. } => "azure-openai",
            ChatFlavor::OpenAiCompatible => "openai",
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

fn build_messages(request: &LlmRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    if !request.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: Some(request.system_prompt.clone()),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: Some(request.user_prompt.clone()),
    });
    messages
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        self.provider_name()
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();

        // Azure addresses the deployment in the URL, not the body.
        let body = ChatRequest {
            model: match self.flavor {
                ChatFlavor::Azure { .. } => None,
                ChatFlavor::OpenAiCompatible => Some(request.model.clone()),
            },
            messages: build_messages(request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            provider = self.provider_name(),
            model = %request.model,
            temperature = request.temperature,
            "Sending chat completion request"
        );

        let builder = self.client.post(self.completions_url(&request.model));
        let builder = match self.flavor {
            ChatFlavor::Azure { .. } => builder.header("api-key", &self.api_key),
            ChatFlavor::OpenAiCompatible => builder.bearer_auth(&self.api_key),
        };

        let response = builder
            .json(&body)
            .send()
            .await
            .context("Chat completion HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DocketError::Service {
                service: self.provider_name().to_string(),
                status: status.as_u16(),
                message: error_body.trim().to_string(),
            }
            .into());
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let tokens_used = chat_response
            .usage
            .and_then(|u| u.total_tokens)
            .unwrap_or(0);

        Ok(LlmResponse {
            content,
            provider: self.provider_name().to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
