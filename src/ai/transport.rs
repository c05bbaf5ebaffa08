use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{AiEndpoint, AiError};

const SYSTEM_PROMPT: &str =
    "You are a bookmark search assistant. Always answer with JSON only, no prose.";

/// Sends one prompt to a chat-completion service and returns the text of
/// the first choice.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, endpoint: &AiEndpoint, prompt: &str) -> Result<String, AiError>;
}

/// Talks to any OpenAI compatible `/chat/completions` endpoint.
#[derive(Clone, Default)]
pub struct OpenAiTransport {
    client: Client,
}

impl OpenAiTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    async fn complete(&self, endpoint: &AiEndpoint, prompt: &str) -> Result<String, AiError> {
        log::debug!("{} ({})", endpoint.endpoint, endpoint.model);

        let body = json!({
            "model": endpoint.model,
            "temperature": 0.3,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .client
            .post(&endpoint.endpoint)
            .bearer_auth(&endpoint.credential)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Transport(format!("{status}: {text}")));
        }

        let json: Value = response.json().await?;
        choice_content(&json)
    }
}

fn choice_content(json: &Value) -> Result<String, AiError> {
    json.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| AiError::MalformedResponse("missing choices[0].message.content".into()))
}
