//! Inference client.
//!
//! [`ChatModel`] is the seam between question answering and whatever serves
//! the model. The production implementation, [`OllamaChat`], talks to a
//! local Ollama instance's `POST /api/chat` endpoint with streaming turned
//! off and returns the assistant message text.
//!
//! No timeout and no retry are applied: a hung model stalls only the request
//! that is waiting on it.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// A model that takes a single user message and returns its full reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier sent with each request (e.g. `"phi3.5"`).
    fn model_name(&self) -> &str;

    /// Send `prompt` as one `user`-role message and wait for the reply text.
    async fn chat(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// [`ChatModel`] backed by Ollama.
pub struct OllamaChat {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaChat {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Ollama connection error (is Ollama running at {}?): {}",
                    self.url,
                    e
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Ollama API error {}: {}", status, body_text);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Invalid Ollama chat response: {}", e))?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: "phi3.5",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "phi3.5",
                "messages": [{ "role": "user", "content": "hi" }],
                "stream": false
            })
        );
    }

    #[test]
    fn test_response_parsing_ignores_extra_fields() {
        let raw = r#"{
            "model": "phi3.5",
            "created_at": "2024-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": "It is in uploads." },
            "done": true
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "It is in uploads.");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let chat = OllamaChat::new(&LlmConfig {
            url: "http://localhost:11434/".to_string(),
            model: "phi3.5".to_string(),
        });
        assert_eq!(chat.url, "http://localhost:11434");
        assert_eq!(chat.model_name(), "phi3.5");
    }
}
