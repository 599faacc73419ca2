//! OpenAI-compatible `/chat/completions` client.
//! DeepSeek, OpenAI and most hosted gateways accept the same request shape.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, CompletionService, build_completion_client, sanitize_api_error};
use crate::error::CompletionError;

pub struct OpenAiCompatibleClient {
    name: String,
    api_key: Option<String>,
    model: String,
    /// Pre-computed chat completions URL.
    chat_url: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(
        name: &str,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let chat_url = if base_url.ends_with("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            name: name.to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
            model: model.to_string(),
            chat_url,
            timeout,
            client: build_completion_client(timeout),
        }
    }

    fn chat_completions_url(&self) -> &str {
        &self.chat_url
    }

    fn request_error(&self, error: &reqwest::Error) -> CompletionError {
        if error.is_timeout() {
            CompletionError::Timeout {
                provider: self.name.clone(),
                after: self.timeout,
            }
        } else {
            CompletionError::Request {
                provider: self.name.clone(),
                message: sanitize_api_error(&error.to_string()),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_chat_text(response: &ChatResponse) -> Option<String> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

impl OpenAiCompatibleClient {
    async fn chat(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let Some(api_key) = &self.api_key else {
            return Err(CompletionError::MissingApiKey {
                provider: self.name.clone(),
            });
        };

        let body = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.instructions,
                },
                Message {
                    role: "user",
                    content: &request.content,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            return Err(CompletionError::Status {
                provider: self.name.clone(),
                status: status.as_u16(),
                message: sanitize_api_error(&error),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| self.request_error(&e))?;

        extract_chat_text(&parsed).ok_or_else(|| CompletionError::Empty {
            provider: self.name.clone(),
        })
    }
}

impl CompletionService for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        Box::pin(self.chat(request))
    }
}
