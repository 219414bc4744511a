/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the LLM provider directly.
/// Everything goes through the `TextGenerator` trait so tests can swap in a stub.
///
/// Speaks the OpenAI-compatible `/chat/completions` protocol (DeepSeek by default).
/// There is no retry loop: a failed call is reported once and the caller degrades.
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One generation call: persona/system text plus the task-specific prompt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

/// The "generate text" capability. Carried as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = if request.stream {
            let mut stream = response.bytes_stream();
            let mut collector = SseCollector::default();
            while let Some(chunk) = stream.next().await {
                collector.push(chunk?)?;
            }
            collector.finish()?
        } else {
            let parsed: ChatResponse = response.json().await?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default()
        };

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        debug!("LLM call succeeded: {} chars", text.len());
        Ok(text)
    }
}

/// Accumulates `delta.content` fragments from a server-sent-event stream.
/// Network chunks may split lines (and UTF-8 sequences) arbitrarily, so raw
/// bytes are buffered and only complete lines are decoded.
#[derive(Debug, Default)]
struct SseCollector {
    buffer: Vec<u8>,
    content: String,
    done: bool,
}

impl SseCollector {
    fn push(&mut self, fragment: impl AsRef<[u8]>) -> Result<(), GenerationError> {
        self.buffer.extend_from_slice(fragment.as_ref());
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            self.consume_line(String::from_utf8_lossy(&line).trim())?;
        }
        Ok(())
    }

    fn consume_line(&mut self, line: &str) -> Result<(), GenerationError> {
        if self.done || line.is_empty() {
            return Ok(());
        }
        let Some(payload) = line.strip_prefix("data:") else {
            // comments (": keep-alive") and other SSE fields
            return Ok(());
        };
        let payload = payload.trim();
        if payload == "[DONE]" {
            self.done = true;
            return Ok(());
        }
        let chunk: StreamChunk = serde_json::from_str(payload)?;
        for choice in chunk.choices {
            if let Some(text) = choice.delta.and_then(|d| d.content) {
                self.content.push_str(&text);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<String, GenerationError> {
        let rest = std::mem::take(&mut self.buffer);
        self.consume_line(String::from_utf8_lossy(&rest).trim())?;
        Ok(self.content)
    }
}
