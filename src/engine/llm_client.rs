use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatTurn],
    pub max_tokens: u32,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// A chat-completion service. Implementations block; callers run them off
/// the UI thread.
pub trait ChatBackend: Send + Sync {
    fn complete(&self, api_key: &str, turns: &[ChatTurn], max_tokens: u32) -> Result<String>;

    /// Verify the key by listing models. Returns how many are visible.
    fn check_key(&self, api_key: &str) -> Result<usize>;
}

/// OpenAI-compatible HTTP backend.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("could not initialise the HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }
}

impl ChatBackend for OpenAiClient {
    fn complete(&self, api_key: &str, turns: &[ChatTurn], max_tokens: u32) -> Result<String> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
            max_tokens,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&req)
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            bail!("HTTP {status}: {}", api_error_message(&body));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).context("unexpected response body")?;
        first_completion(parsed)
    }

    fn check_key(&self, api_key: &str) -> Result<usize> {
        let resp = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            bail!("HTTP {status}: {}", api_error_message(&body));
        }

        let models: ModelList = serde_json::from_str(&body).context("unexpected response body")?;
        Ok(models.data.len())
    }
}

pub fn first_completion(resp: ChatCompletionResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("response contains no completion text"))
}

/// Pull `error.message` out of an API error body, or fall back to the body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
