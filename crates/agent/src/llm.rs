use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use scoutbook_core::config::{LlmConfig, LlmProvider};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

const SYSTEM_PROMPT: &str =
    "You are a football scouting analyst. Explain recommendations; never make new ones.";
const TEMPERATURE: f64 = 0.5;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Builds the configured client, or `None` when narratives are switched off.
pub fn client_from_config(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>> {
    if !config.enabled {
        return Ok(None);
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("failed to build LLM http client")?;

    let inner: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| anyhow!("llm.api_key is required for the openai provider"))?;
            Arc::new(OpenAiClient {
                http,
                base_url: config.base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                api_key,
                model: config.model.clone(),
            })
        }
        LlmProvider::Ollama => Arc::new(OllamaClient {
            http,
            base_url: config.base_url.clone().unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            model: config.model.clone(),
        }),
    };

    Ok(Some(Arc::new(RetryingClient::new(inner, config.max_retries))))
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn chat_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [
            ChatMessage { role: "system", content: SYSTEM_PROMPT },
            ChatMessage { role: "user", content: prompt },
        ],
        temperature: TEMPERATURE,
    }
}

/// Pulls `choices[0].message.content` out of a chat-completions body.
fn chat_content(body: &Value) -> Result<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("chat completion response has no message content"))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&chat_request(&self.model, prompt))
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("chat completion returned an error status")?;

        let body: Value = response.json().await.context("chat completion body is not json")?;
        chat_content(&body)
    }
}

pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'static str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let request =
            GenerateRequest { model: &self.model, system: SYSTEM_PROMPT, prompt, stream: false };
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .context("ollama generate request failed")?
            .error_for_status()
            .context("ollama generate returned an error status")?;

        let body: GenerateResponse =
            response.json().await.context("ollama generate body is malformed")?;
        Ok(body.response)
    }
}

/// Retries the wrapped client with linear backoff.
pub struct RetryingClient {
    inner: Arc<dyn LlmClient>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn LlmClient>, max_retries: u32) -> Self {
        Self { inner, max_retries, backoff: Duration::from_millis(250) }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

#[async_trait]
impl LlmClient for RetryingClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            match self.inner.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(error) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        event_name = "agent.llm.retry",
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "llm call failed, retrying"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(error) => {
                    bail!("llm call failed after {} attempt(s): {error:#}", attempt + 1)
                }
            }
        }
    }
}
