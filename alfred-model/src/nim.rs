//! Chat completions over NVIDIA's OpenAI-compatible API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use alfred_core::{CoreError, Llm, Message, Result, Role};

/// The default NVIDIA integrate endpoint.
const NVIDIA_API_BASE: &str = "https://integrate.api.nvidia.com/v1";

/// The default chat model.
const DEFAULT_MODEL: &str = "nvidia/nvidia-nemotron-nano-9b-v2";

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Default completion token budget.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// An [`Llm`] backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// Defaults target NVIDIA's integrate API; any endpoint speaking the same
/// protocol works via [`with_base_url`](NimChatModel::with_base_url).
/// Requests are single non-streaming completions with no client-side retry.
///
/// # Example
///
/// ```rust,ignore
/// use alfred_model::NimChatModel;
///
/// let model = NimChatModel::new("nvapi-...")?
///     .with_model("nvidia/nvidia-nemotron-nano-9b-v2");
/// ```
pub struct NimChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl NimChatModel {
    /// Create a new client with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CoreError::Model {
                provider: "NIM".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: NVIDIA_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a new client using the `NVIDIA_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NVIDIA_API_KEY").map_err(|_| CoreError::Model {
            provider: "NIM".into(),
            message: "NVIDIA_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (for self-hosted or compatible endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Llm implementation ─────────────────────────────────────────────

#[async_trait]
impl Llm for NimChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        debug!(model = %self.model, message_count = messages.len(), "chat completion request");

        let request_body = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage { role: wire_role(m.role), content: &m.content })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "request failed");
                CoreError::Model { provider: "NIM".into(), message: format!("request failed: {e}") }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(model = %self.model, %status, "API error");
            return Err(CoreError::Model {
                provider: "NIM".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse response");
            CoreError::Model {
                provider: "NIM".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        completion.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            CoreError::Model { provider: "NIM".into(), message: "API returned no choices".into() }
        })
    }
}
