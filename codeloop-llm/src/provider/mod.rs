//! # LLM Provider Interface
//!
//! A trait-based abstraction for communicating with LLM backends.
//!
//! ## Design
//! - `LlmProvider` trait defines the core interface
//! - Implementations for Gemini, OpenAI-compatible endpoints and Anthropic
//! - One provider is built at startup and shared as `Arc<dyn LlmProvider>`
//! - Usage tracking

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Core Types
// ============================================================================

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Request parameters for a completion
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub stop: Option<Vec<String>>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// The system message, if any. Providers that take the system prompt
    /// out-of-band (Anthropic, Gemini) use the last one.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Messages without the system prompt
    pub fn dialogue(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Error type for provider operations
#[derive(Debug)]
pub enum ProviderError {
    /// Network/connection error
    Network(String),
    /// API returned an error
    Api { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Rate limited
    RateLimited { retry_after: Option<u64> },
    /// Invalid request
    InvalidRequest(String),
    /// Model not found
    ModelNotFound(String),
    /// Authentication failed
    AuthenticationFailed,
    /// Other error
    Other(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::RateLimited { retry_after } => {
                write!(f, "Rate limited")?;
                if let Some(secs) = retry_after {
                    write!(f, " (retry after {}s)", secs)?;
                }
                Ok(())
            }
            Self::InvalidRequest(e) => write!(f, "Invalid request: {}", e),
            Self::ModelNotFound(m) => write!(f, "Model not found: {}", m),
            Self::AuthenticationFailed => write!(f, "Authentication failed"),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Classify a non-success HTTP response
    pub(crate) fn from_status(status: u16, body: String, retry_after: Option<u64>) -> Self {
        match status {
            429 => Self::RateLimited { retry_after },
            401 | 403 => Self::AuthenticationFailed,
            404 => Self::ModelNotFound(body),
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }
}

/// The main LLM provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "gemini", "openai")
    fn name(&self) -> &str;

    /// Get known models
    fn models(&self) -> Vec<String>;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Send a completion request and get a full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Simple prompt -> response helper
    async fn prompt(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)]);
        let response = self.complete(request).await?;
        response.content.ok_or_else(|| ProviderError::Other("No content in response".into()))
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for creating providers
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    pub headers: HashMap<String, String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    OpenAI,
    Anthropic,
}

impl ProviderType {
    /// Environment variables consulted for the API key, in order
    pub fn key_env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderType::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            ProviderType::OpenAI => &["OPENAI_API_KEY"],
            ProviderType::Anthropic => &["ANTHROPIC_API_KEY"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "gemini",
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderType::Gemini),
            "openai" => Ok(ProviderType::OpenAI),
            "anthropic" | "claude" => Ok(ProviderType::Anthropic),
            other => Err(ProviderError::InvalidRequest(format!(
                "unknown provider '{}'",
                other
            ))),
        }
    }
}

impl ProviderConfig {
    /// Google Generative Language API; the Coder's default model family
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::Gemini,
            api_key: Some(api_key.into()),
            base_url: Some("https://generativelanguage.googleapis.com/v1beta".into()),
            default_model: Some("gemini-1.5-pro-latest".into()),
            headers: HashMap::new(),
            timeout_secs: Some(120),
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: Some(api_key.into()),
            base_url: Some("https://api.openai.com/v1".into()),
            default_model: Some("gpt-4o".into()),
            headers: HashMap::new(),
            timeout_secs: Some(120),
        }
    }

    pub fn anthropic(api_key: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("anthropic-version".into(), "2023-06-01".into());

        Self {
            provider_type: ProviderType::Anthropic,
            api_key: Some(api_key.into()),
            base_url: Some("https://api.anthropic.com/v1".into()),
            default_model: Some("claude-sonnet-4-20250514".into()),
            headers,
            timeout_secs: Some(120),
        }
    }

    /// A local OpenAI-compatible server (vLLM, Ollama, llama.cpp)
    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: None,
            base_url: Some(base_url.into()),
            default_model: Some(model.into()),
            headers: HashMap::new(),
            timeout_secs: Some(300),
        }
    }

    /// Defaults for `provider_type` with the given key
    pub fn for_type(provider_type: ProviderType, api_key: Option<String>) -> Self {
        let key = api_key.clone().unwrap_or_default();
        let mut config = match provider_type {
            ProviderType::Gemini => Self::gemini(key),
            ProviderType::OpenAI => Self::openai(key),
            ProviderType::Anthropic => Self::anthropic(key),
        };
        config.api_key = api_key;
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub(crate) fn http_client(&self, default_timeout: u64) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                self.timeout_secs.unwrap_or(default_timeout),
            ))
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to create HTTP client: {}", e)))
    }
}

/// Build the provider selected by `config.provider_type`
pub fn create_provider(config: ProviderConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let provider: Arc<dyn LlmProvider> = match config.provider_type {
        ProviderType::Gemini => Arc::new(GeminiProvider::new(config)?),
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)?),
    };
    tracing::debug!(provider = provider.name(), model = provider.default_model(), "provider ready");
    Ok(provider)
}

/// Read `Retry-After` as whole seconds
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

// ============================================================================
// Usage Tracking
// ============================================================================

/// Tracks token usage across multiple calls
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageTracker {
    pub total_calls: usize,
    pub total_prompt_tokens: usize,
    pub total_completion_tokens: usize,
    pub by_model: HashMap<String, Usage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, model: &str, usage: &Usage) {
        self.total_calls += 1;
        self.total_prompt_tokens += usage.prompt_tokens;
        self.total_completion_tokens += usage.completion_tokens;

        let entry = self.by_model.entry(model.to_string()).or_default();
        entry.prompt_tokens += usage.prompt_tokens;
        entry.completion_tokens += usage.completion_tokens;
        entry.total_tokens += usage.total_tokens;
    }

    pub fn total_tokens(&self) -> usize {
        self.total_prompt_tokens + self.total_completion_tokens
    }

    /// Fold another tracker's counts into this one
    pub fn merge(&mut self, other: &UsageTracker) {
        self.total_calls += other.total_calls;
        self.total_prompt_tokens += other.total_prompt_tokens;
        self.total_completion_tokens += other.total_completion_tokens;

        for (model, usage) in &other.by_model {
            let entry = self.by_model.entry(model.clone()).or_default();
            entry.prompt_tokens += usage.prompt_tokens;
            entry.completion_tokens += usage.completion_tokens;
            entry.total_tokens += usage.total_tokens;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let sys = ChatMessage::system("You are helpful");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content, "You are helpful");

        assert_eq!(ChatMessage::user("Hello").role, Role::User);
        assert_eq!(ChatMessage::assistant("Hi there!").role, Role::Assistant);
    }

    #[test]
    fn test_system_prompt_split() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("write add()"),
            ChatMessage::assistant("def add(a, b): return a + b"),
        ]);

        assert_eq!(request.system_prompt(), Some("be terse"));
        let dialogue: Vec<_> = request.dialogue().map(|m| m.role).collect();
        assert_eq!(dialogue, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new(vec![ChatMessage::user("Hello")])
            .with_model("gemini-1.5-flash")
            .with_temperature(0.2)
            .with_max_tokens(1000);

        assert_eq!(request.model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(1000));
    }

    #[test]
    fn test_provider_config() {
        let config = ProviderConfig::gemini("g-key");
        assert_eq!(config.provider_type, ProviderType::Gemini);
        assert_eq!(config.default_model.as_deref(), Some("gemini-1.5-pro-latest"));

        let config = ProviderConfig::anthropic("sk-ant-test");
        assert!(config.headers.contains_key("anthropic-version"));

        let config = ProviderConfig::for_type(ProviderType::OpenAI, None).with_model("gpt-4o-mini");
        assert_eq!(config.api_key, None);
        assert_eq!(config.default_model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!("Gemini".parse::<ProviderType>().ok(), Some(ProviderType::Gemini));
        assert_eq!("claude".parse::<ProviderType>().ok(), Some(ProviderType::Anthropic));
        assert!("bard".parse::<ProviderType>().is_err());
        assert_eq!(ProviderType::Gemini.key_env_vars()[0], "GEMINI_API_KEY");
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ProviderError::from_status(429, String::new(), Some(3)),
            ProviderError::RateLimited { retry_after: Some(3) }
        ));
        assert!(matches!(
            ProviderError::from_status(403, String::new(), None),
            ProviderError::AuthenticationFailed
        ));
        assert!(matches!(
            ProviderError::from_status(500, "oops".into(), None),
            ProviderError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_usage_tracker() {
        let mut tracker = UsageTracker::new();

        tracker.track("gemini-1.5-pro-latest", &Usage {
            prompt_tokens: 100,
            completion_tokens: 50,
            total_tokens: 150,
        });
        tracker.track("gemini-1.5-pro-latest", &Usage {
            prompt_tokens: 200,
            completion_tokens: 100,
            total_tokens: 300,
        });

        assert_eq!(tracker.total_calls, 2);
        assert_eq!(tracker.total_tokens(), 450);
        assert_eq!(tracker.by_model["gemini-1.5-pro-latest"].total_tokens, 450);
    }

    #[test]
    fn test_usage_tracker_merge() {
        let mut coder = UsageTracker::new();
        coder.track("gemini-1.5-pro-latest", &Usage {
            prompt_tokens: 40,
            completion_tokens: 20,
            total_tokens: 60,
        });
        let mut reviewer = UsageTracker::new();
        reviewer.track("gpt-4o", &Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });

        let mut total = UsageTracker::new();
        total.merge(&coder);
        total.merge(&reviewer);
        total.merge(&coder);

        assert_eq!(total.total_calls, 3);
        assert_eq!(total.total_tokens(), 135);
        assert_eq!(total.by_model["gemini-1.5-pro-latest"].total_tokens, 120);
        assert_eq!(total.by_model["gpt-4o"].prompt_tokens, 10);

        let json = serde_json::to_value(&total).unwrap();
        assert_eq!(json["total_calls"], 3);
        assert_eq!(json["by_model"]["gpt-4o"]["total_tokens"], 15);
    }

    #[test]
    fn test_create_provider_dispatch() {
        let provider = create_provider(ProviderConfig::anthropic("k")).unwrap();
        assert_eq!(provider.name(), "anthropic");

        let provider = create_provider(ProviderConfig::local("http://localhost:11434/v1", "llama3")).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), "llama3");
    }
}
