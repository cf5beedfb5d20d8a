//! # codeloop LLM
//!
//! Chat-completion clients the Coder agent talks to.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based LLM communication (Gemini, OpenAI-compatible, Anthropic)
//! - **ChatMessage / CompletionRequest**: provider-neutral request shape
//! - **ProviderError**: wire-level failures, mapped into [`Error`] via [`error::provider_error`]

pub mod error;
pub mod provider;

pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use provider::{
    create_provider, AnthropicProvider, ChatMessage, CompletionRequest, CompletionResponse,
    FinishReason, GeminiProvider, LlmProvider, OpenAIProvider, ProviderConfig, ProviderError,
    ProviderType, Role, Usage, UsageTracker,
};
