//! Agents taking part in the round-robin conversation

use crate::signal::SignalRole;
use crate::state::HistoryEntry;
use crate::tool::{ExecutorConfig, ExecutorTool, LinterConfig, LinterTool, Tool};
use async_trait::async_trait;
use codeloop_error::{Error, Result};
use codeloop_llm::error::{empty_completion, provider_error};
use codeloop_llm::{ChatMessage, CompletionRequest, FinishReason, LlmProvider, UsageTracker};
use std::sync::{Arc, Mutex};

/// Prompt used by generator agents unless overridden. `{message}` is replaced
/// with the incoming message.
pub const DEFAULT_INSTRUCTION: &str =
    "You are a Python coder. User asked: {message}\nRespond with working Python code only.";

/// A named participant that answers the current message
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Tools this agent invokes, in order
    fn tools(&self) -> &[Arc<dyn Tool>] {
        &[]
    }

    /// Which signals the chat loop reads from this agent's replies
    fn role(&self) -> SignalRole {
        SignalRole::from_name(self.name())
    }

    /// Token usage so far, for agents backed by an LLM
    fn usage(&self) -> Option<UsageTracker> {
        None
    }

    /// Answer `message`. `history` holds every appended reply so far.
    async fn reply(&self, message: &str, history: &[HistoryEntry]) -> Result<String>;
}

/// Agent that asks an LLM to write code for the incoming message
pub struct GeneratorAgent {
    name: String,
    provider: Arc<dyn LlmProvider>,
    instruction: String,
    model: Option<String>,
    temperature: Option<f32>,
    usage: Mutex<UsageTracker>,
}

impl GeneratorAgent {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            model: None,
            temperature: None,
            usage: Mutex::new(UsageTracker::new()),
        }
    }

    /// Replace the prompt template
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Override the provider's default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Render the prompt sent for `message`
    pub fn prompt_for(&self, message: &str) -> String {
        self.instruction.replace("{message}", message)
    }
}

#[async_trait]
impl Agent for GeneratorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn usage(&self) -> Option<UsageTracker> {
        self.usage.lock().ok().map(|t| t.clone())
    }

    /// Only the templated message is sent; earlier turns are not replayed.
    async fn reply(&self, message: &str, _history: &[HistoryEntry]) -> Result<String> {
        let prompt = self.prompt_for(message);
        let mut request = CompletionRequest::new(vec![ChatMessage::user(prompt)]);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        tracing::debug!(
            agent = %self.name,
            provider = self.provider.name(),
            prompt_chars = request.messages[0].content.len(),
            "requesting completion"
        );

        let response = self.provider.complete(request).await.map_err(|e| {
            provider_error(e)
                .with_operation("generator::reply")
                .with_context("agent", self.name.clone())
        })?;

        if let Ok(mut tracker) = self.usage.lock() {
            tracker.track(&response.model, &response.usage);
        }

        if response.finish_reason == FinishReason::ContentFilter {
            return Err(
                Error::agent_reply_failed(self.name.clone(), "completion blocked by content filter")
                    .with_operation("generator::reply")
                    .with_context("provider", self.provider.name()),
            );
        }

        response.content.ok_or_else(|| {
            empty_completion(self.provider.name())
                .with_operation("generator::reply")
                .with_context("agent", self.name.clone())
        })
    }
}

/// Agent that runs its tools over the incoming message and reports back
pub struct ToolRunnerAgent {
    name: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRunnerAgent {
    pub fn new(name: impl Into<String>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }
}

#[async_trait]
impl Agent for ToolRunnerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    async fn reply(&self, message: &str, _history: &[HistoryEntry]) -> Result<String> {
        let mut reports = Vec::with_capacity(self.tools.len());
        for tool in &self.tools {
            tracing::debug!(agent = %self.name, tool = tool.name(), "running tool");
            let report = tool.run(message).await.map_err(|e| {
                e.with_operation("tool_runner::reply")
                    .with_context("agent", self.name.clone())
            })?;
            reports.push(format!("[{}]\n{}", tool.name(), report));
        }
        Ok(reports.join("\n"))
    }
}

/// The Debugger's tools: run the code, then lint it
pub fn debugger_tools(executor: ExecutorConfig, linter: LinterConfig) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ExecutorTool::new(executor)),
        Arc::new(LinterTool::new(linter)),
    ]
}

/// Standard pairing: a `Coder` backed by `provider` and a `Debugger` that
/// executes and lints whatever the coder wrote
pub fn code_debugging_agents(provider: Arc<dyn LlmProvider>) -> Vec<Box<dyn Agent>> {
    vec![
        Box::new(GeneratorAgent::new("Coder", provider)),
        Box::new(ToolRunnerAgent::new(
            "Debugger",
            debugger_tools(ExecutorConfig::default(), LinterConfig::default()),
        )),
    ]
}
