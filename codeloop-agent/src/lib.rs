//! # codeloop Agent
//!
//! Runs a fixed number of turns over a list of agents in round-robin order:
//! 1. The user's task is the first message
//! 2. The agent whose turn it is replies to the current message
//! 3. Linter-named agents' replies update the last quality score
//! 4. A coder reply with no code after a perfect score is dropped
//! 5. Every other reply is appended and becomes the next message
//!
//! The standard pairing is a `Coder` (LLM) and a `Debugger` that executes and
//! lints the code, see [`code_debugging_agents`].

mod agent;
mod chat;
mod fence;
mod policy;
mod signal;
mod state;
mod tool;

pub use agent::{
    code_debugging_agents, debugger_tools, Agent, GeneratorAgent, ToolRunnerAgent,
    DEFAULT_INSTRUCTION,
};
pub use chat::{ChatConfig, RoundRobinChat};
pub use fence::{extract_code_block, strip_fence};
pub use policy::{evaluate, TurnDecision, SUPPRESSION_NOTICE};
pub use signal::{extract_quality_score, Signal, SignalRole, PERFECT_SCORE};
pub use state::{ConversationState, HistoryEntry, TurnOutcome, TurnRecord};
pub use tool::{
    ExecutionOutcome, ExecutorConfig, ExecutorTool, LinterConfig, LinterTool, Tool,
    PYLINT_LINTER, PYTHON_EXECUTOR,
};

pub use codeloop_error::{Error, ErrorKind, Result};
