//! Round-robin chat over a fixed set of agents

use crate::agent::Agent;
use crate::policy::{evaluate, TurnDecision, SUPPRESSION_NOTICE};
use crate::state::ConversationState;
use codeloop_error::{Error, Result};

/// Configuration for a chat run
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Number of turns; every turn runs, there is no early exit
    pub total_turns: usize,
    /// Print each turn to stdout
    pub verbose: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            total_turns: 4,
            verbose: true,
        }
    }
}

impl ChatConfig {
    pub fn with_turns(mut self, total_turns: usize) -> Self {
        self.total_turns = total_turns;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }
}

/// Agents take turns in a fixed cycle. Each reply becomes the next agent's
/// message unless the suppression policy drops it.
pub struct RoundRobinChat {
    agents: Vec<Box<dyn Agent>>,
    config: ChatConfig,
}

impl RoundRobinChat {
    pub fn new(agents: Vec<Box<dyn Agent>>) -> Self {
        Self::with_config(agents, ChatConfig::default())
    }

    pub fn with_config(agents: Vec<Box<dyn Agent>>, config: ChatConfig) -> Self {
        Self { agents, config }
    }

    pub fn agents(&self) -> &[Box<dyn Agent>] {
        &self.agents
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Run `total_turns` turns starting from `seed`.
    ///
    /// Turn `t` goes to `agents[t % len]`. The first failing reply aborts the
    /// run and its error is returned as is.
    pub async fn run(&self, seed: &str) -> Result<ConversationState> {
        if self.agents.is_empty() {
            return Err(Error::invalid_argument("chat needs at least one agent")
                .with_operation("chat::run"));
        }
        if self.config.total_turns == 0 {
            return Err(Error::invalid_argument("total_turns must be at least 1")
                .with_operation("chat::run"));
        }

        let mut state = ConversationState::new();
        let mut message = seed.to_string();

        tracing::info!(
            agents = self.agents.len(),
            turns = self.config.total_turns,
            "starting chat"
        );
        if self.config.verbose {
            println!("\n🧑 User Prompt: {}\n", seed);
        }

        for turn in 0..self.config.total_turns {
            let agent = &self.agents[turn % self.agents.len()];
            let name = agent.name();

            tracing::info!(turn, agent = name, "turn started");
            if self.config.verbose {
                println!("\n[{}]", name);
            }

            let response = agent
                .reply(&message, &state.history)
                .await
                .map_err(|e| tag_turn_error(e, turn, name))?;

            match evaluate(&mut state, agent.role(), &response) {
                TurnDecision::Append => {
                    if self.config.verbose {
                        println!("{}", response);
                    }
                    tracing::info!(
                        turn,
                        agent = name,
                        chars = response.len(),
                        score = ?state.last_quality_score,
                        "turn finished"
                    );
                    state.append(turn, name, response.clone());
                    message = response;
                }
                TurnDecision::Suppress => {
                    if self.config.verbose {
                        println!("{}", SUPPRESSION_NOTICE);
                    }
                    tracing::info!(turn, agent = name, "reply suppressed, code already perfect");
                    state.suppress(turn, name);
                }
            }
        }

        for usage in self.agents.iter().filter_map(|a| a.usage()) {
            state.usage.merge(&usage);
        }

        tracing::info!(
            appended = state.history.len(),
            suppressed = state.suppressed_turns(),
            tokens = state.usage.total_tokens(),
            "chat finished"
        );
        Ok(state)
    }
}

/// Record where in the run a reply failed. The error keeps its kind.
fn tag_turn_error(err: Error, turn: usize, agent: &str) -> Error {
    let err = err.with_operation("chat::turn").with_context("turn", turn.to_string());
    if err.context_value("agent").is_some() {
        err
    } else {
        err.with_context("agent", agent)
    }
}
