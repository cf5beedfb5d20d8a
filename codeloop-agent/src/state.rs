//! Conversation state threaded through one chat run

use crate::signal::{Signal, PERFECT_SCORE};
use codeloop_llm::UsageTracker;
use serde::Serialize;

/// One appended message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub agent: String,
    pub message: String,
}

impl HistoryEntry {
    pub fn new(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            message: message.into(),
        }
    }
}

/// What happened to a turn's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOutcome {
    /// Reply was appended to history and became the next message
    Appended,
    /// Reply was dropped; the previous message is reused
    Suppressed,
}

/// Every turn that ran, suppressed or not
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRecord {
    pub turn: usize,
    pub agent: String,
    pub outcome: TurnOutcome,
}

/// Mutable record of a run. Owned by the chat loop; agents only ever see
/// `&[HistoryEntry]`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    /// Appended replies, in turn order
    pub history: Vec<HistoryEntry>,
    /// Latest score reported by a linter turn; `None` means unknown
    pub last_quality_score: Option<f64>,
    /// Set when the previous coder turn was suppressed
    pub suppress_next_empty_output: bool,
    pub transcript: Vec<TurnRecord>,
    /// Token usage summed over every LLM-backed agent
    pub usage: UsageTracker,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the last score; a report without one clears it
    pub fn record_score(&mut self, score: Signal<f64>) {
        self.last_quality_score = score.found();
    }

    pub fn has_perfect_score(&self) -> bool {
        self.last_quality_score == Some(PERFECT_SCORE)
    }

    pub(crate) fn append(&mut self, turn: usize, agent: &str, message: String) {
        self.history.push(HistoryEntry::new(agent, message));
        self.transcript.push(TurnRecord {
            turn,
            agent: agent.to_string(),
            outcome: TurnOutcome::Appended,
        });
    }

    pub(crate) fn suppress(&mut self, turn: usize, agent: &str) {
        self.transcript.push(TurnRecord {
            turn,
            agent: agent.to_string(),
            outcome: TurnOutcome::Suppressed,
        });
    }

    /// Number of turns that were skipped
    pub fn suppressed_turns(&self) -> usize {
        self.transcript
            .iter()
            .filter(|t| t.outcome == TurnOutcome::Suppressed)
            .count()
    }

    /// The most recent appended message
    pub fn last_message(&self) -> Option<&str> {
        self.history.last().map(|e| e.message.as_str())
    }
}
