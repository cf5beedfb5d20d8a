//! Between-turn bookkeeping: track the lint score and stop the coder from
//! bouncing empty patches once the code is already perfect.

use crate::fence::extract_code_block;
use crate::signal::{extract_quality_score, SignalRole};
use crate::state::ConversationState;

/// Notice emitted in place of a suppressed coder reply
pub const SUPPRESSION_NOTICE: &str =
    "# No changes needed, code is perfect. Skipping empty code generation.";

/// What the chat loop should do with a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDecision {
    Append,
    Suppress,
}

/// Update `state` from a reply and decide whether to keep it.
///
/// Linter replies refresh the score. Coder replies are suppressed when the
/// score is perfect and either the reply has no code or the previous coder
/// reply was already suppressed. The second branch means that once a
/// suppression happened under a perfect score, further coder replies are
/// dropped even if they contain code.
pub fn evaluate(state: &mut ConversationState, role: SignalRole, response: &str) -> TurnDecision {
    match role {
        SignalRole::Linter => {
            state.record_score(extract_quality_score(response));
            TurnDecision::Append
        }
        SignalRole::Coder => {
            let code = extract_code_block(response).found().unwrap_or("");
            if state.has_perfect_score() && (code.is_empty() || state.suppress_next_empty_output) {
                state.suppress_next_empty_output = true;
                TurnDecision::Suppress
            } else {
                state.suppress_next_empty_output = false;
                TurnDecision::Append
            }
        }
        SignalRole::Other => TurnDecision::Append,
    }
}
