//! The OPTIMIZE node (spec §4.4): classify the Optimizer's response into
//! the closed [`crate::node_outcome::NodeOutcome`] enum. Generalizes the
//! teacher's `Executor` data-enum pattern (spec §9) — an exhaustive match
//! replaces ad hoc string-sniffing for "did the model finish, or does it
//! want a tool?".

use skills_core::Message;

use crate::node_outcome::NodeOutcome;

/// Classify one assistant response produced during OPTIMIZE.
///
/// A response carrying structured tool calls always routes to TOOL,
/// regardless of its text content. A text-only response routes to
/// EVALUATE either way (spec §4.4) — the distinction between `Completion`
/// and `ImplicitCompletion` only affects what gets logged, per the open
/// question resolution in SPEC_FULL.md §9: a missing marker is tolerated,
/// not treated as FAIL.
pub fn classify_optimizer_response(message: &Message) -> NodeOutcome {
    if let Message::Assistant { tool_calls, .. } = message {
        if !tool_calls.is_empty() {
            return NodeOutcome::ToolCalls(tool_calls.clone());
        }
    }

    if message.starts_with_completion_marker() {
        NodeOutcome::Completion
    } else {
        NodeOutcome::ImplicitCompletion
    }
}
