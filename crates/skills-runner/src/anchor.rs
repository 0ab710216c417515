//! The primary-directive anchor (spec §4.4): every `ANCHOR_EVERY_N_TOOL_CALLS`
//! cumulative tool calls, a synthetic user message re-stating the current
//! step's instruction is appended to counteract attention drift across long
//! tool sequences. Both the Optimizer's TOOL node and the Evaluator's Phase 1
//! tool loop share this exact check (spec §4.4: "its intermediate tool-call
//! rounds also trigger the anchor mechanism").

use skills_core::Message;

/// True once `cumulative_tool_calls` lands exactly on a multiple of
/// `every_n` (and `every_n` is non-zero, since a zero period would anchor on
/// every call rather than periodically).
pub fn should_anchor(cumulative_tool_calls: u32, every_n: u32) -> bool {
    every_n > 0 && cumulative_tool_calls > 0 && cumulative_tool_calls % every_n == 0
}

pub fn primary_directive_anchor(instruction: &str) -> Message {
    Message::user(format!("<primary_directive>\n{instruction}\n</primary_directive>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_on_exact_multiples_only() {
        assert!(!should_anchor(1, 3));
        assert!(!should_anchor(2, 3));
        assert!(should_anchor(3, 3));
        assert!(!should_anchor(4, 3));
        assert!(should_anchor(6, 3));
    }

    #[test]
    fn never_anchors_at_zero_calls() {
        assert!(!should_anchor(0, 3));
    }

    #[test]
    fn zero_period_never_anchors() {
        assert!(!should_anchor(3, 0));
    }

    #[test]
    fn anchor_message_carries_the_instruction() {
        let message = primary_directive_anchor("Write ok to out.txt");
        match message {
            Message::User { content } => {
                assert!(content.contains("<primary_directive>"));
                assert!(content.contains("Write ok to out.txt"));
            }
            _ => panic!("expected a user message"),
        }
    }
}
