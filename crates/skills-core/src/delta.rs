//! Tagged-variant encoding of node effects and routing decisions (spec §9
//! redesign note): every node is modeled as a pure function
//! `(ExecutionState, Adapters) -> StateDelta`, and the Orchestrator is the
//! sole applier of deltas. This removes the need for module-level mutable
//! singletons and makes P1-P3 statically auditable, since every mutation to
//! `ExecutionState` funnels through [`ExecutionState::apply`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{ExecutionState, Message, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    StepRetryCount,
    StepToolCallCount,
    CurrentLoopCount,
}

/// One effect a node wants applied to `ExecutionState`. A node may return
/// several in sequence (e.g. TOOL appends a message *and* increments a
/// counter).
#[derive(Debug, Clone)]
pub enum StateDelta {
    AppendMessage(Message),
    IncrementCounter(CounterField),
    SetLastVerdict(Verdict),
    /// PREPARE entry: wipe L3 and seed `[system, user]`.
    ResetLoop { system: Message, user: Message },
    Commit { key_outputs: BTreeMap<String, String> },
}

/// The closed routing enum replacing the source's string-returning router
/// functions (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    PrepareStep,
    OptimizeStep,
    ExecuteTool,
    Evaluate,
    Commit,
    Escalate,
    End,
}

impl ExecutionState {
    /// Apply a single delta. The only place `ExecutionState`'s fields are
    /// mutated outside of direct construction/tests.
    pub fn apply(&mut self, delta: StateDelta) -> Result<(), CoreError> {
        match delta {
            StateDelta::AppendMessage(message) => self.loop_messages.push(message),
            StateDelta::IncrementCounter(field) => match field {
                CounterField::StepRetryCount => self.step_retry_count += 1,
                CounterField::StepToolCallCount => self.step_tool_call_count += 1,
                CounterField::CurrentLoopCount => self.current_loop_count += 1,
            },
            StateDelta::SetLastVerdict(verdict) => self.last_verdict = Some(verdict),
            StateDelta::ResetLoop { system, user } => self.prepare_step(system, user),
            StateDelta::Commit { key_outputs } => self.commit(&key_outputs)?,
        }
        Ok(())
    }

    pub fn apply_all(&mut self, deltas: Vec<StateDelta>) -> Result<(), CoreError> {
        for delta in deltas {
            self.apply(delta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    #[test]
    fn append_message_delta_grows_loop_messages() {
        let mut state = ExecutionState::new(vec![], 1);
        state
            .apply(StateDelta::AppendMessage(Message::user("hi")))
            .unwrap();
        assert_eq!(state.loop_messages.len(), 1);
    }

    #[test]
    fn increment_counter_delta_targets_right_field() {
        let mut state = ExecutionState::new(vec![], 1);
        state
            .apply(StateDelta::IncrementCounter(CounterField::CurrentLoopCount))
            .unwrap();
        assert_eq!(state.current_loop_count, 1);
        assert_eq!(state.step_tool_call_count, 0);
    }

    #[test]
    fn reset_loop_delta_matches_prepare_step() {
        let mut state = ExecutionState::new(vec![], 1);
        state.current_loop_count = 4;
        state
            .apply(StateDelta::ResetLoop {
                system: Message::system("rules"),
                user: Message::user("go"),
            })
            .unwrap();
        assert_eq!(state.loop_messages.len(), 2);
        assert_eq!(state.current_loop_count, 0);
    }

    #[test]
    fn commit_delta_advances_step_index() {
        let steps = vec![Step {
            index: 0,
            optimizer_instruction: "a".into(),
            evaluator_instruction: "a".into(),
            tools_hint: vec!["t".into()],
            depends_on: vec![],
        }];
        let mut state = ExecutionState::new(steps, 1);
        let mut outputs = BTreeMap::new();
        outputs.insert("k".to_string(), "v".to_string());
        state.apply(StateDelta::Commit { key_outputs: outputs }).unwrap();
        assert_eq!(state.current_step_index, 1);
    }

    #[test]
    fn apply_all_runs_in_order() {
        let mut state = ExecutionState::new(vec![], 1);
        state
            .apply_all(vec![
                StateDelta::AppendMessage(Message::system("s")),
                StateDelta::AppendMessage(Message::user("u")),
                StateDelta::IncrementCounter(CounterField::StepToolCallCount),
            ])
            .unwrap();
        assert_eq!(state.loop_messages.len(), 2);
        assert_eq!(state.step_tool_call_count, 1);
    }
}
