//! The Step/Plan/Verdict data model and the Execution State working tuple
//! (spec §3). `ExecutionState` is exclusively owned by the Orchestrator; the
//! Step Runner is only ever given a mutable reference for one step's
//! duration, and the Security Gateway owns no state at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Reserved text prefix by which the Optimizer declares a step done without
/// further tool calls.
pub const COMPLETION_MARKER: &str = "STEP_COMPLETE:";

/// Re-enter PREPARE (wiping L3) once `current_loop_count` exceeds this many
/// cumulative tool-executor invocations within a single step.
pub const STUCK_THRESHOLD: u32 = 8;

/// Re-inject a `<primary_directive>` anchor every N cumulative tool calls.
pub const ANCHOR_EVERY_N_TOOL_CALLS: u32 = 3;

/// Bound on the Evaluator's Phase 1 read-only inspection tool-loop.
pub const EVALUATOR_MAX_TOOL_ROUNDS: u32 = 5;

/// One executable unit of a Plan.
///
/// Invariant: a step performs either at most one I/O action (tool-bound) or
/// zero I/O actions (pure-reasoning) — mixing is forbidden. The engine does
/// not enforce this on construction (the Planner prompt and the test suite
/// do); [`Step::is_tool_bound`] reports the declared intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    pub optimizer_instruction: String,
    pub evaluator_instruction: String,
    #[serde(default)]
    pub tools_hint: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<usize>,
}

impl Step {
    pub fn is_tool_bound(&self) -> bool {
        !self.tools_hint.is_empty()
    }
}

/// An ordered sequence of [`Step`]s plus a one-line goal. Immutable once
/// approved by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Check that step indices are `0..n-1` in order. The Planner must
    /// enforce this before returning a Plan to the Orchestrator.
    pub fn validate(&self) -> Result<(), CoreError> {
        let got: Vec<usize> = self.steps.iter().map(|s| s.index).collect();
        let expected: Vec<usize> = (0..self.steps.len()).collect();
        if got != expected {
            return Err(CoreError::StepIndicesNotSequential { got });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvalResult {
    Pass,
    Fail,
}

/// `{verdict, feedback, key_outputs}`. `key_outputs` is non-empty only if
/// `verdict = PASS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: EvalResult,
    pub feedback: String,
    #[serde(default)]
    pub key_outputs: BTreeMap<String, String>,
}

impl Verdict {
    pub fn pass(feedback: impl Into<String>, key_outputs: BTreeMap<String, String>) -> Self {
        Self {
            verdict: EvalResult::Pass,
            feedback: feedback.into(),
            key_outputs,
        }
    }

    pub fn fail(feedback: impl Into<String>) -> Self {
        Self {
            verdict: EvalResult::Fail,
            feedback: feedback.into(),
            key_outputs: BTreeMap::new(),
        }
    }

    /// A malformed Verdict (structured-output schema violation) is
    /// equivalent to FAIL with this fixed feedback (spec §4.4 failure
    /// semantics).
    pub fn schema_violation() -> Self {
        Self::fail("verdict schema violation")
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.verdict == EvalResult::Fail && !self.key_outputs.is_empty() {
            return Err(CoreError::FailVerdictWithKeyOutputs {
                count: self.key_outputs.len(),
            });
        }
        Ok(())
    }

    pub fn is_pass(&self) -> bool {
        self.verdict == EvalResult::Pass
    }
}

/// A `{tool_name, params}` or `{script_name, args, env}` request as emitted
/// by the Optimizer or Evaluator's structured tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolRequest {
    Cli {
        tool_name: String,
        params: BTreeMap<String, String>,
    },
    Script {
        script_name: String,
        args: Vec<String>,
        env: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub request: ToolRequest,
}

/// One entry in `loop_messages`. `Remove` is a tombstone used to reset the
/// list atomically (spec §3 message kinds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        tool_call_id: String,
        content: String,
    },
    Remove,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::ToolResult {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// True for an Optimizer/Evaluator response that begins (after trimming
    /// leading whitespace) with the reserved completion marker.
    pub fn starts_with_completion_marker(&self) -> bool {
        match self {
            Message::Assistant { content, .. } => {
                content.trim_start().starts_with(COMPLETION_MARKER)
            }
            _ => false,
        }
    }
}

/// The state machine's working tuple (spec §3). Exclusively owned by the
/// Orchestrator; the Step Runner borrows it mutably for one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub steps: Vec<Step>,
    pub current_step_index: usize,
    pub step_retry_count: u32,
    pub max_retries: u32,
    pub skill_memory: Vec<String>,
    pub loop_messages: Vec<Message>,
    pub step_tool_call_count: u32,
    pub current_loop_count: u32,
    pub last_verdict: Option<Verdict>,
}

impl ExecutionState {
    pub fn new(steps: Vec<Step>, max_retries: u32) -> Self {
        Self {
            steps,
            current_step_index: 0,
            step_retry_count: 0,
            max_retries,
            skill_memory: Vec::new(),
            loop_messages: Vec::new(),
            step_tool_call_count: 0,
            current_loop_count: 0,
            last_verdict: None,
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_step_index)
    }

    /// I1: `0 <= current_step_index <= len(steps)`.
    pub fn check_index_invariant(&self) -> Result<(), CoreError> {
        if self.current_step_index > self.steps.len() {
            return Err(CoreError::StepIndexOutOfBounds {
                index: self.current_step_index,
                len: self.steps.len(),
            });
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.current_step_index >= self.steps.len()
    }

    /// PREPARE entry: clear L3 and reset the per-step counters, then seed
    /// L3 with exactly `[system, user]` (I3).
    pub fn prepare_step(&mut self, system: Message, user: Message) {
        self.loop_messages = vec![system, user];
        self.step_retry_count = 0;
        self.step_tool_call_count = 0;
        self.current_loop_count = 0;
        self.last_verdict = None;
    }

    /// COMMIT: append each `k=v` from `key_outputs` to L2 and advance the
    /// step index. Resets retry/message state (I2).
    pub fn commit(&mut self, key_outputs: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if self.current_step_index >= self.steps.len() {
            return Err(CoreError::CommitWithoutPendingStep);
        }
        for (k, v) in key_outputs {
            self.skill_memory.push(format!("{k}={v}"));
        }
        self.current_step_index += 1;
        self.step_retry_count = 0;
        self.loop_messages.clear();
        Ok(())
    }

    /// ESCALATE return: reset retry count; the caller re-enters PREPARE.
    pub fn reset_after_escalation(&mut self) {
        self.step_retry_count = 0;
    }

    /// Operator "skip" after ESCALATE (spec §8 scenario 5): advance past the
    /// current step without a COMMIT. `skill_memory` is untouched — unlike
    /// [`Self::commit`], this never appends to L2, only an explicit
    /// operator-supplied "fix" under a reserved key prefix may do that
    /// (spec §7).
    pub fn force_advance(&mut self) -> Result<(), CoreError> {
        if self.current_step_index >= self.steps.len() {
            return Err(CoreError::CommitWithoutPendingStep);
        }
        self.current_step_index += 1;
        self.step_retry_count = 0;
        self.loop_messages.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_validate_accepts_sequential_indices() {
        let plan = Plan {
            goal: "demo".into(),
            steps: vec![
                Step {
                    index: 0,
                    optimizer_instruction: "do a".into(),
                    evaluator_instruction: "check a".into(),
                    tools_hint: vec![],
                    depends_on: vec![],
                },
                Step {
                    index: 1,
                    optimizer_instruction: "do b".into(),
                    evaluator_instruction: "check b".into(),
                    tools_hint: vec![],
                    depends_on: vec![0],
                },
            ],
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn plan_validate_rejects_gaps() {
        let plan = Plan {
            goal: "demo".into(),
            steps: vec![Step {
                index: 1,
                optimizer_instruction: "do a".into(),
                evaluator_instruction: "check a".into(),
                tools_hint: vec![],
                depends_on: vec![],
            }],
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn verdict_fail_with_key_outputs_is_invalid() {
        let mut outputs = BTreeMap::new();
        outputs.insert("k".to_string(), "v".to_string());
        let verdict = Verdict {
            verdict: EvalResult::Fail,
            feedback: "oops".into(),
            key_outputs: outputs,
        };
        assert!(verdict.validate().is_err());
    }

    #[test]
    fn verdict_pass_is_valid() {
        let mut outputs = BTreeMap::new();
        outputs.insert("written_path".to_string(), "out.txt".to_string());
        let verdict = Verdict::pass("looks good", outputs);
        assert!(verdict.validate().is_ok());
        assert!(verdict.is_pass());
    }

    #[test]
    fn completion_marker_detection() {
        let with_marker = Message::assistant_text(format!("{COMPLETION_MARKER} done"));
        assert!(with_marker.starts_with_completion_marker());

        let with_leading_whitespace =
            Message::assistant_text(format!("   {COMPLETION_MARKER} done"));
        assert!(with_leading_whitespace.starts_with_completion_marker());

        let without_marker = Message::assistant_text("I'm done");
        assert!(!without_marker.starts_with_completion_marker());
    }

    #[test]
    fn prepare_step_seeds_exactly_system_and_user() {
        let mut state = ExecutionState::new(vec![], 2);
        state.current_loop_count = 9;
        state.step_tool_call_count = 5;
        state.step_retry_count = 1;
        state.prepare_step(Message::system("rules"), Message::user("go"));

        assert_eq!(state.loop_messages.len(), 2);
        assert!(matches!(state.loop_messages[0], Message::System { .. }));
        assert!(matches!(state.loop_messages[1], Message::User { .. }));
        assert_eq!(state.step_retry_count, 0);
        assert_eq!(state.step_tool_call_count, 0);
        assert_eq!(state.current_loop_count, 0);
        assert!(state.last_verdict.is_none());
    }

    #[test]
    fn commit_appends_memory_and_resets_retry_state() {
        let steps = vec![Step {
            index: 0,
            optimizer_instruction: "write ok".into(),
            evaluator_instruction: "check ok".into(),
            tools_hint: vec!["write_text".into()],
            depends_on: vec![],
        }];
        let mut state = ExecutionState::new(steps, 3);
        state.loop_messages = vec![Message::system("s"), Message::user("u")];
        state.step_retry_count = 2;

        let mut outputs = BTreeMap::new();
        outputs.insert("written_path".to_string(), "out.txt".to_string());
        state.commit(&outputs).unwrap();

        assert_eq!(state.current_step_index, 1);
        assert_eq!(state.step_retry_count, 0);
        assert!(state.loop_messages.is_empty());
        assert_eq!(state.skill_memory, vec!["written_path=out.txt".to_string()]);
    }

    #[test]
    fn commit_without_pending_step_errors() {
        let mut state = ExecutionState::new(vec![], 1);
        assert!(state.commit(&BTreeMap::new()).is_err());
    }

    #[test]
    fn force_advance_does_not_touch_skill_memory() {
        let steps = vec![Step {
            index: 0,
            optimizer_instruction: "a".into(),
            evaluator_instruction: "a".into(),
            tools_hint: vec!["t".into()],
            depends_on: vec![],
        }];
        let mut state = ExecutionState::new(steps, 1);
        state.loop_messages = vec![Message::system("s"), Message::user("u")];
        state.step_retry_count = 1;

        state.force_advance().unwrap();

        assert_eq!(state.current_step_index, 1);
        assert_eq!(state.step_retry_count, 0);
        assert!(state.loop_messages.is_empty());
        assert!(state.skill_memory.is_empty());
    }

    #[test]
    fn memory_monotonicity_across_two_commits() {
        let steps = vec![
            Step {
                index: 0,
                optimizer_instruction: "a".into(),
                evaluator_instruction: "a".into(),
                tools_hint: vec!["t".into()],
                depends_on: vec![],
            },
            Step {
                index: 1,
                optimizer_instruction: "b".into(),
                evaluator_instruction: "b".into(),
                tools_hint: vec!["t".into()],
                depends_on: vec![],
            },
        ];
        let mut state = ExecutionState::new(steps, 1);

        let mut first = BTreeMap::new();
        first.insert("a".to_string(), "1".to_string());
        state.commit(&first).unwrap();
        let s1 = state.skill_memory.clone();

        let mut second = BTreeMap::new();
        second.insert("b".to_string(), "2".to_string());
        state.commit(&second).unwrap();
        let s2 = state.skill_memory.clone();

        assert!(s2.starts_with(&s1), "s1 must be a prefix of s2");
    }
}
