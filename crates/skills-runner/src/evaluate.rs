//! The EVALUATE node (spec §4.4): a two-phase Evaluator invocation sharing
//! one transcript throughout (SPEC_FULL.md §9 resolves the source's
//! ambiguity here — Phase 1's read-only inspection evidence must still be
//! present when Phase 2 asks for a verdict, or it would be silently
//! dropped).
//!
//! Phase 1 is a bounded read-only tool loop (`EVALUATOR_MAX_TOOL_ROUNDS`);
//! Phase 2 re-invokes the same endpoint on the same transcript, now
//! constrained to a structured [`Verdict`].

use skills_adapters::{Adapters, ChatOutcome, ChatRequest, StructuredSchema, ToolSpec};
use skills_core::{ExecutionState, Message, Step, Verdict};
use skills_gateway::SecurityGateway;

use crate::anchor::{primary_directive_anchor, should_anchor};
use crate::schema::verdict_structured_schema;
use crate::tool_exec::run_tool_request;

const EVALUATOR_SYSTEM_PROMPT: &str = "You are the verification stage of an agentic \
skill-execution engine. Inspect the transcript of what the Optimizer just did, using \
read-only tools if you need more evidence, then issue a verdict on whether the step's goal \
was met. Only PASS if you have positive evidence; a FAIL verdict must carry no key_outputs.";

pub struct EvaluatorConfig {
    pub max_tool_rounds: u32,
    pub anchor_every_n_tool_calls: u32,
}

/// Run both phases and return the resulting [`Verdict`]. Never returns an
/// `Err` — a transport failure or schema violation during either phase
/// degrades to a FAIL verdict (spec §4.4 failure semantics: "a malformed
/// Verdict is equivalent to FAIL").
pub async fn evaluate(
    adapters: &Adapters,
    config: &EvaluatorConfig,
    state: &ExecutionState,
    step: &Step,
    gateway: &SecurityGateway,
    tool_specs: &[ToolSpec],
) -> Verdict {
    let mut transcript = state.loop_messages.clone();
    transcript.push(Message::system(EVALUATOR_SYSTEM_PROMPT));
    transcript.push(Message::user(format!(
        "<evaluator_instruction>\n{}\n</evaluator_instruction>",
        step.evaluator_instruction
    )));

    // `step_tool_call_count` counts Optimizer turns only (spec's L3 state
    // table), so Phase 1's own read-only tool rounds anchor off a local
    // counter instead — mutating the shared one here would consume anchor
    // slots without ever reaching L3, throwing off P6's periodicity for
    // whatever OPTIMIZE retry follows this EVALUATE.
    let mut evaluator_tool_call_count = 0u32;

    for _round in 0..config.max_tool_rounds {
        let request = ChatRequest::new(transcript.clone()).with_tools(tool_specs.to_vec());
        let outcome = match adapters.model.chat(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, step = step.index, "evaluator transport error in phase 1");
                return Verdict::fail(format!("evaluator transport error: {err}"));
            }
        };

        let message = match outcome {
            ChatOutcome::Message(message) => message,
            // A structured reply this early is unexpected but not fatal:
            // treat it as "nothing left to inspect" and fall through to
            // Phase 2, which will issue its own structured request anyway.
            ChatOutcome::Structured(_) => break,
        };

        let tool_calls = match &message {
            Message::Assistant { tool_calls, .. } => tool_calls.clone(),
            _ => Vec::new(),
        };
        transcript.push(message);

        if tool_calls.is_empty() {
            break;
        }

        for call in &tool_calls {
            let output = run_tool_request(gateway, &call.request);
            transcript.push(Message::tool_result(call.id.clone(), output));
            evaluator_tool_call_count += 1;
            if should_anchor(evaluator_tool_call_count, config.anchor_every_n_tool_calls) {
                transcript.push(primary_directive_anchor(&step.optimizer_instruction));
            }
        }
    }

    let request = ChatRequest::new(transcript).with_structured_schema(StructuredSchema {
        name: "verdict".to_string(),
        schema: verdict_structured_schema(),
    });
    let outcome = match adapters.model.chat(request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, step = step.index, "evaluator transport error in phase 2");
            return Verdict::fail(format!("evaluator transport error: {err}"));
        }
    };

    let value = match outcome {
        ChatOutcome::Structured(value) => value,
        ChatOutcome::Message(_) => {
            tracing::warn!(step = step.index, "evaluator did not return a structured verdict");
            return Verdict::schema_violation();
        }
    };

    let parsed: Result<Verdict, String> = serde_json::from_value::<Verdict>(value)
        .map_err(|err| err.to_string())
        .and_then(|verdict| verdict.validate().map(|_| verdict).map_err(|err| err.to_string()));

    match parsed {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::warn!(step = step.index, error = %err, "verdict schema violation");
            Verdict::schema_violation()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skills_adapters::testing::ScriptedModelEndpoint;
    use skills_adapters::{Clock, FileSkillFileStore, SystemClock};
    use skills_config::ToolConfigFile;
    use skills_memory::InMemoryCheckpointStore;
    use std::sync::Arc;

    fn adapters_with(script: Vec<Result<ChatOutcome, skills_adapters::AdapterError>>) -> Adapters {
        Adapters {
            model: Arc::new(ScriptedModelEndpoint::new(script)),
            checkpoint: Arc::new(InMemoryCheckpointStore::default()),
            skill_file: Arc::new(FileSkillFileStore),
            clock: Arc::new(SystemClock) as Arc<dyn Clock>,
        }
    }

    fn sample_step() -> Step {
        Step {
            index: 0,
            optimizer_instruction: "Write ok to out.txt".into(),
            evaluator_instruction: "Confirm out.txt contains ok".into(),
            tools_hint: vec!["write_text".into()],
            depends_on: vec![],
        }
    }

    fn default_config() -> EvaluatorConfig {
        EvaluatorConfig {
            max_tool_rounds: 5,
            anchor_every_n_tool_calls: 3,
        }
    }

    #[tokio::test]
    async fn immediate_structured_pass_is_returned() {
        // Phase 1 gets a plain "nothing more to check" reply with no tool
        // calls and breaks on its own; Phase 2 then issues the real
        // structured request and gets the verdict.
        let adapters = adapters_with(vec![
            Ok(ChatOutcome::Message(Message::assistant_text("no further evidence needed"))),
            Ok(ChatOutcome::Structured(json!({
                "verdict": "PASS",
                "feedback": "looks good",
                "key_outputs": {"written_path": "out.txt"}
            }))),
        ]);
        let gateway = SecurityGateway::new(ToolConfigFile::default(), vec![], std::env::temp_dir());
        let mut state = ExecutionState::new(vec![sample_step()], 2);
        let verdict = evaluate(&adapters, &default_config(), &mut state, &sample_step(), &gateway, &[]).await;
        assert!(verdict.is_pass());
        assert_eq!(verdict.key_outputs.get("written_path").unwrap(), "out.txt");
    }

    #[tokio::test]
    async fn immediate_structured_reply_in_phase_one_falls_through_to_phase_two() {
        // A Structured reply during Phase 1 is unexpected but not fatal:
        // Phase 1 breaks immediately and Phase 2 still issues its own
        // request, which is the one that actually produces the verdict.
        let adapters = adapters_with(vec![
            Ok(ChatOutcome::Structured(json!({"verdict": "PASS", "feedback": "early", "key_outputs": {}}))),
            Ok(ChatOutcome::Structured(json!({
                "verdict": "PASS",
                "feedback": "looks good",
                "key_outputs": {"written_path": "out.txt"}
            }))),
        ]);
        let gateway = SecurityGateway::new(ToolConfigFile::default(), vec![], std::env::temp_dir());
        let mut state = ExecutionState::new(vec![sample_step()], 2);
        let verdict = evaluate(&adapters, &default_config(), &mut state, &sample_step(), &gateway, &[]).await;
        assert!(verdict.is_pass());
        assert_eq!(verdict.feedback, "looks good");
    }

    #[tokio::test]
    async fn malformed_structured_response_degrades_to_fail() {
        let adapters = adapters_with(vec![
            Ok(ChatOutcome::Message(Message::assistant_text("no further evidence needed"))),
            Ok(ChatOutcome::Structured(json!({"nonsense": true}))),
        ]);
        let gateway = SecurityGateway::new(ToolConfigFile::default(), vec![], std::env::temp_dir());
        let mut state = ExecutionState::new(vec![sample_step()], 2);
        let verdict = evaluate(&adapters, &default_config(), &mut state, &sample_step(), &gateway, &[]).await;
        assert!(!verdict.is_pass());
        assert_eq!(verdict.feedback, "verdict schema violation");
    }

    #[tokio::test]
    async fn phase_one_tool_calls_do_not_advance_the_shared_optimizer_counter() {
        // step_tool_call_count tracks Optimizer turns only (spec's L3 state
        // table); the Evaluator's own read-only inspection rounds must not
        // consume anchor slots from it, or a later OPTIMIZE retry's anchors
        // would stop landing on exact multiples of ANCHOR_EVERY_N_TOOL_CALLS.
        let tool_call = skills_core::ToolCall {
            id: "call_1".into(),
            request: skills_core::ToolRequest::Cli {
                tool_name: "read_text".into(),
                params: std::collections::BTreeMap::new(),
            },
        };
        let adapters = adapters_with(vec![
            Ok(ChatOutcome::Message(Message::assistant_tool_calls("", vec![tool_call.clone()]))),
            Ok(ChatOutcome::Message(Message::assistant_tool_calls("", vec![tool_call.clone()]))),
            Ok(ChatOutcome::Message(Message::assistant_tool_calls("", vec![tool_call]))),
            Ok(ChatOutcome::Message(Message::assistant_text("no further evidence needed"))),
            Ok(ChatOutcome::Structured(json!({
                "verdict": "FAIL",
                "feedback": "still checking",
                "key_outputs": {}
            }))),
        ]);
        let gateway = SecurityGateway::new(ToolConfigFile::default(), vec![], std::env::temp_dir());
        let state = ExecutionState::new(vec![sample_step()], 2);
        let before = state.step_tool_call_count;
        let verdict = evaluate(&adapters, &default_config(), &state, &sample_step(), &gateway, &[]).await;
        assert!(!verdict.is_pass());
        assert_eq!(state.step_tool_call_count, before);
    }

    #[tokio::test]
    async fn transport_error_in_phase_two_degrades_to_fail() {
        let adapters = adapters_with(vec![
            Ok(ChatOutcome::Message(Message::assistant_text("no further evidence needed"))),
            Err(skills_adapters::AdapterError::Transport("connection refused".into())),
        ]);
        let gateway = SecurityGateway::new(ToolConfigFile::default(), vec![], std::env::temp_dir());
        let mut state = ExecutionState::new(vec![sample_step()], 2);
        let verdict = evaluate(&adapters, &default_config(), &mut state, &sample_step(), &gateway, &[]).await;
        assert!(!verdict.is_pass());
        assert!(verdict.feedback.contains("transport error"));
    }

    #[tokio::test]
    async fn non_structured_final_response_is_schema_violation() {
        let adapters = adapters_with(vec![
            Ok(ChatOutcome::Message(Message::assistant_text("no further evidence needed"))),
            Ok(ChatOutcome::Message(Message::assistant_text("I refuse to produce structured output"))),
        ]);
        let gateway = SecurityGateway::new(ToolConfigFile::default(), vec![], std::env::temp_dir());
        let mut state = ExecutionState::new(vec![sample_step()], 2);
        let verdict = evaluate(&adapters, &default_config(), &mut state, &sample_step(), &gateway, &[]).await;
        assert_eq!(verdict.feedback, "verdict schema violation");
    }
}
