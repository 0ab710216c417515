//! The Step Runner — the inner loop (spec §4.4, component C4). Drives one
//! step through `PREPARE -> OPTIMIZE -> (TOOL | FINALIZE) -> OPTIMIZE ...
//! -> EVALUATE -> (COMMIT | OPTIMIZE | ESCALATE)` entirely through
//! [`skills_core::StateDelta`] application, so the node logic here stays a
//! pure function of `(ExecutionState, Adapters)` (spec §9's anti-singleton
//! redesign note) rather than a closure over shared mutable state.

use skills_adapters::{Adapters, ChatOutcome, ChatRequest, ToolSpec};
use skills_core::{
    CounterField, ExecutionState, Message, StateDelta, Step, Verdict, STUCK_THRESHOLD,
};
use skills_gateway::SecurityGateway;

use crate::anchor::{primary_directive_anchor, should_anchor};
use crate::evaluate::{evaluate, EvaluatorConfig};
use crate::error::RunnerError;
use crate::node_outcome::{NodeOutcome, StepOutcome};
use crate::optimizer::classify_optimizer_response;
use crate::tool_exec::run_tool_request;

const OPTIMIZER_SYSTEM_PROMPT: &str = "You are the optimizing stage of an agentic \
skill-execution engine. Use the available tools to make progress on the current step. When \
the step is done, emit a response beginning with the reserved completion marker STEP_COMPLETE:.";

pub struct StepRunnerConfig {
    pub anchor_every_n_tool_calls: u32,
    pub evaluator: EvaluatorConfig,
}

impl Default for StepRunnerConfig {
    fn default() -> Self {
        Self {
            anchor_every_n_tool_calls: skills_core::ANCHOR_EVERY_N_TOOL_CALLS,
            evaluator: EvaluatorConfig {
                max_tool_rounds: skills_core::EVALUATOR_MAX_TOOL_ROUNDS,
                anchor_every_n_tool_calls: skills_core::ANCHOR_EVERY_N_TOOL_CALLS,
            },
        }
    }
}

/// Drive `state`'s current step to completion: either a COMMIT (the
/// Orchestrator advances to the next step) or an ESCALATE (the
/// Orchestrator must get operator input before calling this again).
///
/// `global_context` is L1, already loaded and cached by the caller. Never
/// returns `Err` for a model-endpoint failure during OPTIMIZE or EVALUATE —
/// both fold a transport error into a FAIL verdict (spec §7:
/// `MODEL_TRANSPORT_ERROR` retries within the step budget, then escalates;
/// it never aborts the run).
pub async fn run_step(
    adapters: &Adapters,
    config: &StepRunnerConfig,
    state: &mut ExecutionState,
    gateway: &SecurityGateway,
    tool_specs: &[ToolSpec],
    global_context: &str,
) -> Result<StepOutcome, RunnerError> {
    state.check_index_invariant()?;
    let step = state.current_step().cloned().ok_or(RunnerError::NoCurrentStep)?;

    let (system, user) = prepare_messages(global_context, &state.skill_memory, &step);
    state.apply(StateDelta::ResetLoop { system, user })?;

    loop {
        let optimize_result =
            optimize_and_tool_loop(adapters, config, state, gateway, tool_specs, &step, global_context).await;

        let verdict = match optimize_result {
            Ok(()) => evaluate(adapters, &config.evaluator, state, &step, gateway, tool_specs).await,
            Err(RunnerError::Transport(message)) => {
                tracing::warn!(step = step.index, error = %message, "optimizer transport error");
                Verdict::fail(format!("optimizer transport error: {message}"))
            }
            Err(err) => return Err(err),
        };

        state.apply(StateDelta::AppendMessage(Message::user(format!(
            "[Evaluator] Verdict={:?}; Feedback={}",
            verdict.verdict, verdict.feedback
        ))))?;
        let is_pass = verdict.is_pass();
        let key_outputs = verdict.key_outputs.clone();
        state.apply(StateDelta::SetLastVerdict(verdict))?;
        state.apply(StateDelta::IncrementCounter(CounterField::StepRetryCount))?;

        if is_pass {
            state.commit(&key_outputs)?;
            return Ok(StepOutcome::Commit);
        }

        // `max_retries` counts retries *after* the first attempt, so the
        // budget admits `max_retries + 1` total Evaluator passes before
        // escalating (spec §8 scenario 5: max_retries=2 escalates on the
        // third FAIL).
        if state.step_retry_count <= state.max_retries {
            continue;
        }

        return Ok(StepOutcome::Escalate);
    }
}

/// The OPTIMIZE <-> TOOL cycle (spec §4.4): loops until the Optimizer's
/// response carries no tool calls, i.e. an explicit or implicit
/// completion, then returns control to EVALUATE.
async fn optimize_and_tool_loop(
    adapters: &Adapters,
    config: &StepRunnerConfig,
    state: &mut ExecutionState,
    gateway: &SecurityGateway,
    tool_specs: &[ToolSpec],
    step: &Step,
    global_context: &str,
) -> Result<(), RunnerError> {
    loop {
        let request = ChatRequest::new(state.loop_messages.clone()).with_tools(tool_specs.to_vec());
        let outcome = adapters.model.chat(request).await?;
        let message = match outcome {
            ChatOutcome::Message(message) => message,
            ChatOutcome::Structured(_) => return Err(RunnerError::UnexpectedStructuredResponse),
        };
        state.apply(StateDelta::AppendMessage(message.clone()))?;

        match classify_optimizer_response(&message) {
            NodeOutcome::ToolCalls(calls) => {
                // A tool round that would push current_loop_count past
                // STUCK_THRESHOLD never runs: the engine replans instead
                // (spec §4.4, §8 scenario 4). `current_loop_count` counts
                // completed TOOL rounds, so the ninth attempted round is
                // the one where `current_loop_count == STUCK_THRESHOLD`.
                if state.current_loop_count >= STUCK_THRESHOLD {
                    tracing::warn!(
                        step = step.index,
                        current_loop_count = state.current_loop_count,
                        "stuck-loop cutoff reached, replanning"
                    );
                    let (system, user) = prepare_messages(global_context, &state.skill_memory, step);
                    state.apply(StateDelta::ResetLoop { system, user })?;
                    continue;
                }

                for call in &calls {
                    let output = run_tool_request(gateway, &call.request);
                    state.apply(StateDelta::AppendMessage(Message::tool_result(
                        call.id.clone(),
                        output,
                    )))?;
                    state.apply(StateDelta::IncrementCounter(CounterField::StepToolCallCount))?;
                    if should_anchor(state.step_tool_call_count, config.anchor_every_n_tool_calls) {
                        state.apply(StateDelta::AppendMessage(primary_directive_anchor(
                            &step.optimizer_instruction,
                        )))?;
                    }
                }
                state.apply(StateDelta::IncrementCounter(CounterField::CurrentLoopCount))?;
            }
            NodeOutcome::Completion | NodeOutcome::ImplicitCompletion => {
                if matches!(classify_optimizer_response(&message), NodeOutcome::ImplicitCompletion) {
                    tracing::warn!(step = step.index, "optimizer completed without the reserved marker");
                }
                return Ok(());
            }
        }
    }
}

/// Build the canonical `[system, user]` PREPARE seed (spec §4.4): the
/// system message carries global behaviour rules (L1); the user message
/// carries the `<skill_memory>` block (L2) followed by the step's
/// `<instruction>` block and the completion-marker rule.
fn prepare_messages(global_context: &str, skill_memory: &[String], step: &Step) -> (Message, Message) {
    let system = Message::system(format!(
        "You are the optimizing stage of an agentic skill-execution engine.\n\n{}\n\n{}",
        global_context, OPTIMIZER_SYSTEM_PROMPT
    ));
    let memory_block = skills_memory::format_skill_memory(skill_memory);
    let user = Message::user(format!(
        "<skill_memory>\n{memory_block}\n</skill_memory>\n<instruction>\n{}\n\nWhen the step is done, emit a response beginning with the reserved completion marker.\n</instruction>",
        step.optimizer_instruction
    ));
    (system, user)
}
