//! The Orchestrator — the outer loop (spec §4.5, component C5): step
//! router, commit, approval gate, and learning persistence wired around
//! the Step Runner's inner loop. Entry is a skill file path; operations
//! run in the exact five-step order spec §4.5 specifies.

use std::path::{Path, PathBuf};

use skills_adapters::{Adapters, ToolSpec};
use skills_core::{ExecutionState, Plan, Verdict};
use skills_gateway::SecurityGateway;
use skills_memory::load_global_context;
use skills_planner::{discover_scripts, Planner};
use skills_runner::{run_step, StepOutcome, StepRunnerConfig};

use crate::approval::{EscalationDecision, OperatorGate};
use crate::error::OrchestratorError;
use crate::skill_log::{self, FAILURE_CASES_HEADING, OPERATOR_FEEDBACK_HEADING, SUCCESS_CASES_HEADING};

/// What the run ultimately did, for the CLI binary to map onto an exit
/// code (spec §6: `0` success, `1` on abort/argument error/unapproved
/// plan — an unapproved plan is treated as a *clean* termination per
/// spec §4.5, so it is distinguished here rather than folded into an
/// error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorOutcome {
    Completed,
    OperatorRejectedPlan,
    OperatorAbortedAtEscalation { step_index: usize },
}

pub struct Orchestrator<'a> {
    pub adapters: &'a Adapters,
    pub gateway: &'a SecurityGateway,
    pub tool_specs: &'a [ToolSpec],
    pub config: skills_config::RunConfig,
    pub gate: &'a dyn OperatorGate,
    pub global_context_path: PathBuf,
    pub script_roots: Vec<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub async fn run(
        &self,
        skill_path: &Path,
        thread_id: &str,
    ) -> Result<OrchestratorOutcome, OrchestratorError> {
        let mut skill_text = self.adapters.skill_file.read(skill_path)?;
        if skill_text.trim().is_empty() {
            return Err(OrchestratorError::EmptySkillFile(
                skill_path.display().to_string(),
            ));
        }

        let plan = self.build_plan(&skill_text).await?;

        if !self.gate.approve_plan(&plan) {
            return Ok(OrchestratorOutcome::OperatorRejectedPlan);
        }

        let mut state = ExecutionState::new(plan.steps.clone(), self.config.max_retries);
        self.checkpoint(thread_id, &state);

        let global_context = load_global_context(&self.global_context_path);
        let step_runner_config = self.step_runner_config();

        while !state.is_complete() {
            let step_index = state.current_step_index;

            let outcome = run_step(
                self.adapters,
                &step_runner_config,
                &mut state,
                self.gateway,
                self.tool_specs,
                global_context,
            )
            .await?;

            self.checkpoint(thread_id, &state);

            if let Some(verdict) = state.last_verdict.clone() {
                skill_text = self.record_verdict(skill_path, &skill_text, &verdict)?;
            }

            match outcome {
                StepOutcome::Commit => continue,
                StepOutcome::Escalate => {
                    let step = plan
                        .steps
                        .get(step_index)
                        .expect("escalating step index must be within the approved plan");
                    let verdict = state
                        .last_verdict
                        .clone()
                        .expect("ESCALATE always follows an EVALUATE that set last_verdict");

                    match self.gate.resolve_escalation(step, &verdict) {
                        EscalationDecision::Retry => {
                            state.reset_after_escalation();
                        }
                        EscalationDecision::Skip => {
                            state.force_advance()?;
                            self.checkpoint(thread_id, &state);
                        }
                        EscalationDecision::Abort => {
                            return Ok(OrchestratorOutcome::OperatorAbortedAtEscalation {
                                step_index,
                            });
                        }
                    }
                }
            }
        }

        if let Some(feedback) = self.gate.request_feedback() {
            let updated = skill_log::append_entry(
                &skill_text,
                OPERATOR_FEEDBACK_HEADING,
                &feedback,
                self.adapters.clock.now(),
            );
            self.adapters.skill_file.write(skill_path, &updated)?;
        }

        Ok(OrchestratorOutcome::Completed)
    }

    async fn build_plan(&self, skill_text: &str) -> Result<Plan, OrchestratorError> {
        let planner = Planner::new(self.adapters.model.as_ref());
        let scripts = discover_scripts(&self.script_roots);
        let catalog = self.gateway.describe_catalog();
        Ok(planner.plan(skill_text, &scripts, &catalog).await?)
    }

    fn step_runner_config(&self) -> StepRunnerConfig {
        StepRunnerConfig {
            anchor_every_n_tool_calls: self.config.anchor_every_n_tool_calls,
            evaluator: skills_runner::EvaluatorConfig {
                max_tool_rounds: self.config.evaluator_max_tool_rounds,
                anchor_every_n_tool_calls: self.config.anchor_every_n_tool_calls,
            },
        }
    }

    /// L4 checkpoint write (spec §4.2, §9 Open Question 2): after every
    /// node transition, best-effort durable (spec §7: `CHECKPOINT_WRITE_FAILURE`
    /// logs and continues rather than aborting the run).
    fn checkpoint(&self, thread_id: &str, state: &ExecutionState) {
        if let Err(err) = self.adapters.checkpoint.save(thread_id, state) {
            tracing::warn!(thread_id, error = %err, "checkpoint write failed, continuing best-effort");
        }
    }

    /// Write-into-skill algorithm (spec §4.5): serialize `verdict` under
    /// `## Success Cases` or `## Failure Cases` with a UTC minute-precision
    /// timestamp.
    fn record_verdict(
        &self,
        skill_path: &Path,
        skill_text: &str,
        verdict: &Verdict,
    ) -> Result<String, OrchestratorError> {
        let heading = if verdict.is_pass() {
            SUCCESS_CASES_HEADING
        } else {
            FAILURE_CASES_HEADING
        };
        let updated = skill_log::append_entry(skill_text, heading, &verdict.feedback, self.adapters.clock.now());
        self.adapters.skill_file.write(skill_path, &updated)?;
        Ok(updated)
    }
}
