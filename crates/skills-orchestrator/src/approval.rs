//! The operator approval gate (spec §4.5): block on plan approval before
//! any step executes, offer a decision at ESCALATE, and prompt for
//! free-text feedback after the final step. Reads/writes stdio directly
//! (spec SPEC_FULL.md §4.5 expansion) rather than pulling in a TUI crate,
//! following the Python original's plain `input()` prompts.

use std::io::{self, BufRead, Write};

use skills_core::{Plan, Step, Verdict};

/// What the operator chooses once a step exhausts its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    /// Reset the retry budget and let the Step Runner re-enter PREPARE.
    Retry,
    /// Force-advance past the step without a COMMIT (spec §8 scenario 5).
    Skip,
    /// Terminate the run without completing the plan.
    Abort,
}

pub trait OperatorGate: Send + Sync {
    /// Present `plan` to the operator and return whether they approve it.
    /// A non-approval terminates the run cleanly (spec §6: exit code 0).
    fn approve_plan(&self, plan: &Plan) -> bool;

    /// Present the escalating step and its last verdict, and return the
    /// operator's decision.
    fn resolve_escalation(&self, step: &Step, verdict: &Verdict) -> EscalationDecision;

    /// Prompt for optional free-text feedback after the final step.
    /// `None` means the operator gave no feedback.
    fn request_feedback(&self) -> Option<String>;
}

/// Reads operator decisions from stdin, writes prompts to stdout —
/// the production [`OperatorGate`] for the CLI binary.
pub struct StdioOperatorGate;

impl StdioOperatorGate {
    fn read_line(prompt: &str) -> String {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        line.trim().to_string()
    }
}

impl OperatorGate for StdioOperatorGate {
    fn approve_plan(&self, plan: &Plan) -> bool {
        println!("Goal: {}", plan.goal);
        println!("Plan ({} step(s)):", plan.len());
        for step in &plan.steps {
            let kind = if step.is_tool_bound() {
                format!("tool-bound [{}]", step.tools_hint.join(", "))
            } else {
                "pure-reasoning".to_string()
            };
            println!("  {}. {} ({kind})", step.index, step.optimizer_instruction);
            println!("     verify: {}", step.evaluator_instruction);
        }
        let answer = Self::read_line("Approve this plan? [y/N] ");
        matches!(answer.to_lowercase().as_str(), "y" | "yes")
    }

    fn resolve_escalation(&self, step: &Step, verdict: &Verdict) -> EscalationDecision {
        println!(
            "Step {} exhausted its retry budget. Last feedback: {}",
            step.index, verdict.feedback
        );
        loop {
            let answer = Self::read_line("[r]etry / [s]kip / [a]bort? ");
            match answer.to_lowercase().as_str() {
                "r" | "retry" => return EscalationDecision::Retry,
                "s" | "skip" => return EscalationDecision::Skip,
                "a" | "abort" => return EscalationDecision::Abort,
                _ => println!("please answer r, s, or a"),
            }
        }
    }

    fn request_feedback(&self) -> Option<String> {
        let feedback = Self::read_line("Any feedback for this skill's history? (blank to skip) ");
        if feedback.is_empty() {
            None
        } else {
            Some(feedback)
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// A scripted [`OperatorGate`] for orchestrator tests: returns
    /// pre-programmed decisions instead of touching stdio.
    pub struct ScriptedOperatorGate {
        pub approve: bool,
        pub escalations: Mutex<Vec<EscalationDecision>>,
        pub feedback: Option<String>,
    }

    impl ScriptedOperatorGate {
        pub fn new(approve: bool, escalations: Vec<EscalationDecision>, feedback: Option<String>) -> Self {
            // Reverse once so `pop()` replays in the order given.
            let mut reversed = escalations;
            reversed.reverse();
            Self {
                approve,
                escalations: Mutex::new(reversed),
                feedback,
            }
        }
    }

    impl OperatorGate for ScriptedOperatorGate {
        fn approve_plan(&self, _plan: &Plan) -> bool {
            self.approve
        }

        fn resolve_escalation(&self, _step: &Step, _verdict: &Verdict) -> EscalationDecision {
            self.escalations
                .lock()
                .expect("scripted gate mutex poisoned")
                .pop()
                .expect("ScriptedOperatorGate exhausted: test script did not account for this escalation")
        }

        fn request_feedback(&self) -> Option<String> {
            self.feedback.clone()
        }
    }
}
