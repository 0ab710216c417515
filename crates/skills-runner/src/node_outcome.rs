//! The closed `NodeOutcome` enum classifying an Optimizer response (spec
//! §9's redesign note generalizes the teacher's `Executor` data-enum
//! pattern): replaces ad hoc string-sniffing with an exhaustively-matched
//! variant.

use skills_core::ToolCall;

#[derive(Debug, Clone)]
pub enum NodeOutcome {
    /// The Optimizer issued one or more structured tool calls; route to TOOL.
    ToolCalls(Vec<ToolCall>),
    /// The Optimizer's response began with the reserved completion marker.
    Completion,
    /// The Optimizer's response carried no marker — a concession to
    /// imperfect generators (spec §4.4); still routes to EVALUATE, logged
    /// as an implicit completion.
    ImplicitCompletion,
}

/// A single outcome of a full step attempt, returned to the Orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Commit,
    Escalate,
}
