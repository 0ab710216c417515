//! Core data model for the skill execution engine: the `Step`/`Plan`/`Verdict`
//! triad, the `ExecutionState` working tuple, the message transcript kinds,
//! and the `StateDelta`/`RouteDecision` tagged enums nodes use to describe
//! their effects without mutating shared state directly.

pub mod delta;
pub mod error;
pub mod model;
pub mod paths;

pub use delta::{CounterField, RouteDecision, StateDelta};
pub use error::CoreError;
pub use model::{
    EvalResult, ExecutionState, Message, Plan, Step, ToolCall, ToolRequest, Verdict,
    ANCHOR_EVERY_N_TOOL_CALLS, COMPLETION_MARKER, EVALUATOR_MAX_TOOL_ROUNDS, STUCK_THRESHOLD,
};
pub use paths::normalize_path_separators;
