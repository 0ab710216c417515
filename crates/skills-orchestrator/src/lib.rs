//! The Orchestrator (spec §4.5, component C5): the outer step-router loop
//! wrapping the Step Runner's inner optimize/verify loop — plan approval,
//! step-by-step drive-to-completion, escalation handling, checkpointing,
//! and the skill-learning feedback cycle that writes outcomes back into
//! the skill file.

pub mod approval;
pub mod error;
pub mod orchestrator;
pub mod skill_log;

pub use approval::{EscalationDecision, OperatorGate, StdioOperatorGate};
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, OrchestratorOutcome};
