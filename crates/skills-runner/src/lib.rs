//! The Step Runner (spec §4.4, component C4): drives a single step through
//! PREPARE, the OPTIMIZE/TOOL cycle, and EVALUATE, returning control to the
//! Orchestrator on COMMIT or ESCALATE.

pub mod anchor;
pub mod error;
pub mod evaluate;
pub mod node_outcome;
pub mod optimizer;
pub mod schema;
pub mod step_runner;
pub mod tool_catalog;
pub mod tool_exec;

pub use error::RunnerError;
pub use evaluate::{evaluate, EvaluatorConfig};
pub use node_outcome::{NodeOutcome, StepOutcome};
pub use step_runner::{run_step, StepRunnerConfig};
pub use tool_catalog::{build_cli_tool_specs, script_tool_spec};
pub use tool_exec::run_tool_request;
