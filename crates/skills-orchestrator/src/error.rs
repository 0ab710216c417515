#[derive(thiserror::Error, Debug)]
pub enum OrchestratorError {
    #[error("skill file at {0} is empty")]
    EmptySkillFile(String),

    #[error("plan rejected by the planner: {0}")]
    PlanInvalid(#[from] skills_planner::PlannerError),

    #[error("step runner error: {0}")]
    Runner(#[from] skills_runner::RunnerError),

    #[error("skill file adapter error: {0}")]
    SkillFile(#[from] skills_adapters::AdapterError),

    #[error("execution state error: {0}")]
    State(#[from] skills_core::CoreError),

    #[error(transparent)]
    Checkpoint(#[from] anyhow::Error),
}
