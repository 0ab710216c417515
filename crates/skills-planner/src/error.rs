#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    #[error("skill file is empty")]
    EmptySkill,

    #[error("plan schema violation: {0}")]
    PlanInvalid(String),

    #[error("planner model transport error: {0}")]
    Transport(String),
}
