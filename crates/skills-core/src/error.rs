#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("step index {index} out of bounds for plan with {len} steps")]
    StepIndexOutOfBounds { index: usize, len: usize },

    #[error("plan step indices must be 0..n-1 in order, got {got:?}")]
    StepIndicesNotSequential { got: Vec<usize> },

    #[error("cannot commit: no step is currently in progress")]
    CommitWithoutPendingStep,

    #[error("a FAIL verdict must not carry key_outputs (found {count})")]
    FailVerdictWithKeyOutputs { count: usize },
}
