#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    #[error("no step is currently in progress")]
    NoCurrentStep,

    #[error("optimizer returned a structured response where a chat message was expected")]
    UnexpectedStructuredResponse,

    #[error("model transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Core(#[from] skills_core::CoreError),
}

impl From<skills_adapters::AdapterError> for RunnerError {
    /// Model-endpoint errors are transient (spec §7): the caller retries
    /// within the step budget, so this conversion never discards the
    /// underlying message.
    fn from(err: skills_adapters::AdapterError) -> Self {
        RunnerError::Transport(err.to_string())
    }
}
