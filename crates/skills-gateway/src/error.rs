#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("parameter '{slot}' value does not match the declared pattern")]
    ParamSchemaViolation { slot: String },

    #[error("assembled command matched a blocked pattern: {pattern}")]
    BlockedPatternMatch { pattern: String },

    #[error("command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("command exited with code {exit_code}")]
    NonZeroExit { exit_code: i32, output: String },

    #[error("script path '{0}' escapes the approved script directories")]
    PathEscape(String),

    #[error("script '{0}' does not have the required suffix")]
    SuffixForbidden(String),

    #[error("argument '{0}' rejected by the restricted argument alphabet")]
    ArgRejected(String),

    #[error("environment entry '{0}' rejected by the restricted alphabet")]
    EnvRejected(String),

    #[error("script '{0}' does not exist")]
    ScriptMissing(String),
}

impl GatewayError {
    /// Tag this error the way the gateway's failure semantics require:
    /// every failure is returned as a prefixed string, never an exception,
    /// so the generation model can read and react to it inline.
    pub fn to_tagged_string(&self) -> String {
        match self {
            GatewayError::UnknownTool(_)
            | GatewayError::ParamSchemaViolation { .. }
            | GatewayError::BlockedPatternMatch { .. }
            | GatewayError::PathEscape(_)
            | GatewayError::SuffixForbidden(_)
            | GatewayError::ArgRejected(_)
            | GatewayError::EnvRejected(_) => format!("[SECURITY BLOCKED] {self}"),
            GatewayError::Timeout { .. }
            | GatewayError::NonZeroExit { .. }
            | GatewayError::ScriptMissing(_) => format!("[ERROR] {self}"),
        }
    }
}
