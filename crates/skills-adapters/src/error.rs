#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    #[error("model transport error: {0}")]
    Transport(String),

    #[error("model response did not match the requested structured schema: {0}")]
    SchemaViolation(String),

    #[error("skill file I/O error at {path}: {source}")]
    SkillFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint write failed: {0}")]
    CheckpointWrite(String),
}
