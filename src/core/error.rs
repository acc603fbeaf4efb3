use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Scoring requires at least one entry")]
    EmptyInput,

    #[error("No skill points available")]
    NoPointsAvailable,

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Answer must be between 1 and 5, got {0}")]
    InvalidAnswer(u8),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EngineError {
    /// True for errors the caller should show as a notice rather than abort on
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Io(_) | EngineError::Serde(_) | EngineError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
