use super::model::ModelError;
use super::sink::SinkError;
use thiserror::Error;

/// Terminal failure of a single generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model generation failed: {0}")]
    Model(#[from] ModelError),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Failed to write audio: {0}")]
    Write(#[from] SinkError),
}

impl GenerationError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerationError::InvalidRequest(_))
    }
}
