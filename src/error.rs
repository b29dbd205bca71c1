use thiserror::Error;

/// Errors raised by the demodulation core.
///
/// Out-of-range numbers in a [`PipelineConfig`](crate::config::PipelineConfig)
/// are corrected by the guard rules first; only values that stay invalid
/// after correction end up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DemodError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

pub type Result<T> = std::result::Result<T, DemodError>;

impl DemodError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DemodError::InvalidConfiguration(msg.into())
    }
}
