use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Out of memory allocating {0} bytes")]
    OutOfMemory(usize),

    #[error("Buffer overflow: {needed} bytes needed, {available} available")]
    BufferOverflow { needed: usize, available: usize },

    #[error("Duplicate query id: {0}")]
    DuplicateQueryId(String),

    #[error("Backend channel unavailable")]
    BackendUnavailable,

    #[error("Backend protocol violation: {0}")]
    BackendProtocol(String),

    #[error("Answer encoding failed: {0}")]
    AnswerEncoding(String),

    #[error("Invalid trust anchor: {0}")]
    InvalidTrustAnchor(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
