use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("invalid splitter config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file is empty or unreadable: {0}")]
    EmptyDocument(String),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
