use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("persistence: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, Error>;
