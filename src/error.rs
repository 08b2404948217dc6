use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("data encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database lock poisoned")]
    LockPoisoned,
}
