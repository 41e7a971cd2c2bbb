use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("incorrect login id or password")]
    InvalidCredentials,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("invalid cursor direction: {0}")]
    InvalidCursorDirection(String),

    #[error("invalid page size: {0}")]
    InvalidPageSize(i64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("token signing failed: {0}")]
    TokenSigning(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
