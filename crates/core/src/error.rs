use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Division by zero is not allowed")]
    DivisionByZero,

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Arithmetic underflow: {0} is too small to represent")]
    Underflow(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Index out of range: {index} (history has {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Errors raised by an operation's own computation. These are the only
    /// errors that cross the dispatcher boundary to the caller.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::DivisionByZero | Error::Overflow(_) | Error::Underflow(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
