//! Error types for the hadex domain

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A recognized diagnostic heading whose body matched none of the
    /// expected shapes.
    ///
    /// Well-formed interpreter output never produces this; it aborts the
    /// parse of the affected message stream instead of being swallowed.
    #[error("Malformed interpreter output: {0}")]
    MalformedOutput(String),

    /// Interpreter process failures: spawn errors, closed streams, writes
    /// to a dead session.
    #[error("Interpreter error: {0}")]
    Interpreter(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Interpreter(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedOutput("strange heading".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed interpreter output: strange heading"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        match err {
            Error::Interpreter(msg) => assert!(msg.contains("pipe closed")),
            _ => panic!("Expected Interpreter error"),
        }
    }
}
