//! Error types for protocol and session operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Protocol state violations: requests outside their legal session
    /// state, unexpected message types.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON (de)serialization failures and malformed frames.
    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    /// Stream I/O failures toward the editor.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Launch aborted before any session work started (e.g. no module
    /// resolvable). The message is user-facing.
    #[error("{0}")]
    LaunchFailed(String),

    /// A run-control request arrived after the debuggee terminated.
    #[error("Debug session has ended")]
    SessionEnded,

    /// Interpreter-side failure, carried up from the session layer.
    #[error("Interpreter error: {0}")]
    Interpreter(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidMessage(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<hadex_core::Error> for Error {
    fn from(err: hadex_core::Error) -> Self {
        match err {
            hadex_core::Error::MalformedOutput(msg) => Error::Protocol(msg),
            hadex_core::Error::Interpreter(msg) => Error::Interpreter(msg),
        }
    }
}
