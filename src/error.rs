//! Error types for SimTracker
//!
//! The trajectory engine itself is infallible. These errors belong to the
//! collaborators around it: configuration loading, pose sinks, and the
//! control front-end.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SimTracker error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pose report serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Control command could not be parsed or applied
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Sink kind not recognized
    #[error("Unknown sink: {0}")]
    UnknownSink(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
