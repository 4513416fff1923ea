//! Library error type shared by the engine, persistence and CLI.
//! Engine mutations themselves never fail; this covers the boundary
//! where external data enters the system.

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Malformed form data: {0}")]
    FormData(#[from] serde_json::Error),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
