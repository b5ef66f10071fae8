use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Job handle must not be empty")]
    EmptyJobHandle,

    #[error("API error: {0}")]
    Api(String),
}

/// Terminal failure reasons for a monitored conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("Session lost: the server no longer tracks this download")]
    SessionLost,

    #[error("Timed out waiting for the conversion to finish")]
    TimedOut,

    #[error("{0}")]
    Job(String),
}
