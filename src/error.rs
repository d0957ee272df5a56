use std::path::PathBuf;
use thiserror::Error;

/// Structural problems with the fetched schedule page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("page layout changed: no {0} found")]
    MissingMarker(&'static str),

    #[error("malformed schedule row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("invalid selector `{0}`")]
    Selector(&'static str),
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to parse schedule page: {0}")]
    Parse(#[from] ParseError),

    #[error("notification delivery to topic `{topic}` failed: {reason}")]
    Notification { topic: String, reason: String },

    #[error("cannot access snapshot file {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot file {} is not valid: {source}", .path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MonitorError {
    /// Process exit status for a run that ended with this error.
    ///
    /// `run_once` logs failed deliveries and carries on, so `Notification`
    /// only reaches here from callers outside a run and takes the generic code.
    pub fn exit_code(&self) -> u8 {
        match self {
            MonitorError::Client(_)
            | MonitorError::Network { .. }
            | MonitorError::HttpStatus { .. } => 2,
            MonitorError::Parse(_) => 3,
            MonitorError::Storage { .. } | MonitorError::CorruptState { .. } => 4,
            MonitorError::Config(_) => 5,
            MonitorError::Notification { .. } => 1,
        }
    }
}
