use thiserror::Error;

/// Failures that stop a load run before any traffic is sent.
#[derive(Debug, Error)]
pub enum LoadTestError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid target: {0}")]
    InvalidTarget(String),
}
