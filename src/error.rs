use thiserror::Error;

use crate::workspace::ArtifactId;

/// Configuration errors raised while loading or validating [`crate::config::StudioConfig`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid temperature: {0}")]
    InvalidTemperature(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Refusals from the workspace store. None of these mutate the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("Cannot delete the only remaining file")]
    LastArtifact,

    #[error("File not found: {0}")]
    ArtifactNotFound(ArtifactId),

    #[error("File name must not be empty")]
    EmptyName,
}

/// Client-side refusals that prevent a request from being dispatched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No active file to analyze")]
    NoActiveArtifact,

    #[error("Lookup arguments must not be empty")]
    EmptyQuery,
}

/// Failures talking to the analysis backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Analysis service API key is missing")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis request timed out")]
    Timeout,

    #[error("Analysis service returned no content")]
    EmptyResponse,

    #[error("Malformed analysis response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Malformed(err.to_string())
    }
}

/// Unified error type for the studio engine and its HTTP surface
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Studio engine has stopped")]
    EngineStopped,
}

pub type Result<T> = std::result::Result<T, StudioError>;
