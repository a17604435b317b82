use crate::api::ApiError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitspaceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Wrong identifier for gitspace")]
    InvalidNavigationTarget,

    #[error("Gitspace not found: {0}")]
    GitspaceNotFound(String),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    ActionFailed(String),

    #[error("Failed to open {uri}: {reason}")]
    Launch { uri: String, reason: String },

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitspaceError>;
