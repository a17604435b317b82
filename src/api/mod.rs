//! Remote gitspace API.
//!
//! [`GitspaceApi`] is the seam between the row logic and the CDE service.
//! [`HttpGitspaceClient`] is the production implementation; tests use the
//! scripted fake in `test_utils`.

mod http;

pub use http::HttpGitspaceClient;

use crate::gitspace::GitspaceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Direction of a start/stop mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StartStopIntent {
    Start,
    Stop,
}

impl StartStopIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartStopIntent::Start => "START",
            StartStopIntent::Stop => "STOP",
        }
    }
}

impl fmt::Display for StartStopIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure of a remote call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to reach gitspace API: {0}")]
    Network(String),

    #[error("Failed to parse gitspace API response: {0}")]
    Decode(String),

    #[error("Request timed out after {}", format_timeout(.0))]
    Timeout(Duration),

    #[error("Request was abandoned before it completed")]
    Disconnected,
}

/// Whole seconds when the timeout is a whole number of seconds, milliseconds otherwise.
fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_millis() == 0 && timeout.as_secs() > 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{} ms", timeout.as_millis())
    }
}

/// Operations the row logic needs from the gitspace service.
pub trait GitspaceApi: Send + Sync {
    fn list_gitspaces(&self) -> Result<Vec<GitspaceRecord>, ApiError>;

    fn gitspace_action(&self, id: &str, intent: StartStopIntent) -> Result<(), ApiError>;

    fn delete_gitspace(&self, id: &str) -> Result<(), ApiError>;
}

/// Displayable message for a failed call.
///
/// Server-provided messages are shown as-is; everything else falls back to the
/// error's own description.
pub fn extract_error_message(error: &ApiError) -> String {
    match error {
        ApiError::Http { message, status } => {
            let trimmed = message.trim();
            if trimmed.is_empty() {
                format!("Request failed with status {}", status)
            } else {
                trimmed.to_string()
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&StartStopIntent::Start).unwrap(),
            "\"START\""
        );
        assert_eq!(
            serde_json::to_string(&StartStopIntent::Stop).unwrap(),
            "\"STOP\""
        );
    }

    #[test]
    fn test_extract_error_message_prefers_server_message() {
        let err = ApiError::Http {
            status: 403,
            message: "  You are not authorized  ".to_string(),
        };
        assert_eq!(extract_error_message(&err), "You are not authorized");
    }

    #[test]
    fn test_extract_error_message_empty_server_message() {
        let err = ApiError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(
            extract_error_message(&err),
            "Request failed with status 500"
        );
    }

    #[test]
    fn test_extract_error_message_timeout() {
        assert_eq!(
            extract_error_message(&ApiError::Timeout(Duration::from_secs(30))),
            "Request timed out after 30 seconds"
        );
    }

    #[test]
    fn test_sub_second_timeout_keeps_its_precision() {
        assert_eq!(
            ApiError::Timeout(Duration::from_millis(50)).to_string(),
            "Request timed out after 50 ms"
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_millis(1500)).to_string(),
            "Request timed out after 1500 ms"
        );
    }
}
