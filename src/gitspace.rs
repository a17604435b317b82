//! Gitspace records as returned by the list API.
//!
//! The wire payload nests identifying fields under `config`; [`GitspaceRecord`]
//! flattens it into the shape the row logic works with and serializes back to
//! the same nesting. State and IDE values are matched case-insensitively;
//! anything unrecognized, including non-string values, decodes to a fallback
//! variant instead of failing the whole list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lifecycle state of a gitspace instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GitspaceState {
    Running,
    Stopped,
    Error,
    Unknown,
}

impl GitspaceState {
    /// Parse a raw wire value. Anything unrecognized is `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => GitspaceState::Running,
            "stopped" => GitspaceState::Stopped,
            "error" => GitspaceState::Error,
            _ => GitspaceState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GitspaceState::Running => "running",
            GitspaceState::Stopped => "stopped",
            GitspaceState::Error => "error",
            GitspaceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GitspaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for GitspaceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(GitspaceState::from_wire)
            .unwrap_or(GitspaceState::Unknown))
    }
}

/// Development client used to connect to a gitspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeKind {
    /// Desktop VS Code, launched through a custom URI scheme.
    VsCode,
    /// VS Code served in the browser from the gitspace URL.
    VsCodeWeb,
    /// An IDE this client does not know about; opened through its URL.
    Other,
}

impl IdeKind {
    /// Parse a raw wire value. Anything unrecognized is `Other`.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "vs_code" | "vscode" => IdeKind::VsCode,
            "vs_code_web" | "vscodeweb" | "vscode_web" => IdeKind::VsCodeWeb,
            _ => IdeKind::Other,
        }
    }

    pub fn is_desktop_linked(&self) -> bool {
        match self {
            IdeKind::VsCode => true,
            IdeKind::VsCodeWeb | IdeKind::Other => false,
        }
    }
}

impl<'de> Deserialize<'de> for IdeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(IdeKind::from_wire).unwrap_or(IdeKind::Other))
    }
}

/// A gitspace row. Read-only to the row logic; replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GitspaceResponse", into = "GitspaceResponse")]
pub struct GitspaceRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub branch: Option<String>,
    pub space_path: Option<String>,
    pub repo_url: Option<String>,
    pub state: Option<GitspaceState>,
    pub ide: Option<IdeKind>,
    pub last_used: Option<DateTime<Utc>>,
    pub resource_usage: Option<String>,
    pub total_time_used: Option<u64>,
    pub tracked_changes: Option<String>,
    pub url: Option<String>,
}

impl GitspaceRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_space_path(mut self, space_path: impl Into<String>) -> Self {
        self.space_path = Some(space_path.into());
        self
    }

    pub fn with_state(mut self, state: GitspaceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_ide(mut self, ide: IdeKind) -> Self {
        self.ide = Some(ide);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_last_used(mut self, last_used: DateTime<Utc>) -> Self {
        self.last_used = Some(last_used);
        self
    }

    /// Identifier or the empty string. Remote calls are still issued with it.
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn space_path_or_empty(&self) -> &str {
        self.space_path.as_deref().unwrap_or("")
    }

    /// Last `/`-separated segment of the space path, or `""`.
    pub fn project_identifier(&self) -> &str {
        self.space_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or("")
    }

    pub fn is_running(&self) -> bool {
        self.state == Some(GitspaceState::Running)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GitspaceConfigPayload {
    #[serde(default, alias = "identifier", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    space_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code_repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ide: Option<IdeKind>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GitspaceResponse {
    #[serde(default)]
    config: Option<GitspaceConfigPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<GitspaceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_used: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_time_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracked_changes: Option<String>,
}

impl From<GitspaceResponse> for GitspaceRecord {
    fn from(response: GitspaceResponse) -> Self {
        let config = response.config.unwrap_or_default();
        Self {
            id: config.id,
            name: config.name,
            branch: config.branch,
            space_path: config.space_path,
            repo_url: config.code_repo_url,
            state: response.state,
            ide: config.ide,
            last_used: response
                .last_used
                .filter(|ms| *ms > 0)
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            resource_usage: response.resource_usage,
            total_time_used: response.total_time_used,
            tracked_changes: response.tracked_changes,
            url: response.url,
        }
    }
}

impl From<GitspaceRecord> for GitspaceResponse {
    fn from(record: GitspaceRecord) -> Self {
        Self {
            config: Some(GitspaceConfigPayload {
                id: record.id,
                name: record.name,
                branch: record.branch,
                space_path: record.space_path,
                code_repo_url: record.repo_url,
                ide: record.ide,
            }),
            state: record.state,
            url: record.url,
            last_used: record.last_used.map(|ts| ts.timestamp_millis()),
            resource_usage: record.resource_usage,
            total_time_used: record.total_time_used,
            tracked_changes: record.tracked_changes,
        }
    }
}
