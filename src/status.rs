//! Maps a gitspace's lifecycle state to how its row is displayed.

use crate::api::StartStopIntent;
use crate::gitspace::GitspaceState;

/// Color family for a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// Instance confirmed running.
    Affirmative,
    /// Instance stopped or failed.
    Alert,
    /// State reported but not known.
    Neutral,
    /// No state at all.
    Default,
}

/// Display contract for a single row's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub category: StatusCategory,
    /// Hex color of the status dot.
    pub color: &'static str,
    pub label: &'static str,
    /// The start/stop toggle the action menu offers for this state.
    pub toggle: StartStopIntent,
}

impl StatusDisplay {
    pub fn offers_stop(&self) -> bool {
        self.toggle == StartStopIntent::Stop
    }
}

const RUNNING: StatusDisplay = StatusDisplay {
    category: StatusCategory::Affirmative,
    color: "#00FF00",
    label: "Running",
    toggle: StartStopIntent::Stop,
};

const STOPPED: StatusDisplay = StatusDisplay {
    category: StatusCategory::Alert,
    color: "#FF0000",
    label: "Stopped",
    toggle: StartStopIntent::Start,
};

const ERROR: StatusDisplay = StatusDisplay {
    category: StatusCategory::Alert,
    color: "#FF0000",
    label: "Error",
    toggle: StartStopIntent::Start,
};

const UNKNOWN: StatusDisplay = StatusDisplay {
    category: StatusCategory::Neutral,
    color: "#808080",
    label: "Unknown",
    toggle: StartStopIntent::Start,
};

const MISSING: StatusDisplay = StatusDisplay {
    category: StatusCategory::Default,
    color: "#000000",
    label: "N/A",
    toggle: StartStopIntent::Start,
};

/// Classify a state. Total over its domain, including an absent state.
pub fn classify(state: Option<GitspaceState>) -> StatusDisplay {
    match state {
        Some(GitspaceState::Running) => RUNNING,
        Some(GitspaceState::Stopped) => STOPPED,
        Some(GitspaceState::Error) => ERROR,
        Some(GitspaceState::Unknown) => UNKNOWN,
        None => MISSING,
    }
}

/// Classify a raw wire value; unrecognized strings display as unknown.
pub fn classify_raw(value: &str) -> StatusDisplay {
    classify(Some(GitspaceState::from_wire(value)))
}
