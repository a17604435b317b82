//! Display model for the gitspace table.
//!
//! [`render_rows`] turns records plus the controller's pending phases into
//! plain rows. Both the printed table and the terminal view draw from it.

use crate::action::{open_label, start_stop_label, toggle_intent};
use crate::controller::RowPhases;
use crate::gitspace::GitspaceRecord;
use crate::status::{classify, StatusDisplay};
use chrono::{DateTime, Utc};

/// Label shown in place of the action while a mutation is in flight.
pub const PENDING_LABEL: &str = "...";

const NOT_AVAILABLE: &str = "N/A";
const NO_CHANGES: &str = "No changes";

#[derive(Debug, Clone, PartialEq)]
pub struct GitspaceRow {
    pub status: StatusDisplay,
    pub name: String,
    pub id: String,
    /// `repository:branch`
    pub repository: String,
    pub tracked_changes: String,
    pub last_active: String,
    pub usage: String,
    pub action_label: &'static str,
    pub pending: bool,
    /// Present only when the record names an IDE.
    pub open_label: Option<&'static str>,
}

/// Build one display row per record, in order.
pub fn render_rows(
    records: &[GitspaceRecord],
    phases: &RowPhases,
    now: DateTime<Utc>,
) -> Vec<GitspaceRow> {
    records
        .iter()
        .map(|record| render_row(record, phases, now))
        .collect()
}

fn render_row(record: &GitspaceRecord, phases: &RowPhases, now: DateTime<Utc>) -> GitspaceRow {
    let pending = phases.phase(record.id_or_empty()).is_pending();
    let action_label = if pending {
        PENDING_LABEL
    } else {
        start_stop_label(toggle_intent(record))
    };

    GitspaceRow {
        status: classify(record.state),
        name: record.name.clone().unwrap_or_default(),
        id: record.id_or_empty().to_string(),
        repository: format!(
            "{}:{}",
            record.name.as_deref().unwrap_or_default(),
            record.branch.as_deref().unwrap_or_default()
        ),
        tracked_changes: record
            .tracked_changes
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_CHANGES.to_string()),
        last_active: record
            .last_used
            .map(|ts| format_relative_time(ts, now))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        usage: format!(
            "Used {} / {} hours",
            record
                .resource_usage
                .as_deref()
                .filter(|u| !u.is_empty())
                .unwrap_or("0"),
            record.total_time_used.unwrap_or(0)
        ),
        action_label,
        pending,
        open_label: record.ide.map(|ide| open_label(Some(ide))),
    }
}

/// Format a timestamp as a relative time string (e.g., "2h ago", "3d ago")
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_secs = now.signed_duration_since(timestamp).num_seconds().max(0) as u64;

    let minutes = total_secs / 60;
    let hours = total_secs / 3600;
    let days = total_secs / 86400;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}
