//! Row actions and the effects they resolve to.
//!
//! Resolution is pure: it decides *what* should happen for a request and
//! leaves dispatching remote calls, navigating and launching to the caller.

use crate::api::StartStopIntent;
use crate::gitspace::{GitspaceRecord, IdeKind};
use crate::route::Route;

/// Scheme and authority for gitspaces opened in desktop VS Code.
pub const VSCODE_URI_PREFIX: &str = "vscode://harness-inc.gitspaces";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Start,
    Stop,
    /// The menu's toggle entry: start or stop depending on current state.
    StartStop,
    Delete,
    Edit,
    Open,
}

impl ActionKind {
    /// Whether this action issues a remote mutation and so has a pending phase.
    pub fn is_mutation(&self) -> bool {
        match self {
            ActionKind::Start | ActionKind::Stop | ActionKind::StartStop | ActionKind::Delete => {
                true
            }
            ActionKind::Edit | ActionKind::Open => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub target: GitspaceRecord,
}

impl ActionRequest {
    pub fn new(kind: ActionKind, target: GitspaceRecord) -> Self {
        Self { kind, target }
    }
}

/// What a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartStop { id: String, intent: StartStopIntent },
    Delete { id: String },
    Navigate(Route),
    OpenExternal(String),
    /// Precondition not met; nothing to do.
    Noop,
}

/// Resolve a request to its effect.
pub fn resolve(request: &ActionRequest) -> Effect {
    let record = &request.target;
    let id = record.id_or_empty().to_string();

    match request.kind {
        ActionKind::Start if !record.is_running() => Effect::StartStop {
            id,
            intent: StartStopIntent::Start,
        },
        ActionKind::Stop if record.is_running() => Effect::StartStop {
            id,
            intent: StartStopIntent::Stop,
        },
        ActionKind::Start | ActionKind::Stop => Effect::Noop,
        ActionKind::StartStop => Effect::StartStop {
            id,
            intent: toggle_intent(record),
        },
        ActionKind::Delete => Effect::Delete { id },
        ActionKind::Edit => Effect::Navigate(Route::GitspaceEdit {
            space: record.space_path_or_empty().to_string(),
            gitspace_id: id,
        }),
        ActionKind::Open => Effect::OpenExternal(open_target(record)),
    }
}

/// Stop when running, start for every other state.
pub fn toggle_intent(record: &GitspaceRecord) -> StartStopIntent {
    if record.is_running() {
        StartStopIntent::Stop
    } else {
        StartStopIntent::Start
    }
}

/// Where "open" sends the user for this record.
pub fn open_target(record: &GitspaceRecord) -> String {
    let ide = record.ide.unwrap_or(IdeKind::Other);
    match ide {
        IdeKind::VsCode => format!(
            "{}/{}/{}",
            VSCODE_URI_PREFIX,
            record.project_identifier(),
            record.id_or_empty()
        ),
        IdeKind::VsCodeWeb | IdeKind::Other => record.url.clone().unwrap_or_default(),
    }
}

/// Entries of the row's action menu, in display order.
///
/// Open is only offered when the record names an IDE.
pub fn menu_entries(record: &GitspaceRecord) -> Vec<ActionKind> {
    let mut entries = vec![ActionKind::StartStop, ActionKind::Delete, ActionKind::Edit];
    if record.ide.is_some() {
        entries.push(ActionKind::Open);
    }
    entries
}

/// Label for the open entry.
pub fn open_label(ide: Option<IdeKind>) -> &'static str {
    match ide {
        Some(IdeKind::VsCode) => "Open in VS Code",
        Some(IdeKind::VsCodeWeb) | Some(IdeKind::Other) | None => "Open in browser",
    }
}

/// Label for the start/stop toggle.
pub fn start_stop_label(intent: StartStopIntent) -> &'static str {
    match intent {
        StartStopIntent::Start => "Start Gitspace",
        StartStopIntent::Stop => "Stop Gitspace",
    }
}
