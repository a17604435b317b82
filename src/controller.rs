//! Row action controller.
//!
//! Owns the per-row pending state for the gitspace list and turns action
//! requests into remote calls. Each row moves through
//!
//! ```text
//! Idle --start/stop--> StartStopPending --settled--> Idle
//! Idle --delete------> DeletePending    --settled--> Idle
//! ```
//!
//! A mutation requested for a row that already has one in flight is ignored.
//! Calls run on worker threads and are bounded by a timeout; their results are
//! applied on the owner's thread through [`RowActionController::poll`] or
//! [`RowActionController::wait_for_completion`]. Failures end here as notices
//! and never propagate to the caller.

use crate::action::{resolve, ActionRequest, Effect};
use crate::api::{extract_error_message, ApiError, GitspaceApi, StartStopIntent};
use crate::gitspace::GitspaceRecord;
use crate::notice::Notice;
use crate::refresh::RefreshHandle;
use crate::route::{row_click, Route};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPhase {
    #[default]
    Idle,
    StartStopPending,
    DeletePending,
}

impl RowPhase {
    pub fn is_pending(&self) -> bool {
        !matches!(self, RowPhase::Idle)
    }
}

/// Pending phases keyed by record id. Rows not present are idle.
#[derive(Debug, Clone, Default)]
pub struct RowPhases {
    phases: HashMap<String, RowPhase>,
}

impl RowPhases {
    pub fn phase(&self, id: &str) -> RowPhase {
        self.phases.get(id).copied().unwrap_or_default()
    }

    pub fn pending_count(&self) -> usize {
        self.phases.len()
    }

    fn begin(&mut self, id: &str, phase: RowPhase) {
        self.phases.insert(id.to_string(), phase);
    }

    fn settle(&mut self, id: &str) {
        self.phases.remove(id);
    }
}

/// A remote mutation for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    StartStop { id: String, intent: StartStopIntent },
    Delete { id: String },
}

impl Mutation {
    pub fn id(&self) -> &str {
        match self {
            Mutation::StartStop { id, .. } | Mutation::Delete { id } => id,
        }
    }

    fn pending_phase(&self) -> RowPhase {
        match self {
            Mutation::StartStop { .. } => RowPhase::StartStopPending,
            Mutation::Delete { .. } => RowPhase::DeletePending,
        }
    }

    fn invoke(&self, api: &dyn GitspaceApi) -> Result<(), ApiError> {
        match self {
            Mutation::StartStop { id, intent } => api.gitspace_action(id, *intent),
            Mutation::Delete { id } => api.delete_gitspace(id),
        }
    }

    /// Lowercase verb for the call, e.g. `stop`.
    pub fn describe(&self) -> &'static str {
        match self {
            Mutation::StartStop {
                intent: StartStopIntent::Start,
                ..
            } => "start",
            Mutation::StartStop {
                intent: StartStopIntent::Stop,
                ..
            } => "stop",
            Mutation::Delete { .. } => "delete",
        }
    }
}

/// An effect the caller carries out itself. Mutations never take this form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEffect {
    Navigate(Route),
    OpenExternal(String),
    /// Precondition not met; nothing to do.
    Noop,
}

/// Outcome of [`RowActionController::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The mutation is in flight; the row is pending.
    Started(Mutation),
    /// The row already has a mutation in flight. Nothing was sent.
    Ignored,
    /// A non-mutating effect for the caller to carry out.
    Immediate(LocalEffect),
}

/// A settled mutation, as applied by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub mutation: Mutation,
    pub result: Result<(), ApiError>,
}

impl Completion {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct RowActionController {
    api: Arc<dyn GitspaceApi>,
    refresh: Box<dyn RefreshHandle>,
    timeout: Duration,
    phases: RowPhases,
    notices: Vec<Notice>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
}

impl RowActionController {
    pub fn new(
        api: Arc<dyn GitspaceApi>,
        refresh: Box<dyn RefreshHandle>,
        timeout: Duration,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel();
        Self {
            api,
            refresh,
            timeout,
            phases: RowPhases::default(),
            notices: Vec::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn api(&self) -> &Arc<dyn GitspaceApi> {
        &self.api
    }

    pub fn phases(&self) -> &RowPhases {
        &self.phases
    }

    pub fn phase(&self, id: &str) -> RowPhase {
        self.phases.phase(id)
    }

    pub fn has_pending(&self) -> bool {
        self.phases.pending_count() > 0
    }

    /// Resolve and act on a request.
    pub fn dispatch(&mut self, request: &ActionRequest) -> Dispatch {
        let mutation = match resolve(request) {
            Effect::StartStop { id, intent } => Mutation::StartStop { id, intent },
            Effect::Delete { id } => Mutation::Delete { id },
            Effect::Navigate(route) => return Dispatch::Immediate(LocalEffect::Navigate(route)),
            Effect::OpenExternal(uri) => {
                return Dispatch::Immediate(LocalEffect::OpenExternal(uri))
            }
            Effect::Noop => return Dispatch::Immediate(LocalEffect::Noop),
        };

        if self.phases.phase(mutation.id()).is_pending() {
            tracing::debug!(
                gitspace = mutation.id(),
                action = mutation.describe(),
                "row busy, ignoring request"
            );
            return Dispatch::Ignored;
        }

        tracing::debug!(
            gitspace = mutation.id(),
            action = mutation.describe(),
            "dispatching"
        );
        self.phases.begin(mutation.id(), mutation.pending_phase());
        self.spawn(mutation.clone());
        Dispatch::Started(mutation)
    }

    /// Resolve a click on the row body, surfacing a notice when it has no valid target.
    pub fn click_row(&mut self, record: &GitspaceRecord) -> Option<Route> {
        match row_click(record) {
            Ok(route) => Some(route),
            Err(e) => {
                self.notices.push(Notice::error(e.to_string()));
                None
            }
        }
    }

    /// Apply every completion that has arrived, without blocking.
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut applied = Vec::new();
        loop {
            match self.completions_rx.try_recv() {
                Ok(completion) => {
                    self.apply(&completion);
                    applied.push(completion);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Block until one completion arrives (or `limit` elapses) and apply it.
    pub fn wait_for_completion(&mut self, limit: Duration) -> Option<Completion> {
        let completion = self.completions_rx.recv_timeout(limit).ok()?;
        self.apply(&completion);
        Some(completion)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply(&mut self, completion: &Completion) {
        let mutation = &completion.mutation;
        self.phases.settle(mutation.id());

        match &completion.result {
            Ok(()) => {
                tracing::debug!(
                    gitspace = mutation.id(),
                    action = mutation.describe(),
                    "settled, requesting refresh"
                );
                self.refresh.request_refresh();
            }
            Err(e) => {
                tracing::warn!(
                    gitspace = mutation.id(),
                    action = mutation.describe(),
                    error = %e,
                    "gitspace action failed"
                );
                self.notices.push(Notice::error(extract_error_message(e)));
            }
        }
    }

    /// Run `mutation` on a worker thread, reporting back within the timeout.
    ///
    /// A call that outlives the timeout keeps running detached; its late result
    /// is dropped.
    fn spawn(&self, mutation: Mutation) {
        let api = Arc::clone(&self.api);
        let completions = self.completions_tx.clone();
        let timeout = self.timeout;

        thread::spawn(move || {
            let (call_tx, call_rx) = mpsc::channel();
            let call = mutation.clone();
            thread::spawn(move || {
                let _ = call_tx.send(call.invoke(api.as_ref()));
            });

            let result = match call_rx.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => Err(ApiError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => Err(ApiError::Disconnected),
            };

            let _ = completions.send(Completion { mutation, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::gitspace::{GitspaceState, IdeKind};
    use crate::test_utils::{CountingRefresh, FakeGitspaceApi};

    const WAIT: Duration = Duration::from_secs(5);

    fn controller_with(api: &Arc<FakeGitspaceApi>, refresh: &CountingRefresh) -> RowActionController {
        RowActionController::new(api.clone(), Box::new(refresh.clone()), WAIT)
    }

    fn running(id: &str) -> GitspaceRecord {
        GitspaceRecord::new(id)
            .with_space_path("acct/proj")
            .with_state(GitspaceState::Running)
    }

    fn stopped(id: &str) -> GitspaceRecord {
        GitspaceRecord::new(id)
            .with_space_path("acct/proj")
            .with_state(GitspaceState::Stopped)
    }

    #[test]
    fn test_start_stop_marks_row_pending() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.hold();
        let mut controller = controller_with(&api, &refresh);

        let dispatch = controller.dispatch(&ActionRequest::new(ActionKind::StartStop, running("gs1")));
        assert_eq!(
            dispatch,
            Dispatch::Started(Mutation::StartStop {
                id: "gs1".to_string(),
                intent: StartStopIntent::Stop
            })
        );
        assert_eq!(controller.phase("gs1"), RowPhase::StartStopPending);
        assert_eq!(controller.phase("gs2"), RowPhase::Idle);

        api.release();
        let completion = controller.wait_for_completion(WAIT).unwrap();
        assert!(completion.succeeded());
        assert_eq!(controller.phase("gs1"), RowPhase::Idle);
    }

    #[test]
    fn test_second_start_stop_while_pending_is_ignored() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.hold();
        let mut controller = controller_with(&api, &refresh);
        let request = ActionRequest::new(ActionKind::StartStop, stopped("gs1"));

        assert!(matches!(controller.dispatch(&request), Dispatch::Started(_)));
        assert_eq!(controller.dispatch(&request), Dispatch::Ignored);
        assert!(controller.take_notices().is_empty());

        api.release();
        controller.wait_for_completion(WAIT).unwrap();
        assert!(controller.wait_for_completion(Duration::from_millis(200)).is_none());
        assert_eq!(api.action_calls().len(), 1);
        assert_eq!(refresh.count(), 1);
    }

    #[test]
    fn test_second_delete_while_pending_is_ignored() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.hold();
        let mut controller = controller_with(&api, &refresh);
        let request = ActionRequest::new(ActionKind::Delete, stopped("gs1"));

        assert!(matches!(controller.dispatch(&request), Dispatch::Started(_)));
        assert_eq!(controller.phase("gs1"), RowPhase::DeletePending);
        assert_eq!(controller.dispatch(&request), Dispatch::Ignored);

        api.release();
        controller.wait_for_completion(WAIT).unwrap();
        assert_eq!(api.delete_calls(), vec!["gs1".to_string()]);
    }

    #[test]
    fn test_start_stop_while_delete_pending_is_ignored() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.hold();
        let mut controller = controller_with(&api, &refresh);

        controller.dispatch(&ActionRequest::new(ActionKind::Delete, stopped("gs1")));
        assert_eq!(
            controller.dispatch(&ActionRequest::new(ActionKind::StartStop, stopped("gs1"))),
            Dispatch::Ignored
        );

        api.release();
        controller.wait_for_completion(WAIT).unwrap();
        assert!(api.action_calls().is_empty());
    }

    #[test]
    fn test_different_rows_are_independent() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.hold();
        let mut controller = controller_with(&api, &refresh);

        controller.dispatch(&ActionRequest::new(ActionKind::StartStop, stopped("gs1")));
        let second = controller.dispatch(&ActionRequest::new(ActionKind::Delete, stopped("gs2")));
        assert!(matches!(second, Dispatch::Started(Mutation::Delete { .. })));
        assert_eq!(controller.phases().pending_count(), 2);

        api.release();
        controller.wait_for_completion(WAIT).unwrap();
        controller.wait_for_completion(WAIT).unwrap();
        assert!(!controller.has_pending());
        assert_eq!(refresh.count(), 2);
    }

    #[test]
    fn test_success_requests_exactly_one_refresh() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);

        controller.dispatch(&ActionRequest::new(ActionKind::Delete, stopped("gs1")));
        let completion = controller.wait_for_completion(WAIT).unwrap();

        assert!(completion.succeeded());
        assert_eq!(refresh.count(), 1);
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn test_failure_surfaces_one_error_and_no_refresh() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.fail_actions(ApiError::Http {
            status: 409,
            message: "Gitspace is busy".to_string(),
        });
        let mut controller = controller_with(&api, &refresh);

        controller.dispatch(&ActionRequest::new(ActionKind::StartStop, running("gs1")));
        let completion = controller.wait_for_completion(WAIT).unwrap();

        assert!(!completion.succeeded());
        assert_eq!(refresh.count(), 0);
        assert_eq!(controller.phase("gs1"), RowPhase::Idle);
        let notices = controller.take_notices();
        assert_eq!(notices, vec![Notice::error("Gitspace is busy")]);
    }

    #[test]
    fn test_failed_delete_leaves_row_interactive() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.fail_deletes(ApiError::Network("connection reset".to_string()));
        let mut controller = controller_with(&api, &refresh);
        let request = ActionRequest::new(ActionKind::Delete, stopped("gs1"));

        controller.dispatch(&request);
        controller.wait_for_completion(WAIT).unwrap();
        assert_eq!(controller.take_notices().len(), 1);

        assert!(matches!(controller.dispatch(&request), Dispatch::Started(_)));
        controller.wait_for_completion(WAIT).unwrap();
        assert_eq!(api.delete_calls().len(), 2);
    }

    #[test]
    fn test_timeout_is_reported_as_failure() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        api.hold();
        let mut controller =
            RowActionController::new(api.clone(), Box::new(refresh.clone()), Duration::from_millis(50));

        controller.dispatch(&ActionRequest::new(ActionKind::StartStop, stopped("gs1")));
        let completion = controller.wait_for_completion(WAIT).unwrap();

        assert_eq!(
            completion.result,
            Err(ApiError::Timeout(Duration::from_millis(50)))
        );
        assert_eq!(controller.phase("gs1"), RowPhase::Idle);
        assert_eq!(refresh.count(), 0);
        assert_eq!(
            controller.take_notices(),
            vec![Notice::error("Request timed out after 50 ms")]
        );
        api.release();
    }

    #[test]
    fn test_delete_without_id_sends_empty_identifier() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);

        let dispatch = controller.dispatch(&ActionRequest::new(ActionKind::Delete, GitspaceRecord::default()));
        assert_eq!(
            dispatch,
            Dispatch::Started(Mutation::Delete { id: String::new() })
        );
        controller.wait_for_completion(WAIT).unwrap();
        assert_eq!(api.delete_calls(), vec![String::new()]);
    }

    #[test]
    fn test_edit_and_open_are_immediate() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);
        let record = running("gs1").with_ide(IdeKind::VsCode);

        let edit = controller.dispatch(&ActionRequest::new(ActionKind::Edit, record.clone()));
        assert!(matches!(edit, Dispatch::Immediate(LocalEffect::Navigate(_))));

        let open = controller.dispatch(&ActionRequest::new(ActionKind::Open, record));
        assert_eq!(
            open,
            Dispatch::Immediate(LocalEffect::OpenExternal(
                "vscode://harness-inc.gitspaces/proj/gs1".to_string()
            ))
        );
        assert!(!controller.has_pending());
        assert!(api.action_calls().is_empty());
    }

    #[test]
    fn test_stale_start_on_running_row_is_noop() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);

        let dispatch = controller.dispatch(&ActionRequest::new(ActionKind::Start, running("gs1")));
        assert_eq!(dispatch, Dispatch::Immediate(LocalEffect::Noop));
        assert!(!controller.has_pending());
    }

    #[test]
    fn test_click_row_with_identifiers_navigates() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);

        let route = controller.click_row(&GitspaceRecord::new("gs1").with_space_path("proj/a"));
        assert_eq!(
            route,
            Some(Route::GitspaceDetail {
                space: "proj/a".to_string(),
                gitspace_id: "gs1".to_string()
            })
        );
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn test_click_row_without_identifiers_surfaces_notice() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);

        assert_eq!(controller.click_row(&GitspaceRecord::new("gs1")), None);
        assert_eq!(
            controller.take_notices(),
            vec![Notice::error("Wrong identifier for gitspace")]
        );
    }

    #[test]
    fn test_poll_without_completions_is_empty() {
        let api = Arc::new(FakeGitspaceApi::new());
        let refresh = CountingRefresh::new();
        let mut controller = controller_with(&api, &refresh);
        assert!(controller.poll().is_empty());
    }
}
