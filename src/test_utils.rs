//! Test utilities shared across modules.
//!
//! [`FakeGitspaceApi`] is a scripted, call-recording stand-in for the remote
//! service. Calls can be held open with [`FakeGitspaceApi::hold`] to observe
//! rows while their mutation is in flight.

use crate::api::{ApiError, GitspaceApi, StartStopIntent};
use crate::gitspace::GitspaceRecord;
use crate::refresh::RefreshHandle;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Default)]
struct Script {
    records: Vec<GitspaceRecord>,
    list_error: Option<ApiError>,
    action_error: Option<ApiError>,
    delete_error: Option<ApiError>,
    list_calls: usize,
    action_calls: Vec<(String, StartStopIntent)>,
    delete_calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeGitspaceApi {
    script: Mutex<Script>,
    held: Mutex<bool>,
    released: Condvar,
}

impl FakeGitspaceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_records(&self, records: Vec<GitspaceRecord>) {
        self.script.lock().unwrap().records = records;
    }

    pub fn fail_list(&self, error: ApiError) {
        self.script.lock().unwrap().list_error = Some(error);
    }

    pub fn fail_actions(&self, error: ApiError) {
        self.script.lock().unwrap().action_error = Some(error);
    }

    pub fn fail_deletes(&self, error: ApiError) {
        self.script.lock().unwrap().delete_error = Some(error);
    }

    /// Make mutations block until [`release`](Self::release) is called.
    /// Calls are recorded before they block.
    pub fn hold(&self) {
        *self.held.lock().unwrap() = true;
    }

    pub fn release(&self) {
        *self.held.lock().unwrap() = false;
        self.released.notify_all();
    }

    pub fn list_calls(&self) -> usize {
        self.script.lock().unwrap().list_calls
    }

    pub fn action_calls(&self) -> Vec<(String, StartStopIntent)> {
        self.script.lock().unwrap().action_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.script.lock().unwrap().delete_calls.clone()
    }

    fn wait_until_released(&self) {
        let mut held = self.held.lock().unwrap();
        while *held {
            held = self.released.wait(held).unwrap();
        }
    }
}

impl GitspaceApi for FakeGitspaceApi {
    fn list_gitspaces(&self) -> Result<Vec<GitspaceRecord>, ApiError> {
        let mut script = self.script.lock().unwrap();
        script.list_calls += 1;
        match &script.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(script.records.clone()),
        }
    }

    fn gitspace_action(&self, id: &str, intent: StartStopIntent) -> Result<(), ApiError> {
        let outcome = {
            let mut script = self.script.lock().unwrap();
            script.action_calls.push((id.to_string(), intent));
            script.action_error.clone()
        };
        self.wait_until_released();
        outcome.map_or(Ok(()), Err)
    }

    fn delete_gitspace(&self, id: &str) -> Result<(), ApiError> {
        let outcome = {
            let mut script = self.script.lock().unwrap();
            script.delete_calls.push(id.to_string());
            script.delete_error.clone()
        };
        self.wait_until_released();
        outcome.map_or(Ok(()), Err)
    }
}

/// Refresh handle that counts requests instead of coalescing them.
#[derive(Debug, Clone, Default)]
pub struct CountingRefresh {
    count: Arc<AtomicUsize>,
}

impl CountingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl RefreshHandle for CountingRefresh {
    fn request_refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fake_records_calls() {
        let api = FakeGitspaceApi::new();
        api.gitspace_action("gs1", StartStopIntent::Start).unwrap();
        api.delete_gitspace("gs2").unwrap();

        assert_eq!(
            api.action_calls(),
            vec![("gs1".to_string(), StartStopIntent::Start)]
        );
        assert_eq!(api.delete_calls(), vec!["gs2".to_string()]);
    }

    #[test]
    fn test_fake_scripted_failure() {
        let api = FakeGitspaceApi::new();
        api.fail_actions(ApiError::Timeout(Duration::from_secs(1)));
        assert_eq!(
            api.gitspace_action("gs1", StartStopIntent::Stop),
            Err(ApiError::Timeout(Duration::from_secs(1)))
        );
    }

    #[test]
    fn test_counting_refresh_counts_every_request() {
        let refresh = CountingRefresh::new();
        refresh.request_refresh();
        refresh.clone().request_refresh();
        assert_eq!(refresh.count(), 2);
    }
}
