//! List refresh after successful mutations.
//!
//! Requests are coalesced: however many rows finish before the owner looks,
//! the list is refetched once.

use crate::api::{extract_error_message, GitspaceApi};
use crate::gitspace::GitspaceRecord;
use crate::notice::Notice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Something that can be asked to refetch the gitspace list.
///
/// Implementations must tolerate redundant requests.
pub trait RefreshHandle {
    fn request_refresh(&self);
}

/// Flag-based refresh trigger shared between the controller and the view.
#[derive(Debug, Clone, Default)]
pub struct RefreshSignal {
    requested: Arc<AtomicBool>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending request. Returns `true` at most once per batch of requests.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl RefreshHandle for RefreshSignal {
    fn request_refresh(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

/// Refetch the list.
///
/// A failure here is reported on its own, separate from whatever mutation
/// triggered the refresh.
pub fn refresh_list(api: &dyn GitspaceApi) -> Result<Vec<GitspaceRecord>, Notice> {
    api.list_gitspaces().map_err(|e| {
        tracing::warn!(error = %e, "gitspace list refresh failed");
        Notice::error(format!(
            "Failed to refresh gitspaces: {}",
            extract_error_message(&e)
        ))
    })
}
