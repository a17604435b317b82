pub mod action;
pub mod api;
pub mod browser;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod gitspace;
pub mod launcher;
pub mod notice;
pub mod output;
pub mod refresh;
pub mod route;
pub mod status;
pub mod view;

#[cfg(test)]
pub mod test_utils;

pub use action::{resolve, ActionKind, ActionRequest, Effect};
pub use api::{GitspaceApi, HttpGitspaceClient, StartStopIntent};
pub use controller::{Dispatch, LocalEffect, RowActionController, RowPhase};
pub use error::{GitspaceError, Result};
pub use gitspace::{GitspaceRecord, GitspaceState, IdeKind};
pub use route::{row_click, Navigator, Route};
pub use status::{classify, StatusCategory, StatusDisplay};
