//! CLI command handlers for gitspaces.
//!
//! # Commands
//!
//! - [`list`] - Print the gitspace table
//! - [`show`] - Details for one gitspace (row click)
//! - [`action`] - Start/stop, delete, edit and open from the row menu
//! - [`browse`] - Interactive terminal table
//! - [`config`] - Show or change configuration

mod action;
mod browse;
mod config;
mod list;
mod show;

pub use action::action_command;
pub use browse::browse_command;
pub use config::{config_display_command, config_set_command};
pub use list::list_command;
pub use show::show_command;

use crate::api::{GitspaceApi, HttpGitspaceClient};
use crate::config::{load_config, validate_config, Config};
use crate::error::{GitspaceError, Result};
use crate::gitspace::GitspaceRecord;
use crate::output::{CYAN, RESET};
use crate::route::{Navigator, Route};
use std::sync::Arc;

/// Validated configuration plus a client for it.
pub struct Session {
    pub config: Config,
    pub api: Arc<dyn GitspaceApi>,
}

impl Session {
    /// Load and validate the configuration and build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or incomplete.
    pub fn connect() -> Result<Self> {
        let config = load_config()?;
        validate_config(&config).map_err(|e| GitspaceError::Config(e.to_string()))?;
        let api: Arc<dyn GitspaceApi> = Arc::new(HttpGitspaceClient::from_config(&config)?);
        Ok(Self { config, api })
    }

    pub fn fetch_records(&self) -> Result<Vec<GitspaceRecord>> {
        Ok(self.api.list_gitspaces()?)
    }
}

/// Find a gitspace by id in a fetched list.
pub fn find_gitspace(records: &[GitspaceRecord], id: &str) -> Result<GitspaceRecord> {
    records
        .iter()
        .find(|record| record.id.as_deref() == Some(id))
        .cloned()
        .ok_or_else(|| GitspaceError::GitspaceNotFound(id.to_string()))
}

/// Navigator for the plain CLI: prints the console link for the route.
pub struct ConsoleNavigator {
    console_url: String,
}

impl ConsoleNavigator {
    pub fn new(console_url: impl Into<String>) -> Self {
        Self {
            console_url: console_url.into(),
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, route: &Route) {
        println!("{CYAN}{}{RESET}", route.console_url(&self.console_url));
    }
}
