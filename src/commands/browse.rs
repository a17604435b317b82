//! Browse command handler.
//!
//! Opens the interactive gitspace table.

use super::Session;
use crate::browser::run_browser;
use crate::error::Result;

/// Connect and run the terminal view until the user quits.
///
/// # Returns
///
/// * `Ok(())` when the user quits
/// * `Err(GitspaceError)` if the config is unusable or the terminal fails
pub fn browse_command() -> Result<()> {
    let session = Session::connect()?;
    tracing::info!(base_url = %session.config.base_url, "browse started");
    run_browser(session)
}
