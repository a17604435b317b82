//! Show command handler.
//!
//! The command-line counterpart of clicking a row: prints the gitspace's
//! details and its console link.

use super::{find_gitspace, Session};
use crate::controller::RowPhases;
use crate::error::Result;
use crate::output::print_gitspace_detail;
use crate::route::row_click;
use crate::view::render_rows;
use chrono::Utc;

/// Show details for one gitspace.
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(GitspaceError::InvalidNavigationTarget)` if the record lacks a space path or id
pub fn show_command(id: &str) -> Result<()> {
    let session = Session::connect()?;
    let records = session.fetch_records()?;
    let record = find_gitspace(&records, id)?;

    let rows = render_rows(std::slice::from_ref(&record), &RowPhases::default(), Utc::now());
    let route = row_click(&record);
    print_gitspace_detail(&rows[0], route.as_ref().ok(), &session.config.console_url);
    route.map(|_| ())
}
