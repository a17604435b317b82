//! List command handler.
//!
//! Prints the gitspace table for the configured project.

use super::Session;
use crate::controller::RowPhases;
use crate::error::Result;
use crate::output::print_gitspace_table;
use crate::view::render_rows;
use chrono::Utc;

/// Print all gitspaces, or their raw records as JSON.
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(GitspaceError)` if the configuration is invalid or the list call fails
pub fn list_command(json: bool) -> Result<()> {
    let session = Session::connect()?;
    let records = session.fetch_records()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let rows = render_rows(&records, &RowPhases::default(), Utc::now());
    print_gitspace_table(&rows);
    Ok(())
}
