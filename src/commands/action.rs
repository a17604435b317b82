//! Row menu action handler.
//!
//! Runs a single start/stop, delete, edit or open action through the row
//! controller, waits for a mutation to settle and prints the refreshed table.

use super::{find_gitspace, ConsoleNavigator, Session};
use crate::action::{ActionKind, ActionRequest};
use crate::api::StartStopIntent;
use crate::controller::{Dispatch, LocalEffect, Mutation, RowActionController};
use crate::error::{GitspaceError, Result};
use crate::launcher::{Launcher, SystemLauncher};
use crate::output::{
    print_gitspace_table, print_notice, print_success, print_warning, ActionSpinner,
};
use crate::refresh::{refresh_list, RefreshSignal};
use crate::route::Navigator;
use crate::view::render_rows;
use chrono::Utc;
use std::time::Duration;

/// Extra wait beyond the request timeout before giving up on the worker.
const COMPLETION_GRACE: Duration = Duration::from_secs(2);

/// Run one row action against the gitspace with the given id.
///
/// # Returns
///
/// * `Ok(())` when the action succeeded or needed no remote call
/// * `Err(GitspaceError)` when the gitspace is unknown or the action failed
pub fn action_command(kind: ActionKind, id: &str) -> Result<()> {
    let session = Session::connect()?;
    let records = session.fetch_records()?;
    let record = find_gitspace(&records, id)?;

    let timeout = Duration::from_secs(session.config.request_timeout_secs);
    let refresh = RefreshSignal::new();
    let mut controller =
        RowActionController::new(session.api.clone(), Box::new(refresh.clone()), timeout);

    match controller.dispatch(&ActionRequest::new(kind, record)) {
        Dispatch::Started(mutation) => {
            let spinner = ActionSpinner::new(progress_message(&mutation));
            let completion = controller.wait_for_completion(timeout + COMPLETION_GRACE);

            match completion {
                Some(completion) if completion.succeeded() => {
                    spinner.finish_success(&done_message(&mutation));
                }
                Some(_) => {
                    spinner.finish_error(&format!(
                        "Failed to {} {}",
                        mutation.describe(),
                        mutation.id()
                    ));
                    let message = controller
                        .take_notices()
                        .into_iter()
                        .map(|notice| notice.message)
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(GitspaceError::ActionFailed(message));
                }
                None => {
                    spinner.finish_error("No response from gitspace worker");
                    return Err(GitspaceError::ActionFailed(format!(
                        "{} did not settle within {} seconds",
                        mutation.id(),
                        timeout.as_secs()
                    )));
                }
            }

            if refresh.take() {
                match refresh_list(session.api.as_ref()) {
                    Ok(records) => {
                        println!();
                        print_gitspace_table(&render_rows(&records, controller.phases(), Utc::now()));
                    }
                    Err(notice) => print_notice(&notice),
                }
            }
            Ok(())
        }
        Dispatch::Ignored => {
            print_warning("An action is already in progress for this gitspace");
            Ok(())
        }
        Dispatch::Immediate(effect) => perform(effect, &session),
    }
}

fn perform(effect: LocalEffect, session: &Session) -> Result<()> {
    match effect {
        LocalEffect::Navigate(route) => {
            ConsoleNavigator::new(session.config.console_url.clone()).navigate(&route);
            Ok(())
        }
        LocalEffect::OpenExternal(uri) => {
            SystemLauncher::new()?.open(&uri)?;
            print_success(&format!("Opened {}", uri));
            Ok(())
        }
        LocalEffect::Noop => {
            print_warning("Nothing to do: the gitspace is already in the requested state");
            Ok(())
        }
    }
}

fn progress_message(mutation: &Mutation) -> String {
    let verb = match mutation {
        Mutation::StartStop {
            intent: StartStopIntent::Start,
            ..
        } => "Starting",
        Mutation::StartStop {
            intent: StartStopIntent::Stop,
            ..
        } => "Stopping",
        Mutation::Delete { .. } => "Deleting",
    };
    format!("{} {}", verb, mutation.id())
}

fn done_message(mutation: &Mutation) -> String {
    let verb = match mutation {
        Mutation::StartStop {
            intent: StartStopIntent::Start,
            ..
        } => "Start requested for",
        Mutation::StartStop {
            intent: StartStopIntent::Stop,
            ..
        } => "Stop requested for",
        Mutation::Delete { .. } => "Deleted",
    };
    format!("{} {}", verb, mutation.id())
}
