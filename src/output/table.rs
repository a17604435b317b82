//! Gitspace table display.

use super::colors::*;
use crate::route::Route;
use crate::status::StatusCategory;
use crate::view::GitspaceRow;
use terminal_size::{terminal_size, Width};

const DEFAULT_TERMINAL_WIDTH: usize = 100;
const STATUS_WIDTH: usize = 2;
const LAST_ACTIVE_WIDTH: usize = 12;
const USAGE_WIDTH: usize = 22;
const ACTION_WIDTH: usize = 15;
const MIN_TEXT_WIDTH: usize = 12;

fn terminal_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

fn status_color(category: StatusCategory) -> &'static str {
    match category {
        StatusCategory::Affirmative => GREEN,
        StatusCategory::Alert => RED,
        StatusCategory::Neutral => GRAY,
        StatusCategory::Default => DIM,
    }
}

/// Print the gitspace table, sized to the terminal.
pub fn print_gitspace_table(rows: &[GitspaceRow]) {
    if rows.is_empty() {
        println!("{GRAY}No gitspaces found.{RESET}");
        return;
    }
    for line in format_table(rows, terminal_width()) {
        println!("{}", line);
    }
}

/// Lay out the table for a given width. Name and repository share whatever
/// the fixed columns leave over.
pub fn format_table(rows: &[GitspaceRow], width: usize) -> Vec<String> {
    let fixed = STATUS_WIDTH + LAST_ACTIVE_WIDTH + USAGE_WIDTH + ACTION_WIDTH + 4;
    let flexible = width.saturating_sub(fixed).max(MIN_TEXT_WIDTH * 2);
    let name_width = flexible / 2;
    let repo_width = flexible - name_width;

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "{BOLD}{:<status$}{:<name$} {:<repo$} {:<last$} {:<usage$} {}{RESET}",
        "",
        "GITSPACE",
        "REPOSITORY & BRANCH",
        "LAST ACTIVE",
        "USAGE",
        "ACTION",
        status = STATUS_WIDTH,
        name = name_width,
        repo = repo_width,
        last = LAST_ACTIVE_WIDTH,
        usage = USAGE_WIDTH,
    ));

    for row in rows {
        let name = if row.id.is_empty() {
            row.name.clone()
        } else {
            format!("{} ({})", row.name, row.id)
        };
        let action = if row.pending {
            format!("{YELLOW}{}{RESET}", row.action_label)
        } else {
            row.action_label.to_string()
        };
        lines.push(format!(
            "{}●{RESET} {:<name$} {:<repo$} {:<last$} {:<usage$} {}",
            status_color(row.status.category),
            truncate(&name, name_width),
            truncate(&row.repository, repo_width),
            truncate(&row.last_active, LAST_ACTIVE_WIDTH),
            truncate(&row.usage, USAGE_WIDTH),
            action,
            name = name_width,
            repo = repo_width,
            last = LAST_ACTIVE_WIDTH,
            usage = USAGE_WIDTH,
        ));
    }

    lines
}

/// Print everything known about one row, with a console link when it has a detail page.
pub fn print_gitspace_detail(row: &GitspaceRow, route: Option<&Route>, console_url: &str) {
    let color = status_color(row.status.category);
    println!("{BOLD}{}{RESET} {GRAY}{}{RESET}", row.name, row.id);
    println!("{BLUE}Status:{RESET}       {color}●{RESET} {}", row.status.label);
    println!("{BLUE}Repository:{RESET}   {}", row.repository);
    println!("{BLUE}Changes:{RESET}      {}", row.tracked_changes);
    println!("{BLUE}Last active:{RESET}  {}", row.last_active);
    println!("{BLUE}Usage:{RESET}        {}", row.usage);
    if let Some(label) = row.open_label {
        println!("{BLUE}Open:{RESET}         {}", label);
    }
    if let Some(route) = route {
        println!(
            "{BLUE}Console:{RESET}      {CYAN}{}{RESET}",
            route.console_url(console_url)
        );
    }
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
