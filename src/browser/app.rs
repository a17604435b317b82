//! Browser TUI Application
//!
//! The application struct and event loop for the `browse` command.

use crate::action::{menu_entries, ActionKind, ActionRequest};
use crate::commands::Session;
use crate::controller::{Dispatch, LocalEffect, RowActionController};
use crate::error::{GitspaceError, Result};
use crate::gitspace::GitspaceRecord;
use crate::launcher::{Launcher, SystemLauncher};
use crate::notice::Notice;
use crate::refresh::{refresh_list, RefreshHandle, RefreshSignal};
use crate::route::{Navigator, Route};
use crate::status::StatusCategory;
use crate::view::{format_relative_time, render_rows, GitspaceRow};
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;

/// Notices kept for the footer; older ones are dropped.
const MAX_NOTICES: usize = 5;

/// Get a color for a status category
fn category_color(category: StatusCategory) -> Color {
    match category {
        StatusCategory::Affirmative => Color::Green,
        StatusCategory::Alert => Color::Red,
        StatusCategory::Neutral => Color::DarkGray,
        StatusCategory::Default => Color::Reset,
    }
}

/// The main browser application state.
pub struct BrowserApp {
    /// Last fetched list, in server order
    records: Vec<GitspaceRecord>,
    controller: RowActionController,
    /// Shared with the controller; set whenever a mutation succeeds
    refresh: RefreshSignal,
    launcher: Box<dyn Launcher>,
    console_url: String,
    /// Selected index for list navigation
    selected_index: usize,
    /// Route of the detail panel, set by row clicks and edit
    detail: Option<Route>,
    /// Most recent notices, newest last
    notices: Vec<Notice>,
    last_refreshed: Option<DateTime<Utc>>,
    /// Whether the app should quit
    should_quit: bool,
}

impl BrowserApp {
    /// Create the app. `refresh` must be the handle the controller was built with.
    pub fn new(
        controller: RowActionController,
        refresh: RefreshSignal,
        launcher: Box<dyn Launcher>,
        console_url: impl Into<String>,
    ) -> Self {
        Self {
            records: Vec::new(),
            controller,
            refresh,
            launcher,
            console_url: console_url.into(),
            selected_index: 0,
            detail: None,
            notices: Vec::new(),
            last_refreshed: None,
            should_quit: false,
        }
    }

    /// Re-fetch the list. A failure keeps the previous rows and adds a notice.
    pub fn reload(&mut self) {
        match refresh_list(self.controller.api().as_ref()) {
            Ok(records) => {
                self.records = records;
                self.selected_index = self
                    .selected_index
                    .min(self.records.len().saturating_sub(1));
                self.last_refreshed = Some(Utc::now());
            }
            Err(notice) => self.push_notice(notice),
        }
    }

    /// Apply finished calls, collect their notices and reload if any asked for it.
    pub fn tick(&mut self) {
        for completion in self.controller.poll() {
            tracing::debug!(
                id = completion.mutation.id(),
                ok = completion.succeeded(),
                "mutation settled"
            );
        }
        for notice in self.controller.take_notices() {
            self.push_notice(notice);
        }
        if self.refresh.take() {
            self.reload();
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.detail.is_some() {
            match key {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('Q') => {
                    self.detail = None;
                }
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let max_index = self.records.len().saturating_sub(1);
                if self.selected_index < max_index {
                    self.selected_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(record) = self.selected().cloned() {
                    match self.controller.click_row(&record) {
                        Some(route) => self.navigate(&route),
                        None => {
                            for notice in self.controller.take_notices() {
                                self.push_notice(notice);
                            }
                        }
                    }
                }
            }
            KeyCode::Char('s') => self.run_action(ActionKind::StartStop),
            KeyCode::Char('d') => self.run_action(ActionKind::Delete),
            KeyCode::Char('e') => self.run_action(ActionKind::Edit),
            KeyCode::Char('o') => self.run_action(ActionKind::Open),
            KeyCode::Char('r') => self.refresh.request_refresh(),
            _ => {}
        }
    }

    fn run_action(&mut self, kind: ActionKind) {
        let Some(record) = self.selected().cloned() else {
            return;
        };
        if !menu_entries(&record).contains(&kind) {
            self.push_notice(Notice::info("No IDE is configured for this gitspace"));
            return;
        }

        match self.controller.dispatch(&ActionRequest::new(kind, record)) {
            Dispatch::Started(mutation) => {
                tracing::info!(action = %mutation.describe(), "mutation started");
            }
            Dispatch::Ignored => {}
            Dispatch::Immediate(effect) => self.perform(effect),
        }
    }

    fn perform(&mut self, effect: LocalEffect) {
        match effect {
            LocalEffect::Navigate(route) => self.navigate(&route),
            LocalEffect::OpenExternal(uri) => {
                if let Err(e) = self.launcher.open(&uri) {
                    self.push_notice(Notice::error(e.to_string()));
                }
            }
            LocalEffect::Noop => {}
        }
    }

    fn push_notice(&mut self, notice: Notice) {
        if notice.is_error() {
            tracing::warn!(message = %notice.message, "notice");
        }
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }

    fn selected(&self) -> Option<&GitspaceRecord> {
        self.records.get(self.selected_index)
    }

    pub fn records(&self) -> &[GitspaceRecord] {
        &self.records
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn detail(&self) -> Option<&Route> {
        self.detail.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn controller(&self) -> &RowActionController {
        &self.controller
    }

    /// Check if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Render the UI to the terminal.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Table
                Constraint::Length(1), // Notice
                Constraint::Length(1), // Key help
            ])
            .split(frame.area());

        let rows = render_rows(&self.records, self.controller.phases(), Utc::now());

        self.render_header(frame, chunks[0]);
        self.render_table(frame, chunks[1], &rows);
        self.render_notice(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);

        if let Some(route) = &self.detail {
            let row = rows.iter().find(|r| r.id == route.gitspace_id());
            let area = centered_rect(70, 50, frame.area());
            self.render_detail(frame, area, route, row);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let pending = self.controller.phases().pending_count();
        let refreshed = self
            .last_refreshed
            .map(|ts| format!("refreshed {}", format_relative_time(ts, Utc::now())))
            .unwrap_or_else(|| "not loaded".to_string());

        let mut spans = vec![
            Span::styled(
                format!("{} gitspaces", self.records.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(refreshed, Style::default().fg(Color::DarkGray)),
        ];
        if pending > 0 {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} in progress", pending),
                Style::default().fg(Color::Yellow),
            ));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" gitspaces "),
        );
        frame.render_widget(header, area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, rows: &[GitspaceRow]) {
        let header = Row::new(vec![
            Cell::from(""),
            Cell::from("Gitspace"),
            Cell::from("Repository & Branch"),
            Cell::from("Last Active"),
            Cell::from("Usage"),
            Cell::from("Action"),
        ])
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let body: Vec<Row> = rows
            .iter()
            .map(|row| {
                let action_style = if row.pending {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(Span::styled(
                        "●",
                        Style::default().fg(category_color(row.status.category)),
                    )),
                    Cell::from(row.name.clone()),
                    Cell::from(row.repository.clone()),
                    Cell::from(row.last_active.clone()),
                    Cell::from(row.usage.clone()),
                    Cell::from(Span::styled(row.action_label, action_style)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(2),
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Length(22),
            Constraint::Length(15),
        ];

        let table = Table::new(body, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !rows.is_empty() {
            state.select(Some(self.selected_index));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_notice(&self, frame: &mut Frame, area: Rect) {
        let Some(notice) = self.notices.last() else {
            return;
        };
        let color = if notice.is_error() {
            Color::Red
        } else {
            Color::Blue
        };
        let line = Paragraph::new(format!(" {}", notice.message)).style(Style::default().fg(color));
        frame.render_widget(line, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let help_text = if self.detail.is_some() {
            " Enter/Esc: close detail "
        } else {
            " ↑↓: navigate | Enter: details | s: start/stop | d: delete | e: edit | o: open | r: refresh | q: quit "
        };
        let footer = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(footer, area);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, route: &Route, row: Option<&GitspaceRow>) {
        let title = match route {
            Route::GitspaceDetail { .. } => " Gitspace ",
            Route::GitspaceEdit { .. } => " Edit Gitspace ",
        };
        let label = Style::default().fg(Color::Blue);

        let mut lines = Vec::new();
        if let Some(row) = row {
            lines.push(Line::from(vec![
                Span::styled(row.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(row.id.clone(), Style::default().fg(Color::DarkGray)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Status:      ", label),
                Span::styled(
                    row.status.label,
                    Style::default().fg(category_color(row.status.category)),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Repository:  ", label),
                Span::raw(row.repository.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Changes:     ", label),
                Span::raw(row.tracked_changes.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Usage:       ", label),
                Span::raw(row.usage.clone()),
            ]));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(vec![
            Span::styled("Console:     ", label),
            Span::styled(
                route.console_url(&self.console_url),
                Style::default().fg(Color::Cyan),
            ),
        ]));

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(Clear, area);
        frame.render_widget(panel, area);
    }
}

impl Navigator for BrowserApp {
    fn navigate(&mut self, route: &Route) {
        tracing::debug!(%route, "navigate");
        self.detail = Some(route.clone());
    }
}

/// Create a centered rectangle of given percentage width/height
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Initialize the terminal for TUI mode.
pub fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
        .map_err(|e| GitspaceError::Terminal(format!("failed to initialize terminal: {}", e)))
}

/// Restore the terminal to normal mode.
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the browser TUI application.
///
/// Initializes the terminal, runs the event loop, and restores the terminal
/// on exit. Calls still in flight when the user quits are abandoned.
pub fn run_browser(session: Session) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let refresh = RefreshSignal::new();
    let controller = RowActionController::new(
        session.api.clone(),
        Box::new(refresh.clone()),
        Duration::from_secs(session.config.request_timeout_secs),
    );
    let mut app = BrowserApp::new(
        controller,
        refresh,
        Box::new(SystemLauncher::new()?),
        session.config.console_url.clone(),
    );
    app.reload();

    let mut terminal = init_terminal()?;
    let poll_duration = Duration::from_millis(session.config.poll_interval_ms.max(1));

    let outcome = event_loop(&mut terminal, &mut app, poll_duration);
    restore_terminal(&mut terminal)?;
    outcome
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut BrowserApp,
    poll_duration: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(poll_duration)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release or repeat)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }

        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, StartStopIntent};
    use crate::gitspace::{GitspaceState, IdeKind};
    use crate::test_utils::FakeGitspaceApi;
    use ratatui::backend::TestBackend;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingLauncher {
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, uri: &str) -> Result<()> {
            self.opened.lock().unwrap().push(uri.to_string());
            Ok(())
        }
    }

    fn records() -> Vec<GitspaceRecord> {
        vec![
            GitspaceRecord::new("gs1")
                .with_name("api")
                .with_space_path("acct/org/proj")
                .with_state(GitspaceState::Running)
                .with_ide(IdeKind::VsCode),
            GitspaceRecord::new("gs2")
                .with_name("web")
                .with_space_path("acct/org/proj")
                .with_state(GitspaceState::Stopped),
        ]
    }

    fn app_with(api: Arc<FakeGitspaceApi>) -> (BrowserApp, RecordingLauncher) {
        let refresh = RefreshSignal::new();
        let controller = RowActionController::new(
            api,
            Box::new(refresh.clone()),
            Duration::from_secs(5),
        );
        let launcher = RecordingLauncher::default();
        let mut app = BrowserApp::new(
            controller,
            refresh,
            Box::new(launcher.clone()),
            "https://console.test/ng",
        );
        app.reload();
        (app, launcher)
    }

    fn fake() -> Arc<FakeGitspaceApi> {
        let api = Arc::new(FakeGitspaceApi::new());
        api.set_records(records());
        api
    }

    fn settle(app: &mut BrowserApp) {
        let start = std::time::Instant::now();
        while app.controller().has_pending() && start.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(5));
            app.tick();
        }
        app.tick();
    }

    #[test]
    fn test_reload_loads_records() {
        let api = fake();
        let (app, _) = app_with(api.clone());
        assert_eq!(app.records().len(), 2);
        assert_eq!(api.list_calls(), 1);
    }

    #[test]
    fn test_handle_quit() {
        let (mut app, _) = app_with(fake());
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let (mut app, _) = app_with(fake());
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected_index(), 0);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected_index(), 1);
    }

    #[test]
    fn test_enter_opens_detail_and_esc_closes() {
        let (mut app, _) = app_with(fake());
        app.handle_key(KeyCode::Enter);
        assert_eq!(
            app.detail(),
            Some(&Route::GitspaceDetail {
                space: "acct/org/proj".to_string(),
                gitspace_id: "gs1".to_string(),
            })
        );
        // Navigation keys are ignored while the panel is open
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected_index(), 0);
        app.handle_key(KeyCode::Esc);
        assert!(app.detail().is_none());
    }

    #[test]
    fn test_enter_without_space_path_shows_error_notice() {
        let api = Arc::new(FakeGitspaceApi::new());
        api.set_records(vec![GitspaceRecord::new("gs1")]);
        let (mut app, _) = app_with(api);

        app.handle_key(KeyCode::Enter);
        assert!(app.detail().is_none());
        let notice = app.notices().last().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "Wrong identifier for gitspace");
    }

    #[test]
    fn test_start_stop_refreshes_once_settled() {
        let api = fake();
        let (mut app, _) = app_with(api.clone());

        app.handle_key(KeyCode::Char('s'));
        settle(&mut app);

        assert_eq!(
            api.action_calls(),
            vec![("gs1".to_string(), StartStopIntent::Stop)]
        );
        assert_eq!(api.list_calls(), 2);
        assert!(app.notices().is_empty());
    }

    #[test]
    fn test_repeat_press_while_pending_is_ignored() {
        let api = fake();
        api.hold();
        let (mut app, _) = app_with(api.clone());

        app.handle_key(KeyCode::Char('s'));
        app.handle_key(KeyCode::Char('s'));
        app.handle_key(KeyCode::Char('d'));
        assert!(app.controller().phase("gs1").is_pending());

        api.release();
        settle(&mut app);
        assert_eq!(api.action_calls().len(), 1);
        assert!(api.delete_calls().is_empty());
    }

    #[test]
    fn test_failed_delete_surfaces_notice_without_refresh() {
        let api = fake();
        api.fail_deletes(ApiError::Http {
            status: 403,
            message: "Forbidden".to_string(),
        });
        let (mut app, _) = app_with(api.clone());

        app.handle_key(KeyCode::Char('d'));
        settle(&mut app);

        assert_eq!(api.list_calls(), 1);
        let notice = app.notices().last().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "Forbidden");
    }

    #[test]
    fn test_edit_opens_edit_route() {
        let (mut app, _) = app_with(fake());
        app.handle_key(KeyCode::Char('e'));
        assert!(matches!(app.detail(), Some(Route::GitspaceEdit { .. })));
    }

    #[test]
    fn test_open_uses_launcher() {
        let (mut app, launcher) = app_with(fake());
        app.handle_key(KeyCode::Char('o'));
        assert_eq!(
            launcher.opened.lock().unwrap().as_slice(),
            ["vscode://harness-inc.gitspaces/proj/gs1".to_string()]
        );
    }

    #[test]
    fn test_open_without_ide_adds_notice() {
        let (mut app, launcher) = app_with(fake());
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('o'));
        assert!(launcher.opened.lock().unwrap().is_empty());
        assert!(!app.notices().last().unwrap().is_error());
    }

    #[test]
    fn test_refresh_key_reloads_on_tick() {
        let api = fake();
        let (mut app, _) = app_with(api.clone());
        app.handle_key(KeyCode::Char('r'));
        app.handle_key(KeyCode::Char('r'));
        app.tick();
        assert_eq!(api.list_calls(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_rows() {
        let api = fake();
        let (mut app, _) = app_with(api.clone());
        api.fail_list(ApiError::Network("connection refused".to_string()));
        app.reload();
        assert_eq!(app.records().len(), 2);
        assert!(app.notices().last().unwrap().is_error());
    }

    #[test]
    fn test_notices_are_capped() {
        let (mut app, _) = app_with(fake());
        for i in 0..(MAX_NOTICES + 3) {
            app.push_notice(Notice::info(format!("n{}", i)));
        }
        assert_eq!(app.notices().len(), MAX_NOTICES);
        assert_eq!(app.notices().last().unwrap().message, format!("n{}", MAX_NOTICES + 2));
    }

    #[test]
    fn test_render_draws_rows() {
        let api = fake();
        api.hold();
        let (mut app, _) = app_with(api.clone());
        app.handle_key(KeyCode::Char('s'));

        let mut terminal = Terminal::new(TestBackend::new(140, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(text.contains("gitspaces"));
        assert!(text.contains("api"));
        assert!(text.contains("Start Gitspace"));
        assert!(text.contains("..."));

        api.release();
        settle(&mut app);
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let result = centered_rect(70, 50, area);

        assert!(result.x > 0);
        assert!(result.y > 0);
        assert!(result.width < area.width);
        assert!(result.height < area.height);
    }
}
