use std::io;
use std::path::Path;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use crate::config::UiConfig;
use crate::core::{AppState, ApplyOutcome, Column};
use super::input::PathInput;

/// Which part of the screen receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    OpenPrompt,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Error,
    Info,
}

/// A blocking message that must be dismissed before anything else happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub kind: PopupKind,
    pub title: String,
    pub message: String,
}

pub struct TuiApp {
    pub state: AppState,
    pub config: UiConfig,
    pub table_state: TableState,
    pub focused_filter: usize,
    pub mode: InputMode,
    pub path_input: PathInput,
    pub popup: Option<Popup>,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(state: AppState, config: UiConfig) -> Self {
        let mut table_state = TableState::default();
        if state.visible_len() > 0 {
            table_state.select(Some(0));
        }

        Self {
            state,
            config,
            table_state,
            focused_filter: 0,
            mode: InputMode::Normal,
            path_input: PathInput::default(),
            popup: None,
            should_quit: false,
        }
    }

    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let tick_rate = self.config.tick_rate();

        loop {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.popup = None;
            }
            return;
        }

        match self.mode {
            InputMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = InputMode::Normal;
                }
            }
            InputMode::OpenPrompt => self.handle_prompt_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.path_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                if let Some(path) = self.path_input.take_path() {
                    self.open_file(&path);
                }
            }
            KeyCode::Backspace => self.path_input.backspace(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.path_input.clear();
            }
            KeyCode::Char(ch) => self.path_input.push(ch),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let page = self.config.page_scroll;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.mode = InputMode::Help,
            KeyCode::Char('o') => {
                self.path_input.clear();
                self.mode = InputMode::OpenPrompt;
            }
            KeyCode::Tab => {
                self.focused_filter = (self.focused_filter + 1) % Column::FILTERABLE.len();
            }
            KeyCode::BackTab => {
                let len = Column::FILTERABLE.len();
                self.focused_filter = (self.focused_filter + len - 1) % len;
            }
            KeyCode::Left | KeyCode::Char('h') => self.cycle_focused(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_focused(true),
            KeyCode::Enter | KeyCode::Char('a') => self.apply_filters(),
            KeyCode::Char('r') => {
                self.state.reset_filters();
                self.select_first_row();
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-(page as isize)),
            KeyCode::PageDown => self.scroll_by(page as isize),
            KeyCode::Home | KeyCode::Char('g') => self.select_first_row(),
            KeyCode::End | KeyCode::Char('G') => {
                let last = self.state.visible_len().checked_sub(1);
                self.table_state.select(last);
            }
            _ => {}
        }
    }

    /// Load a file and report failures in an error popup.
    pub fn open_file(&mut self, path: &Path) {
        match self.state.load_file(path) {
            Ok(_) => {
                self.focused_filter = 0;
                self.select_first_row();
            }
            Err(err) => {
                self.popup = Some(Popup {
                    kind: PopupKind::Error,
                    title: "Error".to_string(),
                    message: format!("Failed to process file: {}", err),
                });
            }
        }
    }

    pub fn apply_filters(&mut self) {
        match self.state.apply_filters() {
            ApplyOutcome::Matched(_) => self.select_first_row(),
            ApplyOutcome::NoMatch => {
                self.popup = Some(Popup {
                    kind: PopupKind::Info,
                    title: "No Data".to_string(),
                    message: "No rows match the selected filters.".to_string(),
                });
            }
        }
    }

    fn focused_column(&self) -> Column {
        Column::FILTERABLE[self.focused_filter % Column::FILTERABLE.len()]
    }

    fn cycle_focused(&mut self, forward: bool) {
        let column = self.focused_column();
        self.state.cycle_selection(column, forward);
    }

    fn select_first_row(&mut self) {
        let first = if self.state.visible_len() > 0 { Some(0) } else { None };
        self.table_state.select(first);
    }

    fn scroll_by(&mut self, delta: isize) {
        let len = self.state.visible_len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table_state.select(Some(next as usize));
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Filters
                Constraint::Min(5),    // Table
                Constraint::Length(4), // Status bar
            ])
            .split(f.area());

        self.render_title(f, chunks[0]);
        self.render_filters(f, chunks[1]);
        self.render_table(f, chunks[2]);
        self.render_status(f, chunks[3]);

        match self.mode {
            InputMode::Help => self.render_help(f),
            InputMode::OpenPrompt => self.render_prompt(f),
            InputMode::Normal => {}
        }

        if let Some(popup) = &self.popup {
            self.render_popup(f, popup);
        }
    }

    fn render_title(&self, f: &mut Frame, area: Rect) {
        let source = match self.state.source() {
            Some(source) => Span::styled(
                source.path.display().to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(
                "No file loaded - press o to open a JSON event log",
                Style::default().fg(Color::Gray),
            ),
        };

        let title = Paragraph::new(Line::from(vec![
            Span::styled("📂 ", Style::default().fg(Color::Cyan)),
            source,
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(80, 80, 80)))
                .title(" TaskTrak - JSON Viewer ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );

        f.render_widget(title, area);
    }

    fn render_filters(&self, f: &mut Frame, area: Rect) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, Column::FILTERABLE.len() as u32); 7])
            .split(area);

        for (i, column) in Column::FILTERABLE.iter().enumerate() {
            let selection = self.state.selection().get(*column);
            let focused = i == self.focused_filter;

            let border = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Rgb(80, 80, 80))
            };
            let value = if selection.is_all() {
                Style::default().fg(Color::Rgb(150, 150, 150))
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };

            let text = if focused {
                format!("◀ {} ▶", selection)
            } else {
                selection.to_string()
            };

            let selector = Paragraph::new(Span::styled(text, value))
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(format!(" {} ", column.header())),
                );

            f.render_widget(selector, cells[i]);
        }
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let header = Row::new(Column::ALL.iter().map(|column| Cell::from(column.header())))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .height(1);

        let alternating = self.config.alternating_rows;
        let rows: Vec<Row> = self
            .state
            .visible_rows()
            .enumerate()
            .map(|(i, row)| {
                let style = if alternating && i % 2 == 1 {
                    Style::default().fg(Color::Rgb(180, 180, 180)).bg(Color::Rgb(20, 20, 25))
                } else {
                    Style::default().fg(Color::Rgb(220, 220, 220))
                };
                Row::new(row.values().iter().map(|value| Cell::from(value.as_str()))).style(style)
            })
            .collect();

        let table = Table::new(rows, [Constraint::Fill(1); 14])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Rgb(80, 80, 80)))
                    .title(format!(
                        " 📊 Events ({} of {}) ",
                        self.state.visible_len(),
                        self.state.total_len()
                    ))
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .highlight_style(Style::default().bg(Color::Rgb(0, 50, 100)).add_modifier(Modifier::BOLD));

        f.render_stateful_widget(table, area, &mut self.table_state);

        let visible_height = area.height.saturating_sub(3) as usize;
        let len = self.state.visible_len();
        if len > visible_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            let position = self.table_state.selected().unwrap_or(0).min(len.saturating_sub(1));
            let mut scrollbar_state = ScrollbarState::new(len).position(position);
            f.render_stateful_widget(
                scrollbar,
                area.inner(ratatui::layout::Margin { vertical: 1, horizontal: 1 }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let key = |label: &'static str, bg: Color| {
            Span::styled(label, Style::default().fg(Color::White).bg(bg).add_modifier(Modifier::BOLD))
        };
        let hint = |text: &'static str| Span::styled(text, Style::default().fg(Color::Rgb(150, 150, 150)));

        let loaded = match self.state.source() {
            Some(source) => format!(" | Loaded at {}", source.loaded_at.format("%H:%M:%S")),
            None => String::new(),
        };

        let status_text = vec![
            Line::from(vec![
                key(" o ", Color::Blue),
                hint(" open, "),
                key(" Tab ", Color::Magenta),
                hint(" filter, "),
                key(" ←→ ", Color::Magenta),
                hint(" value, "),
                key(" Enter ", Color::Green),
                hint(" apply, "),
                key(" r ", Color::Yellow),
                hint(" reset, "),
                key(" ? ", Color::Green),
                hint(" help, "),
                key(" q ", Color::Red),
                hint(" quit"),
            ]),
            Line::from(vec![
                hint("Rows: "),
                Span::styled(
                    format!("{} / {}", self.state.visible_len(), self.state.total_len()),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                hint(" | Filters: "),
                Span::styled(
                    self.state.selection().constraints().count().to_string(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::styled(loaded, Style::default().fg(Color::Rgb(150, 150, 150))),
            ]),
        ];

        let status = Paragraph::new(status_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Rgb(80, 80, 80)))
                    .title(" ℹ️  Status ")
                    .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Center);

        f.render_widget(status, area);
    }

    fn render_prompt(&self, f: &mut Frame) {
        let area = self.centered_rect(60, 20, f.area());

        let lines = vec![
            Line::from(Span::styled("Path to a JSON event log:", Style::default().fg(Color::Gray))),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(self.path_input.value(), Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to open, Esc to cancel, Ctrl-U to clear",
                Style::default().fg(Color::Rgb(120, 120, 120)),
            )),
        ];

        let prompt = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Select JSON File ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(Clear, area);
        f.render_widget(prompt, area);
    }

    fn render_popup(&self, f: &mut Frame, popup: &Popup) {
        let area = self.centered_rect(60, 25, f.area());
        let color = match popup.kind {
            PopupKind::Error => Color::Red,
            PopupKind::Info => Color::Blue,
        };

        let lines = vec![
            Line::from(popup.message.as_str()),
            Line::from(""),
            Line::from(Span::styled("Press Enter to dismiss", Style::default().fg(Color::Rgb(120, 120, 120)))),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", popup.title))
                    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let popup_area = self.centered_rect(80, 70, f.area());

        let entry = |keys: &'static str, color: Color, text: &'static str| {
            Line::from(vec![
                Span::styled(keys, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(text, Style::default()),
            ])
        };

        let help_text = vec![
            Line::from(vec![
                Span::styled("TaskTrak - Event Log Viewer", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            ]),
            Line::from(""),
            Line::from("Keyboard Shortcuts:"),
            Line::from(""),
            entry("  q, Esc       ", Color::Red, "- Quit the application"),
            entry("  ?, F1        ", Color::Green, "- Show/hide this help"),
            entry("  o            ", Color::Blue, "- Open a JSON event log"),
            entry("  Tab, S-Tab   ", Color::Magenta, "- Focus next/previous filter"),
            entry("  ←, →, h, l   ", Color::Magenta, "- Change the focused filter value"),
            entry("  Enter, a     ", Color::Green, "- Apply filters"),
            entry("  r            ", Color::Yellow, "- Reset all filters to All"),
            entry("  ↑, ↓, k, j   ", Color::Blue, "- Move through rows"),
            entry("  PgUp, PgDn   ", Color::Blue, "- Move a page at a time"),
            entry("  Home/g, End/G", Color::Blue, "- Jump to first/last row"),
            Line::from(""),
            Line::from("Rows:"),
            Line::from(""),
            Line::from("• Each measurement is stamped with the employee and shift clocked in at the time"),
            Line::from("• Rows recorded while nobody is clocked in have an empty User Name and Shift No"),
            Line::from("• Filters match exact values and combine with AND"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_style(Style::default().fg(Color::Cyan))
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, popup_area);
        f.render_widget(paragraph, popup_area);
    }

    fn centered_rect(&self, percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<(), io::Error> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::core::Selection;
    use ratatui::backend::TestBackend;
    use std::fs;

    fn press(app: &mut TuiApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn app_with_log(contents: &str) -> (tempfile::TempDir, TuiApp) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, contents).unwrap();

        let mut app = TuiApp::new(AppState::new(SchemaConfig::default()), UiConfig::default());
        app.open_file(&path);
        (dir, app)
    }

    fn screen(app: &mut TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|f| app.ui(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    const LOG: &str = r#"[
        {"sts": "IN", "name": "Alice", "sftno": "1"},
        {"stn": "5", "uid": "U1"},
        {"sts": "OUT"},
        {"stn": "6", "uid": "U2"}
    ]"#;

    #[test]
    fn test_open_prompt_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shift.json");
        fs::write(&path, LOG).unwrap();
        let mut app = TuiApp::new(AppState::new(SchemaConfig::default()), UiConfig::default());

        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.mode, InputMode::OpenPrompt);
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.popup.is_none());
        assert_eq!(app.state.total_len(), 2);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_load_failure_shows_error_and_keeps_rows() {
        let (dir, mut app) = app_with_log(LOG);
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "[{").unwrap();

        app.open_file(&bad);

        let popup = app.popup.clone().unwrap();
        assert_eq!(popup.kind, PopupKind::Error);
        assert!(popup.message.starts_with("Failed to process file: invalid JSON"));
        assert_eq!(app.state.total_len(), 2);

        // Popup blocks other keys until dismissed
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Enter);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_filter_keys() {
        let (_dir, mut app) = app_with_log(LOG);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.state.selection().get(Column::StationNo), &Selection::Value("5".to_string()));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.visible_len(), 1);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.state.selection().get(Column::UserId), &Selection::Value("U2".to_string()));
        press(&mut app, KeyCode::Char('a'));

        let popup = app.popup.clone().unwrap();
        assert_eq!(popup.kind, PopupKind::Info);
        assert_eq!(popup.message, "No rows match the selected filters.");
        assert_eq!(app.state.visible_len(), 1);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.state.visible_len(), 2);
        assert!(app.state.selection().is_unconstrained());
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let (_dir, mut app) = app_with_log(LOG);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.table_state.selected(), Some(0));
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.table_state.selected(), Some(1));
        press(&mut app, KeyCode::Home);
        assert_eq!(app.table_state.selected(), Some(0));
        press(&mut app, KeyCode::End);
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_help_toggle_and_quit() {
        let (_dir, mut app) = app_with_log(LOG);

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.mode, InputMode::Help);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.mode, InputMode::Normal);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_renders_headers_and_rows() {
        let (_dir, mut app) = app_with_log(LOG);
        let text = screen(&mut app);

        assert!(text.contains("TaskTrak - JSON Viewer"));
        assert!(text.contains("Station No"));
        assert!(text.contains("Alice"));
        assert!(text.contains("U2"));
    }

    #[test]
    fn test_renders_empty_state() {
        let mut app = TuiApp::new(AppState::new(SchemaConfig::default()), UiConfig::default());
        let text = screen(&mut app);
        assert!(text.contains("No file loaded"));
    }
}
