//! Ratatui frontend implementation for the FormBackend trait.
//!
//! Provides a login screen and a section-by-section form wizard with
//! progress indicators, inline validation errors, and keyboard navigation.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dynform::{
    Banner, Control, Credentials, FormBackend, FormEngine, RenderedField, RunOutcome,
    SectionStatus, SubmissionSink, TextKind, render_section,
};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use thiserror::Error;

use crate::login::{LoginAction, LoginField, LoginState};
use crate::state::{Phase, WizardState, scroll_start};

/// Error type for the Ratatui backend.
#[derive(Debug, Error)]
pub enum RatatuiError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup/restore error.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub text: Color,
    pub highlight: Color,
    pub error: Color,
    pub success: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            secondary: Color::Blue,
            text: Color::White,
            highlight: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            border: Color::Gray,
        }
    }
}

/// Ratatui-based TUI frontend.
///
/// Shows one section at a time with every field of the section on screen,
/// a progress bar, and a strip of section titles.
#[derive(Debug, Clone)]
pub struct RatatuiBackend {
    /// Title shown on the login screen.
    title: String,
    /// Color theme for the UI.
    theme: Theme,
    /// Name shown in the form header.
    user: Option<String>,
}

impl Default for RatatuiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RatatuiBackend {
    /// Create a new Ratatui backend with default settings.
    pub fn new() -> Self {
        Self {
            title: "Dynamic Form".to_string(),
            theme: Theme::default(),
            user: None,
        }
    }

    /// Set the title shown on the login screen.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set a custom color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Greet this user in the form header.
    pub fn with_user(mut self, name: impl Into<String>) -> Self {
        self.user = Some(name.into());
        self
    }

    /// Show the login screen until the user submits credentials or quits.
    pub fn login(
        &self,
        banner: Option<Banner>,
        prefill: Credentials,
    ) -> Result<Option<Credentials>, RatatuiError> {
        let mut terminal = self.setup_terminal()?;
        let result = self.login_loop(&mut terminal, LoginState::new(banner, prefill));
        self.restore_terminal(&mut terminal)?;
        result
    }

    fn login_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        mut state: LoginState,
    ) -> Result<Option<Credentials>, RatatuiError> {
        loop {
            terminal.draw(|frame| draw_login(frame, self, &state))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match state.handle_key(key) {
                    LoginAction::Continue => {}
                    LoginAction::Submit(credentials) => return Ok(Some(credentials)),
                    LoginAction::Quit => return Ok(None),
                }
            }
        }
    }

    fn form_loop<S: SubmissionSink>(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        engine: &mut FormEngine,
        sink: &mut S,
    ) -> Result<RunOutcome, RatatuiError> {
        let mut state = WizardState::new(engine);

        loop {
            terminal.draw(|frame| match state.phase() {
                Phase::Completed | Phase::Finished => draw_completion(frame, &self.theme),
                Phase::SubmitFailed(message) => draw_submit_failed(frame, &self.theme, message),
                Phase::Editing | Phase::Cancelled => draw_ui(frame, self, engine, &state),
            })?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                state.handle_key(engine, sink, key);
            }

            if state.is_done() {
                return Ok(match state.phase() {
                    Phase::Finished => RunOutcome::Submitted,
                    _ => RunOutcome::Cancelled,
                });
            }
        }
    }

    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>, RatatuiError> {
        enable_raw_mode()
            .map_err(|e| RatatuiError::Terminal(format!("cannot enable raw mode: {e}")))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), RatatuiError> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }
}

impl FormBackend for RatatuiBackend {
    type Error = RatatuiError;

    fn run<S: SubmissionSink>(
        &self,
        engine: &mut FormEngine,
        sink: &mut S,
    ) -> Result<RunOutcome, Self::Error> {
        let mut terminal = self.setup_terminal()?;
        let result = self.form_loop(&mut terminal, engine, sink);
        self.restore_terminal(&mut terminal)?;
        result
    }
}

fn draw_login(frame: &mut Frame, backend: &RatatuiBackend, state: &LoginState) {
    let theme = &backend.theme;
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(2), // Banner
            Constraint::Length(3), // Roll number
            Constraint::Length(3), // Name
            Constraint::Min(0),
            Constraint::Length(3), // Help
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(backend.title.clone().bold()),
        Line::from("Log in to fill your form"),
    ])
    .style(Style::default().fg(theme.primary))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(header, chunks[0]);

    if let Some(banner) = state.banner() {
        let color = if banner.is_error() {
            theme.error
        } else {
            theme.success
        };
        let widget = Paragraph::new(banner.to_string())
            .style(Style::default().fg(color).bold())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(widget, chunks[1]);
    }

    let inputs = [
        (
            LoginField::RollNumber,
            " Roll Number ",
            state.credentials().roll_number.as_str(),
            "Enter your roll number",
            chunks[2],
        ),
        (
            LoginField::Name,
            " Name ",
            state.credentials().name.as_str(),
            "Enter your name",
            chunks[3],
        ),
    ];
    for (field, title, value, placeholder, rect) in inputs {
        let focused = state.focus() == field;
        let border = if focused { theme.primary } else { theme.border };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title)
            .title_style(Style::default().fg(theme.secondary));
        let text = if value.is_empty() {
            Line::from(placeholder.dim())
        } else {
            Line::from(value.to_string())
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(theme.text))
                .block(block),
            rect,
        );
        if focused {
            let x = rect.x + 1 + value.chars().count() as u16;
            frame.set_cursor_position((x.min(rect.right().saturating_sub(2)), rect.y + 1));
        }
    }

    let help = Paragraph::new("Tab: Switch field  Enter: Log in  Esc: Quit")
        .style(Style::default().fg(theme.border))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(help, chunks[5]);
}

fn draw_ui(frame: &mut Frame, backend: &RatatuiBackend, engine: &FormEngine, state: &WizardState) {
    let theme = &backend.theme;
    let area = frame.area();
    let schema = engine.schema();

    // Main layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(2), // Progress bar
            Constraint::Length(1), // Section strip
            Constraint::Length(3), // Section title
            Constraint::Min(5),    // Fields
            Constraint::Length(1), // Notice
            Constraint::Length(3), // Help
        ])
        .split(area);

    // Header
    let mut meta = format!("Form ID: {} • Version {}", schema.form_id, schema.version);
    if let Some(user) = &backend.user {
        meta.push_str(&format!("  Welcome, {user}"));
    }
    let header = Paragraph::new(vec![
        Line::from(schema.title.clone().bold()),
        Line::from(meta),
    ])
    .style(Style::default().fg(theme.primary))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(header, chunks[0]);

    // Progress - thin bar with text
    let current = engine.current_index().map_or(schema.len(), |i| i + 1);
    draw_progress(
        frame,
        theme,
        chunks[1],
        engine.progress(),
        &format!("Section {current} of {}", schema.len()),
        &format!("{}% Complete", engine.progress_percent()),
    );

    // Section strip
    let mut spans = Vec::new();
    for (section, status) in schema.sections.iter().zip(engine.section_statuses()) {
        let span = match status {
            SectionStatus::Done => {
                Span::styled(format!("✓ {}", section.title), Style::default().fg(theme.success))
            }
            SectionStatus::Current => Span::styled(
                format!("● {}", section.title),
                Style::default().fg(theme.highlight).bold(),
            ),
            SectionStatus::Upcoming => {
                Span::styled(format!("○ {}", section.title), Style::default().fg(theme.border))
            }
        };
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(span);
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        chunks[2],
    );

    let Some(controller) = engine.controller() else {
        return;
    };
    let section = controller.section();

    // Section title
    let mut lines = vec![Line::from(section.title.clone().bold())];
    if !section.description.is_empty() {
        lines.push(Line::from(section.description.clone()));
    }
    let title = Paragraph::new(lines)
        .style(Style::default().fg(theme.primary))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(title, chunks[3]);

    // Fields
    let fields = render_section(controller);
    let heights: Vec<u16> = fields.iter().map(field_height).collect();
    let area = chunks[4];
    let start = scroll_start(&heights, state.focus(), area.height);
    let mut y = area.y;
    for (index, field) in fields.iter().enumerate().skip(start) {
        let height = heights[index];
        if y + height > area.bottom() {
            break;
        }
        let rect = Rect::new(area.x, y, area.width, height);
        draw_field(frame, theme, rect, field, index == state.focus(), state);
        y += height;
    }

    // Notice
    if let Some(notice) = state.notice() {
        let widget = Paragraph::new(notice.to_string())
            .style(Style::default().fg(theme.error).bold())
            .alignment(Alignment::Center);
        frame.render_widget(widget, chunks[5]);
    }

    // Help bar
    let next = if engine.is_last_section() {
        "Submit"
    } else {
        "Next"
    };
    let focused = fields.get(state.focus()).map(|f| &f.control);
    let edit = match focused {
        Some(Control::TextArea { .. }) => format!("Enter: New line  Ctrl-N: {next}"),
        Some(Control::Dropdown { .. } | Control::RadioGroup { .. }) => {
            format!("←/→: Choose  Enter: {next}")
        }
        Some(Control::Checkbox) => format!("Space: Toggle  Enter: {next}"),
        _ => format!("Enter: {next}"),
    };
    let back = if engine.can_retreat() {
        "  Ctrl-P/PgUp: Previous"
    } else {
        ""
    };
    let help = Paragraph::new(format!("Tab/↑/↓: Field  {edit}{back}  Esc: Cancel"))
        .style(Style::default().fg(theme.border))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(help, chunks[6]);
}

fn draw_progress(frame: &mut Frame, theme: &Theme, area: Rect, ratio: f64, left: &str, right: &str) {
    let bar_width = area.width.saturating_sub(2); // Leave margin
    let filled_width = (ratio * bar_width as f64) as u16;
    let bar_x = area.x + 1;

    // Background track
    let track = "─".repeat(bar_width as usize);
    let track_widget = Paragraph::new(track).style(Style::default().fg(theme.border));
    frame.render_widget(track_widget, Rect::new(bar_x, area.y, bar_width, 1));

    // Filled portion
    if filled_width > 0 {
        let filled = "━".repeat(filled_width as usize);
        let filled_widget = Paragraph::new(filled).style(Style::default().fg(theme.primary));
        frame.render_widget(filled_widget, Rect::new(bar_x, area.y, filled_width, 1));
    }

    let text_area = Rect::new(bar_x, area.y + 1, bar_width, 1);
    frame.render_widget(
        Paragraph::new(left.to_string()).style(Style::default().fg(theme.secondary)),
        text_area,
    );
    frame.render_widget(
        Paragraph::new(right.to_string())
            .style(Style::default().fg(theme.secondary))
            .alignment(Alignment::Right),
        text_area,
    );
}

/// Rows a field takes: bordered control plus an optional error line.
fn field_height(field: &RenderedField) -> u16 {
    let body = match &field.control {
        Control::TextArea { .. } => 4,
        Control::RadioGroup { options } => options.len().max(1) as u16,
        _ => 1,
    };
    body + 2 + u16::from(field.error.is_some())
}

fn draw_field(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    field: &RenderedField,
    focused: bool,
    state: &WizardState,
) {
    let shown = state.entry_text(field);
    let error_rows = u16::from(field.error.is_some());
    let control_area = Rect::new(area.x, area.y, area.width, area.height - error_rows);

    let mut title = vec![Span::raw(" ")];
    if let Some(icon) = field.icon {
        title.push(Span::styled(
            format!("{} ", icon.glyph()),
            Style::default().fg(theme.secondary),
        ));
    }
    title.push(Span::styled(
        field.label.clone(),
        Style::default().fg(theme.text).bold(),
    ));
    if field.required {
        title.push(Span::styled(" *", Style::default().fg(theme.error)));
    }
    title.push(Span::raw(" "));

    let border = if field.error.is_some() {
        theme.error
    } else if focused {
        theme.primary
    } else {
        theme.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Line::from(title));

    let body: Vec<Line> = match &field.control {
        Control::TextInput { kind, placeholder: hint } => {
            if field.text().is_empty() {
                let hint = hint.clone().or_else(|| match kind {
                    TextKind::Email => Some("name@example.com".to_string()),
                    TextKind::Tel => Some("Phone number".to_string()),
                    TextKind::Text => None,
                });
                vec![placeholder_line(hint)]
            } else {
                vec![Line::from(field.text().to_string())]
            }
        }
        Control::TextArea { placeholder: hint } => {
            if field.text().is_empty() {
                vec![placeholder_line(hint.clone())]
            } else {
                field.text().lines().map(|l| Line::from(l.to_string())).collect()
            }
        }
        Control::DateInput => {
            if shown.is_empty() {
                vec![Line::from("YYYY-MM-DD".dim())]
            } else {
                vec![Line::from(shown.clone())]
            }
        }
        Control::Dropdown {
            options,
            placeholder: hint,
        } => {
            let shown = field
                .selected_option()
                .and_then(|i| options.get(i))
                .map(|o| Span::raw(o.label.clone()))
                .unwrap_or_else(|| hint.clone().dim());
            vec![Line::from(vec![
                Span::styled("◀ ", Style::default().fg(theme.secondary)),
                shown,
                Span::styled(" ▶", Style::default().fg(theme.secondary)),
            ])]
        }
        Control::RadioGroup { options } => {
            let selected = field.selected_option();
            options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let (mark, style) = if selected == Some(i) {
                        ("(•)", Style::default().fg(theme.highlight).bold())
                    } else {
                        ("( )", Style::default().fg(theme.text))
                    };
                    Line::styled(format!("{mark} {}", option.label), style)
                })
                .collect()
        }
        Control::Checkbox => {
            let mark = if field.checked() { "[✓]" } else { "[ ]" };
            vec![Line::from(format!("{mark} {}", field.label))]
        }
        Control::Unsupported { .. } => {
            let notice = field.unsupported_notice().unwrap_or_default();
            vec![Line::styled(notice, Style::default().fg(theme.error).dim())]
        }
    };

    frame.render_widget(
        Paragraph::new(body)
            .style(Style::default().fg(theme.text))
            .block(block),
        control_area,
    );

    if focused && (field.control.is_text_entry() || field.control == Control::DateInput) {
        let before: String = shown.chars().take(state.cursor()).collect();
        let row = before.matches('\n').count() as u16;
        let col = before.rsplit('\n').next().unwrap_or("").chars().count() as u16;
        let x = (control_area.x + 1 + col).min(control_area.right().saturating_sub(2));
        let y = (control_area.y + 1 + row).min(control_area.bottom().saturating_sub(2));
        frame.set_cursor_position((x, y));
    }

    if let Some(error) = &field.error {
        let widget = Paragraph::new(format!(" {error}")).style(Style::default().fg(theme.error));
        frame.render_widget(
            widget,
            Rect::new(area.x, area.bottom() - 1, area.width, 1),
        );
    }
}

fn placeholder_line(text: Option<String>) -> Line<'static> {
    Line::from(text.unwrap_or_default().dim())
}

fn draw_submit_failed(frame: &mut Frame, theme: &Theme, message: &str) {
    let text = format!("{message}\n\nEnter: Retry  Esc: Cancel");
    draw_centered(frame, theme.error, " Submission failed ", text, theme);
}

fn draw_completion(frame: &mut Frame, theme: &Theme) {
    let text = "Form submitted successfully!\n\nPress Enter to continue.".to_string();
    draw_centered(frame, theme.success, " Complete ", text, theme);
}

fn draw_centered(frame: &mut Frame, color: Color, title: &str, text: String, theme: &Theme) {
    let area = frame.area();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_style(Style::default().fg(color).bold());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(theme.text))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    let centered = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Min(3),
            Constraint::Percentage(40),
        ])
        .split(inner);

    frame.render_widget(paragraph, centered[1]);
}
