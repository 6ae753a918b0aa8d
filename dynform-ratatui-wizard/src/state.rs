//! Terminal-free wizard state.
//!
//! Everything the TUI does in response to a key press lives here, so the key
//! bindings can be exercised against a [`FormEngine`] without a terminal.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dynform::{
    Advance, Control, EngineError, FieldId, FieldInput, FormEngine, RenderedField,
    SubmissionSink, render_section,
};

/// Digits in a complete `YYYYMMDD` date.
const DATE_DIGITS: usize = 8;

/// Where the wizard is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Filling the current section.
    Editing,

    /// The sink refused the payload; Enter retries.
    SubmitFailed(String),

    /// The payload was accepted; waiting for Enter.
    Completed,

    /// The user confirmed the completion screen.
    Finished,

    /// The user pressed Esc.
    Cancelled,
}

/// Focus, cursor, and status of the form wizard.
#[derive(Debug, Clone)]
pub struct WizardState {
    phase: Phase,
    /// Index of the focused field within the current section.
    focus: usize,
    /// Cursor position in chars within the focused text field.
    cursor: usize,
    /// One-line status shown above the help bar.
    notice: Option<String>,
    /// Digits typed into date fields of the current section.
    date_drafts: HashMap<FieldId, String>,
}

impl WizardState {
    pub fn new(engine: &FormEngine) -> Self {
        let mut state = Self {
            phase: Phase::Editing,
            focus: 0,
            cursor: 0,
            notice: None,
            date_drafts: HashMap::new(),
        };
        state.enter_section(engine);
        state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The text a field shows while being edited.
    ///
    /// Date fields show their partial entry with dashes filled in; every other
    /// control shows its stored text.
    pub fn entry_text(&self, field: &RenderedField) -> String {
        match field.control {
            Control::DateInput => format_date_digits(&self.date_digits(field)),
            _ => field.text().to_string(),
        }
    }

    /// Check if the run loop should stop.
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Cancelled)
    }

    /// React to one key press.
    pub fn handle_key<S: SubmissionSink>(
        &mut self,
        engine: &mut FormEngine,
        sink: &mut S,
        key: KeyEvent,
    ) {
        match self.phase {
            Phase::Editing => self.handle_editing(engine, sink, key),
            Phase::SubmitFailed(_) => match key.code {
                KeyCode::Enter => self.retry(engine, sink),
                KeyCode::Esc => self.phase = Phase::Cancelled,
                _ => {}
            },
            Phase::Completed => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.phase = Phase::Finished;
                }
            }
            Phase::Finished | Phase::Cancelled => {}
        }
    }

    fn handle_editing<S: SubmissionSink>(
        &mut self,
        engine: &mut FormEngine,
        sink: &mut S,
        key: KeyEvent,
    ) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(field) = self.focused(engine) else {
            // A section without fields only navigates.
            match key.code {
                KeyCode::Esc => self.phase = Phase::Cancelled,
                KeyCode::Enter => self.advance(engine, sink),
                KeyCode::Char('n') if ctrl => self.advance(engine, sink),
                KeyCode::Char('p') if ctrl => self.retreat(engine),
                KeyCode::PageUp => self.retreat(engine),
                _ => {}
            }
            return;
        };

        match key.code {
            KeyCode::Esc => self.phase = Phase::Cancelled,
            KeyCode::Char('n') if ctrl => self.advance(engine, sink),
            KeyCode::Char('p') if ctrl => self.retreat(engine),
            KeyCode::PageUp => self.retreat(engine),
            KeyCode::Tab | KeyCode::Down => self.move_focus(engine, 1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(engine, -1),
            KeyCode::Enter => match field.control {
                Control::TextArea { .. } => self.insert(engine, &field, '\n'),
                _ => self.advance(engine, sink),
            },
            KeyCode::Char(' ') if matches!(field.control, Control::Checkbox) => {
                self.input(engine, &field, FieldInput::Toggle(!field.checked()));
            }
            KeyCode::Left | KeyCode::Right if !field.control.options().is_empty() => {
                let len = field.control.options().len();
                let index = match (key.code, field.selected_option()) {
                    (KeyCode::Right, Some(i)) => (i + 1).min(len - 1),
                    (_, Some(i)) => i.saturating_sub(1),
                    (_, None) => 0,
                };
                self.input(engine, &field, FieldInput::Choose(index));
            }
            KeyCode::Char(c) if !ctrl && field.control == Control::DateInput => {
                let mut digits = self.date_digits(&field);
                if c.is_ascii_digit() && digits.len() < DATE_DIGITS {
                    digits.push(c);
                    self.edit_date(engine, &field, digits);
                }
            }
            KeyCode::Backspace if field.control == Control::DateInput => {
                let mut digits = self.date_digits(&field);
                if digits.pop().is_some() {
                    self.edit_date(engine, &field, digits);
                }
            }
            KeyCode::Delete if field.control == Control::DateInput => {
                self.edit_date(engine, &field, String::new());
            }
            KeyCode::Char(c) if !ctrl && field.control.is_text_entry() => {
                self.insert(engine, &field, c);
            }
            KeyCode::Backspace if field.control.is_text_entry() => {
                let mut chars: Vec<char> = field.text().chars().collect();
                let at = self.cursor.min(chars.len());
                if at > 0 {
                    chars.remove(at - 1);
                    self.cursor = at - 1;
                    self.input(engine, &field, FieldInput::Text(chars.into_iter().collect()));
                }
            }
            KeyCode::Delete if field.control.is_text_entry() => {
                let mut chars: Vec<char> = field.text().chars().collect();
                if self.cursor < chars.len() {
                    chars.remove(self.cursor);
                    self.input(engine, &field, FieldInput::Text(chars.into_iter().collect()));
                }
            }
            KeyCode::Left if field.control.is_text_entry() => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right if field.control.is_text_entry() => {
                self.cursor = (self.cursor + 1).min(field.text().chars().count());
            }
            KeyCode::Home if field.control.is_text_entry() => self.cursor = 0,
            KeyCode::End if field.control.is_text_entry() => {
                self.cursor = field.text().chars().count();
            }
            _ => {}
        }
    }

    fn focused(&self, engine: &FormEngine) -> Option<RenderedField> {
        let controller = engine.controller()?;
        render_section(controller).into_iter().nth(self.focus)
    }

    fn field_count(engine: &FormEngine) -> usize {
        engine.current_section().map_or(0, |s| s.fields.len())
    }

    fn move_focus(&mut self, engine: &FormEngine, step: isize) {
        let count = Self::field_count(engine);
        if count == 0 {
            return;
        }
        self.focus = (self.focus as isize + step).rem_euclid(count as isize) as usize;
        self.cursor_to_end(engine);
    }

    fn cursor_to_end(&mut self, engine: &FormEngine) {
        self.cursor = self
            .focused(engine)
            .map_or(0, |field| self.entry_text(&field).chars().count());
    }

    fn date_digits(&self, field: &RenderedField) -> String {
        match self.date_drafts.get(&field.field_id) {
            Some(draft) => draft.clone(),
            None => field.text().chars().filter(char::is_ascii_digit).collect(),
        }
    }

    /// Store a date only once all digits are in; a partial entry stores
    /// nothing so the field reads as empty.
    fn edit_date(&mut self, engine: &mut FormEngine, field: &RenderedField, digits: String) {
        let text = format_date_digits(&digits);
        let value = if digits.len() == DATE_DIGITS {
            text.clone()
        } else {
            String::new()
        };

        let stored = engine
            .apply_input(field.field_id.as_str(), FieldInput::Text(value))
            .map(|_| ())
            .map_err(|e| e.to_string());
        self.notice = match stored {
            Ok(()) => None,
            Err(message) => {
                // Not a calendar date: clear the stored value, keep the digits.
                engine
                    .apply_input(field.field_id.as_str(), FieldInput::Text(String::new()))
                    .ok();
                Some(message)
            }
        };
        self.cursor = text.chars().count();
        self.date_drafts.insert(field.field_id.clone(), digits);
    }

    fn insert(&mut self, engine: &mut FormEngine, field: &RenderedField, c: char) {
        let mut chars: Vec<char> = field.text().chars().collect();
        let at = self.cursor.min(chars.len());
        chars.insert(at, c);
        self.cursor = at + 1;
        self.input(engine, field, FieldInput::Text(chars.into_iter().collect()));
    }

    fn input(&mut self, engine: &mut FormEngine, field: &RenderedField, input: FieldInput) {
        match engine.apply_input(field.field_id.as_str(), input) {
            Ok(_) => self.notice = None,
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn enter_section(&mut self, engine: &FormEngine) {
        self.focus = 0;
        self.notice = None;
        self.date_drafts.clear();
        self.cursor_to_end(engine);
    }

    fn advance<S: SubmissionSink>(&mut self, engine: &mut FormEngine, sink: &mut S) {
        match engine.advance(sink) {
            Ok(Advance::Next(_)) => self.enter_section(engine),
            Ok(Advance::Submitted) => self.phase = Phase::Completed,
            Err(EngineError::Rejected(rejected)) => {
                if let Some(section) = engine.current_section()
                    && let Some((first, _)) = rejected.errors.first()
                {
                    self.focus = section
                        .fields
                        .iter()
                        .position(|f| &f.field_id == first)
                        .unwrap_or(self.focus);
                }
                self.cursor_to_end(engine);
                self.notice = Some(rejected.to_string());
            }
            Err(EngineError::Submission(e)) => self.phase = Phase::SubmitFailed(e.to_string()),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn retreat(&mut self, engine: &mut FormEngine) {
        match engine.retreat() {
            Ok(_) => self.enter_section(engine),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn retry<S: SubmissionSink>(&mut self, engine: &mut FormEngine, sink: &mut S) {
        match engine.retry_submission(sink) {
            Ok(_) => self.phase = Phase::Completed,
            Err(e) => self.phase = Phase::SubmitFailed(e.to_string()),
        }
    }
}

/// Lay out up to eight date digits as `YYYY-MM-DD`.
fn format_date_digits(digits: &str) -> String {
    let mut text = String::with_capacity(10);
    for (i, c) in digits.chars().enumerate() {
        if i == 4 || i == 6 {
            text.push('-');
        }
        text.push(c);
    }
    text
}

/// First field to draw so the focused one fits in `available` rows.
pub(crate) fn scroll_start(heights: &[u16], focus: usize, available: u16) -> usize {
    let mut start = 0;
    let focus = focus.min(heights.len().saturating_sub(1));
    while start < focus {
        let used: u16 = heights[start..=focus].iter().sum();
        if used <= available {
            break;
        }
        start += 1;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynform::{FieldOption, FieldSpec, FieldValue, FormSchema, MemorySink, Section};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(
        state: &mut WizardState,
        engine: &mut FormEngine,
        sink: &mut MemorySink,
        text: &str,
    ) {
        for c in text.chars() {
            state.handle_key(engine, sink, key(KeyCode::Char(c)));
        }
    }

    fn schema() -> FormSchema {
        FormSchema::new(
            "Signup",
            "f1",
            "1",
            vec![
                Section::new(
                    1,
                    "About you",
                    vec![
                        FieldSpec::new("fullName", "text", "Full Name").required(),
                        FieldSpec::new("bio", "textarea", "Bio"),
                        FieldSpec::new("color", "radio", "Color").with_options(vec![
                            FieldOption::new("red", "Red"),
                            FieldOption::new("blue", "Blue"),
                        ]),
                    ],
                ),
                Section::new(
                    2,
                    "Terms",
                    vec![FieldSpec::new("agree", "checkbox", "I agree").required()],
                ),
            ],
        )
    }

    fn date_engine() -> FormEngine {
        FormEngine::new(FormSchema::new(
            "Dates",
            "f2",
            "1",
            vec![Section::new(
                1,
                "When",
                vec![FieldSpec::new("dob", "date", "Date of birth").required()],
            )],
        ))
        .unwrap()
    }

    fn shown_date(state: &WizardState, engine: &FormEngine) -> String {
        state.entry_text(&render_section(engine.controller().unwrap())[0])
    }

    #[test]
    fn date_entry_takes_digits_and_inserts_dashes() {
        let mut engine = date_engine();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        type_text(&mut state, &mut engine, &mut sink, "2024x/02");
        assert_eq!(shown_date(&state, &engine), "2024-02");
        assert_eq!(
            engine.controller().unwrap().value("dob"),
            Some(&FieldValue::from(""))
        );

        type_text(&mut state, &mut engine, &mut sink, "2999");
        assert_eq!(shown_date(&state, &engine), "2024-02-29");
        assert_eq!(state.cursor(), 10);
        assert_eq!(
            engine.controller().unwrap().value("dob"),
            Some(&FieldValue::from("2024-02-29"))
        );

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Backspace));
        assert_eq!(shown_date(&state, &engine), "2024-02-2");
        assert_eq!(
            engine.controller().unwrap().value("dob"),
            Some(&FieldValue::from(""))
        );
    }

    #[test]
    fn impossible_date_is_not_stored() {
        let mut engine = date_engine();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        type_text(&mut state, &mut engine, &mut sink, "20230229");

        assert_eq!(shown_date(&state, &engine), "2023-02-29");
        assert!(state.notice().unwrap().contains("not a valid date"));
        assert_eq!(
            engine.controller().unwrap().value("dob"),
            Some(&FieldValue::from(""))
        );

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Delete));
        assert_eq!(shown_date(&state, &engine), "");
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        type_text(&mut state, &mut engine, &mut sink, "Ada");
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Backspace));
        type_text(&mut state, &mut engine, &mut sink, "am");

        let value = engine.controller().unwrap().value("fullName").cloned();
        assert_eq!(value, Some(FieldValue::from("Adam")));
        assert_eq!(state.cursor(), 4);
    }

    #[test]
    fn cursor_moves_within_text() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        type_text(&mut state, &mut engine, &mut sink, "Aa");
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Left));
        type_text(&mut state, &mut engine, &mut sink, "d");

        let value = engine.controller().unwrap().value("fullName").cloned();
        assert_eq!(value, Some(FieldValue::from("Ada")));
    }

    #[test]
    fn focus_wraps_around() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::BackTab));
        assert_eq!(state.focus(), 2);
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Tab));
        assert_eq!(state.focus(), 0);
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Down));
        assert_eq!(state.focus(), 1);
    }

    #[test]
    fn enter_in_textarea_inserts_newline() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Tab));
        type_text(&mut state, &mut engine, &mut sink, "a");
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        type_text(&mut state, &mut engine, &mut sink, "b");

        let value = engine.controller().unwrap().value("bio").cloned();
        assert_eq!(value, Some(FieldValue::from("a\nb")));
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn arrows_choose_options() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::BackTab));
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Right));
        assert_eq!(
            engine.controller().unwrap().value("color"),
            Some(&FieldValue::from("red"))
        );
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Right));
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Right));
        assert_eq!(
            engine.controller().unwrap().value("color"),
            Some(&FieldValue::from("blue"))
        );
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Left));
        assert_eq!(
            engine.controller().unwrap().value("color"),
            Some(&FieldValue::from("red"))
        );
    }

    #[test]
    fn rejected_section_focuses_first_error() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Tab));
        state.handle_key(&mut engine, &mut sink, ctrl('n'));

        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(state.focus(), 0);
        assert_eq!(state.notice(), Some("1 field(s) need attention"));
    }

    #[test]
    fn full_run_with_keys() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        type_text(&mut state, &mut engine, &mut sink, "Ada");
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        assert_eq!(engine.current_index(), Some(1));

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Char(' ')));
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        assert_eq!(state.phase(), &Phase::Completed);
        assert_eq!(sink.submissions().len(), 1);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        assert_eq!(state.phase(), &Phase::Finished);
        assert!(state.is_done());
    }

    #[test]
    fn previous_section_with_page_up() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::PageUp));
        assert_eq!(state.notice(), Some("Already at the first section"));

        type_text(&mut state, &mut engine, &mut sink, "Ada");
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        state.handle_key(&mut engine, &mut sink, ctrl('p'));
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn submission_failure_then_retry() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::failing(1);
        let mut state = WizardState::new(&engine);

        type_text(&mut state, &mut engine, &mut sink, "Ada");
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Char(' ')));
        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        assert!(matches!(state.phase(), Phase::SubmitFailed(_)));

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Enter));
        assert_eq!(state.phase(), &Phase::Completed);
        assert_eq!(sink.submissions().len(), 1);
    }

    #[test]
    fn escape_cancels() {
        let mut engine = FormEngine::new(schema()).unwrap();
        let mut sink = MemorySink::new();
        let mut state = WizardState::new(&engine);

        state.handle_key(&mut engine, &mut sink, key(KeyCode::Esc));
        assert_eq!(state.phase(), &Phase::Cancelled);
        assert!(sink.submissions().is_empty());
    }

    #[test]
    fn scroll_keeps_focus_visible() {
        let heights = [3, 3, 5, 3];
        assert_eq!(scroll_start(&heights, 0, 8), 0);
        assert_eq!(scroll_start(&heights, 1, 8), 0);
        assert_eq!(scroll_start(&heights, 2, 8), 1);
        assert_eq!(scroll_start(&heights, 3, 8), 2);
        assert_eq!(scroll_start(&[], 0, 8), 0);
    }
}
