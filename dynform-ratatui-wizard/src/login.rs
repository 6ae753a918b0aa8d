use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dynform::{Banner, Credentials};

/// Which login input has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    RollNumber,
    Name,
}

/// What a key press on the login screen asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    Continue,
    Submit(Credentials),
    Quit,
}

/// Inputs and banner of the login screen.
#[derive(Debug, Clone)]
pub struct LoginState {
    credentials: Credentials,
    focus: LoginField,
    banner: Option<Banner>,
}

impl LoginState {
    pub fn new(banner: Option<Banner>, prefill: Credentials) -> Self {
        let focus = if !prefill.roll_number.is_empty() && prefill.name.is_empty() {
            LoginField::Name
        } else {
            LoginField::RollNumber
        };
        Self {
            credentials: prefill,
            focus,
            banner,
        }
    }

    pub fn focus(&self) -> LoginField {
        self.focus
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::RollNumber => &mut self.credentials.roll_number,
            LoginField::Name => &mut self.credentials.name,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::RollNumber => LoginField::Name,
            LoginField::Name => LoginField::RollNumber,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        match key.code {
            KeyCode::Esc => LoginAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                LoginAction::Quit
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.toggle_focus();
                LoginAction::Continue
            }
            KeyCode::Enter => match self.credentials.check() {
                Ok(()) => LoginAction::Submit(self.credentials.clone()),
                Err(e) => {
                    self.banner = Some(Banner::Error(e.to_string()));
                    LoginAction::Continue
                }
            },
            KeyCode::Backspace => {
                self.focused_mut().pop();
                LoginAction::Continue
            }
            KeyCode::Char(c) => {
                self.focused_mut().push(c);
                LoginAction::Continue
            }
            _ => LoginAction::Continue,
        }
    }
}
