//! Login / register form. Shown full-screen whenever there is no session.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use secrecy::SecretString;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    const ALL: [Field; 3] = [Self::Name, Self::Email, Self::Password];

    fn visible_for(self, mode: Mode) -> bool {
        self != Self::Name || mode == Mode::Register
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormState {
    Editing,
    Submitting,
}

pub struct LoginScreen {
    focused: bool,
    mode: Mode,
    state: FormState,
    active_field: Field,
    name_input: String,
    email_input: String,
    password_input: String,
    show_password: bool,
    error: Option<String>,
    api_url: String,
}

impl LoginScreen {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            focused: false,
            mode: Mode::Login,
            state: FormState::Editing,
            active_field: Field::Email,
            name_input: String::new(),
            email_input: String::new(),
            password_input: String::new(),
            show_password: false,
            error: None,
            api_url: api_url.into(),
        }
    }

    // ── Field navigation ─────────────────────────────────────────────

    fn visible_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| f.visible_for(self.mode))
            .collect()
    }

    fn focus_step(&mut self, forward: bool) {
        let fields = self.visible_fields();
        let len = fields.len();
        let pos = fields
            .iter()
            .position(|&f| f == self.active_field)
            .unwrap_or(0);
        let next = (if forward { pos + 1 } else { pos + len - 1 }) % len;
        if let Some(&field) = fields.get(next) {
            self.active_field = field;
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Login => Mode::Register,
            Mode::Register => Mode::Login,
        };
        if !self.active_field.visible_for(self.mode) {
            self.active_field = Field::Email;
        }
        self.error = None;
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.active_field {
            Field::Name => &mut self.name_input,
            Field::Email => &mut self.email_input,
            Field::Password => &mut self.password_input,
        }
    }

    // ── Submission ───────────────────────────────────────────────────

    fn validate(&self) -> std::result::Result<(), String> {
        if self.mode == Mode::Register && self.name_input.trim().is_empty() {
            return Err("Name cannot be empty".into());
        }
        let email = self.email_input.trim();
        if email.is_empty() {
            return Err("Email cannot be empty".into());
        }
        if !email.contains('@') {
            return Err("Email must contain '@'".into());
        }
        if self.password_input.is_empty() {
            return Err("Password cannot be empty".into());
        }
        Ok(())
    }

    fn submit(&mut self) -> Option<Action> {
        if let Err(msg) = self.validate() {
            self.error = Some(msg);
            return None;
        }
        self.state = FormState::Submitting;
        self.error = None;

        let email = self.email_input.trim().to_owned();
        let password = SecretString::from(self.password_input.clone());
        Some(match self.mode {
            Mode::Login => Action::SubmitLogin { email, password },
            Mode::Register => Action::SubmitRegister {
                name: self.name_input.trim().to_owned(),
                email,
                password,
            },
        })
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_panel(&self, frame: &mut Frame, area: Rect) -> Rect {
        let panel_w = 56u16.min(area.width.saturating_sub(4));
        let panel_h = 22u16.min(area.height.saturating_sub(2));
        let x = area.width.saturating_sub(panel_w) / 2;
        let y = area.height.saturating_sub(panel_h) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );

        let title = match self.mode {
            Mode::Login => "Sign in",
            Mode::Register => "Create account",
        };
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    title,
                    Style::default()
                        .fg(theme::NEON_CYAN)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(panel);
        frame.render_widget(block, panel);
        inner
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, field: Field) {
        if area.height < 3 {
            return;
        }
        let (label, value, masked) = match field {
            Field::Name => ("  Name", self.name_input.as_str(), false),
            Field::Email => ("  Email", self.email_input.as_str(), false),
            Field::Password => ("  Password", self.password_input.as_str(), !self.show_password),
        };
        let active = self.active_field == field && self.state == FormState::Editing;

        let label_style = if active {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            theme::label()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if active {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let block_area = Rect::new(area.x, area.y + 1, area.width, 3.min(area.height - 1));
        let inner = block.inner(block_area);
        frame.render_widget(block, block_area);

        let mut text = if masked {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_owned()
        };
        if active {
            text.push('\u{2588}');
        }
        frame.render_widget(Paragraph::new(Span::styled(text, theme::value())), inner);
    }
}

impl Component for LoginScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.state == FormState::Submitting {
            return Ok(None);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('r') if ctrl => self.toggle_mode(),
            KeyCode::Char('u') if ctrl => self.show_password = !self.show_password,
            KeyCode::Tab | KeyCode::Down => self.focus_step(true),
            KeyCode::BackTab | KeyCode::Up => self.focus_step(false),
            KeyCode::Enter => return Ok(self.submit()),
            KeyCode::Esc => self.error = None,
            KeyCode::Backspace => {
                self.active_input_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => {
                self.error = None;
                self.active_input_mut().push(c);
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::AuthResult(Ok(())) => {
                self.state = FormState::Editing;
                self.password_input.clear();
                self.error = None;
            }
            Action::AuthResult(Err(msg)) => {
                self.state = FormState::Editing;
                self.error = Some(msg.clone());
            }
            Action::SessionChanged(false) => {
                self.state = FormState::Editing;
                self.password_input.clear();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = self.render_panel(frame, area);

        let mut constraints = vec![Constraint::Length(1)]; // API url
        for _ in self.visible_fields() {
            constraints.push(Constraint::Length(4));
        }
        constraints.push(Constraint::Length(2)); // status / error
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1)); // hints

        let fields_area = Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            inner.height,
        );
        let chunks = Layout::vertical(constraints).split(fields_area);

        frame.render_widget(
            Paragraph::new(Span::styled(format!("  {}", self.api_url), theme::key_hint())),
            chunks[0],
        );

        let fields = self.visible_fields();
        for (i, field) in fields.iter().enumerate() {
            self.render_input(frame, chunks[i + 1], *field);
        }

        let status_area = chunks[fields.len() + 1];
        let status = match (&self.error, self.state) {
            (Some(msg), _) => Span::styled(format!("  {msg}"), Style::default().fg(theme::ERROR_RED)),
            (None, FormState::Submitting) => Span::styled(
                "  Contacting the catalog\u{2026}",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            (None, FormState::Editing) => Span::raw(""),
        };
        frame.render_widget(Paragraph::new(Line::from(status)), status_area);

        let switch_hint = match self.mode {
            Mode::Login => "register",
            Mode::Register => "sign in",
        };
        let hints = Line::from(vec![
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("next  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("submit  ", theme::key_hint()),
            Span::styled("^R ", theme::key_hint_key()),
            Span::styled(format!("{switch_hint}  "), theme::key_hint()),
            Span::styled("^U ", theme::key_hint_key()),
            Span::styled("reveal  ", theme::key_hint()),
            Span::styled("^C ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        if let Some(area) = chunks.last() {
            frame.render_widget(
                Paragraph::new(hints).alignment(Alignment::Center),
                *area,
            );
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "login"
    }
}
