//! Registration form overlay
//!
//! A modal over the main pane. Field text lives here until submit; the
//! request is built with `to_request()` and validated by the collaborator
//! module, never by the form.

use crate::collab::RegistrationRequest;
use crate::theme::Palette;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Verification codes are at most this many digits
const MAX_CODE_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Email,
    VerifyCode,
    Nickname,
    Password,
    Occupation,
    InviterEmail,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Email,
        FormField::VerifyCode,
        FormField::Nickname,
        FormField::Password,
        FormField::Occupation,
        FormField::InviterEmail,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Email => "Email",
            FormField::VerifyCode => "Verification code",
            FormField::Nickname => "Nickname",
            FormField::Password => "Password",
            FormField::Occupation => "Occupation",
            FormField::InviterEmail => "Inviter email (optional)",
        }
    }

    fn index(&self) -> usize {
        match self {
            FormField::Email => 0,
            FormField::VerifyCode => 1,
            FormField::Nickname => 2,
            FormField::Password => 3,
            FormField::Occupation => 4,
            FormField::InviterEmail => 5,
        }
    }
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    values: [String; 6],
    focused: usize,
    /// A submit or verify-code request is in flight
    pub busy: bool,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focused]
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    /// Move focus forward, wrapping
    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % FormField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.focused = (self.focused + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    /// Type into the focused field; the code field only takes digits
    pub fn insert(&mut self, c: char) {
        let field = self.focused();
        let value = &mut self.values[field.index()];
        if field == FormField::VerifyCode {
            if c.is_ascii_digit() && value.len() < MAX_CODE_DIGITS {
                value.push(c);
            }
            return;
        }
        if !c.is_control() {
            value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.values[self.focused].pop();
    }

    /// Build the request from the current field text
    pub fn to_request(&self) -> RegistrationRequest {
        RegistrationRequest {
            email: self.value(FormField::Email).trim().to_string(),
            nickname: self.value(FormField::Nickname).trim().to_string(),
            password: self.value(FormField::Password).to_string(),
            occupation: self.value(FormField::Occupation).trim().to_string(),
            inviter_email: self.value(FormField::InviterEmail).trim().to_string(),
            verify_code: self.value(FormField::VerifyCode).parse().ok(),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let popup = centered(area, 60, FormField::ALL.len() as u16 + 6);
        f.render_widget(Clear, popup);

        let title = if self.busy {
            " Register (working…) "
        } else {
            " Register "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(palette.border_type)
            .border_style(Style::default().fg(palette.border_focused))
            .title(title)
            .style(Style::default().bg(palette.background));
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        let label_width = FormField::ALL
            .iter()
            .map(|field| field.label().len())
            .max()
            .unwrap_or(0);
        let value_width = (chunks[0].width as usize).saturating_sub(label_width + 3);

        let lines: Vec<Line> = FormField::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let focused = i == self.focused;
                let raw = self.value(*field);
                let shown = match field {
                    FormField::Password => "•".repeat(raw.chars().count()),
                    _ => raw.to_string(),
                };
                let cursor = if focused { "▏" } else { "" };
                let label_style = if focused {
                    Style::default()
                        .fg(palette.foreground)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.muted)
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}  ", field.label(), width = label_width),
                        label_style,
                    ),
                    Span::styled(
                        truncate_to_width(&format!("{shown}{cursor}"), value_width),
                        Style::default().fg(palette.foreground),
                    ),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), chunks[0]);

        let hint = Line::styled(
            "Tab next · ^S send code · Enter submit · Esc cancel",
            Style::default().fg(palette.muted),
        );
        f.render_widget(
            Paragraph::new(vec![Line::default(), hint]),
            chunks[1],
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::ValidationError;

    fn type_str(form: &mut RegisterForm, text: &str) {
        for c in text.chars() {
            form.insert(c);
        }
    }

    #[test]
    fn builds_request_from_fields() {
        let mut form = RegisterForm::new();
        type_str(&mut form, " ada@example.com ");
        form.next_field();
        type_str(&mut form, "12a34");
        form.next_field();
        type_str(&mut form, "ada");
        form.next_field();
        type_str(&mut form, "hunter2");
        form.next_field();
        type_str(&mut form, "engineer");

        let request = form.to_request();
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.verify_code, Some(1234));
        assert_eq!(request.nickname, "ada");
        assert_eq!(request.password, "hunter2");
        assert_eq!(request.occupation, "engineer");
        assert_eq!(request.inviter_email, "");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = RegisterForm::new();
        form.prev_field();
        assert_eq!(form.focused(), FormField::InviterEmail);
        form.next_field();
        assert_eq!(form.focused(), FormField::Email);
    }

    #[test]
    fn code_field_is_bounded_digits() {
        let mut form = RegisterForm::new();
        form.next_field();
        type_str(&mut form, "1234567");
        assert_eq!(form.value(FormField::VerifyCode), "123456");
        form.backspace();
        assert_eq!(form.to_request().verify_code, Some(12345));
    }

    #[test]
    fn empty_code_is_rejected_locally() {
        let mut form = RegisterForm::new();
        type_str(&mut form, "ada@example.com");
        form.next_field();
        form.next_field();
        type_str(&mut form, "ada");
        form.next_field();
        type_str(&mut form, "hunter2");
        form.next_field();
        type_str(&mut form, "engineer");

        let request = form.to_request();
        assert_eq!(request.verify_code, None);
        assert_eq!(request.validate(), Err(ValidationError::EmptyVerifyCode));
    }
}
