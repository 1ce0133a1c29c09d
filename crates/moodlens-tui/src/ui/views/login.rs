use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::{theme, App};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Login form state. Everything lives client-side until submit; the error
/// line shows the mapped identity-service message and clears on edit.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub busy: bool,
}

impl LoginForm {
    pub fn insert_char(&mut self, c: char) {
        if self.busy {
            return;
        }
        self.error = None;
        match self.focus {
            LoginField::Email => self.email.push(c),
            LoginField::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        if self.busy {
            return;
        }
        self.error = None;
        match self.focus {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn fail(&mut self, message: String) {
        self.busy = false;
        self.error = Some(message);
    }
}

pub fn render_login(f: &mut Frame, app: &App, area: Rect) {
    // Center a fixed-size card in the available space.
    let [card] = Layout::horizontal([Constraint::Length(48)])
        .flex(Flex::Center)
        .areas(area);
    let [card] = Layout::vertical([Constraint::Length(12)])
        .flex(Flex::Center)
        .areas(card);

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(card);

    let title = Paragraph::new("Welcome Back")
        .style(
            Style::default()
                .fg(theme::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let field_style = |focused: bool| {
        if focused {
            Style::default().fg(theme::BORDER_ACTIVE)
        } else {
            Style::default().fg(theme::BORDER_INACTIVE)
        }
    };

    let form = &app.login;
    let email = Paragraph::new(form.email.as_str())
        .style(Style::default().fg(theme::TEXT_PRIMARY))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Email")
                .border_style(field_style(form.focus == LoginField::Email)),
        );
    f.render_widget(email, chunks[1]);

    let password = Paragraph::new("*".repeat(form.password.chars().count()))
        .style(Style::default().fg(theme::TEXT_PRIMARY))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Password")
                .border_style(field_style(form.focus == LoginField::Password)),
        );
    f.render_widget(password, chunks[2]);

    let hint = if form.busy {
        Paragraph::new("Logging in...").style(Style::default().fg(theme::TEXT_MUTED))
    } else {
        Paragraph::new("Tab switches fields · Enter logs in")
            .style(Style::default().fg(theme::TEXT_DIM))
    };
    f.render_widget(hint.alignment(Alignment::Center), chunks[3]);

    if let Some(error) = &form.error {
        let error_line = Paragraph::new(error.as_str())
            .style(Style::default().fg(theme::ACCENT_ERROR))
            .alignment(Alignment::Center);
        f.render_widget(error_line, chunks[4]);
    }
}
