// Bottom status bar: key hints on the left, signed-in profile on the right.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::{theme, App, View};

pub fn render_statusbar(f: &mut Frame, area: Rect, app: &App) {
    let hints = match app.view {
        View::Login => "Ctrl+C quit",
        View::Diaries => "m mood filter · 2 dashboard · j/k scroll · o logout · q quit",
        View::Dashboard => "r range · 1 diaries · o logout · q quit",
    };

    let profile = match &app.profile {
        Some(p) if !p.username.is_empty() => format!("{} <{}> ", p.username, p.email),
        Some(p) => format!("{} ", p.email),
        None => "Not signed in ".to_string(),
    };
    let profile_width = (profile.width() + 1) as u16;

    let chunks =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(profile_width)]).split(area);

    let hints_line = Paragraph::new(Line::from(Span::styled(
        format!(" {hints}"),
        Style::default().fg(theme::TEXT_DIM),
    )));
    f.render_widget(hints_line, chunks[0]);

    let profile_line = Paragraph::new(Line::from(Span::styled(
        profile,
        Style::default().fg(theme::ACCENT_BRAND),
    )))
    .alignment(ratatui::layout::Alignment::Right);
    f.render_widget(profile_line, chunks[1]);
}
