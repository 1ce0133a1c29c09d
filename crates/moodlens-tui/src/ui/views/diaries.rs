use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use moodlens_core::models::DiaryRecord;

use crate::ui::{theme, App, FeedStatus};

pub fn render_diaries(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);

    let header = Line::from(vec![
        Span::styled(
            "Diaries",
            Style::default()
                .fg(theme::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  mood: {}", app.mood_filter.label()),
            Style::default().fg(theme::ACCENT_PRIMARY),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    match &app.feed_status {
        FeedStatus::Loading => {
            let loading = Paragraph::new("Loading diaries...")
                .style(Style::default().fg(theme::TEXT_MUTED));
            f.render_widget(loading, chunks[1]);
        }
        FeedStatus::Unavailable(message) => {
            let unavailable = Paragraph::new(format!("Diaries unavailable: {message}"))
                .style(Style::default().fg(theme::ACCENT_ERROR));
            f.render_widget(unavailable, chunks[1]);
        }
        FeedStatus::Ready => {
            let filtered = app.filtered_records();
            if filtered.is_empty() {
                let empty = Paragraph::new("No diaries found.")
                    .style(Style::default().fg(theme::TEXT_MUTED));
                f.render_widget(empty, chunks[1]);
                return;
            }

            let width = chunks[1].width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = filtered
                .iter()
                .map(|record| diary_card(record, width))
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut state = ListState::default();
            state.select(Some(app.selected.min(filtered.len() - 1)));
            f.render_stateful_widget(list, chunks[1], &mut state);
        }
    }
}

fn diary_card(record: &DiaryRecord, width: usize) -> ListItem<'static> {
    let mut lines = Vec::new();

    let date = record
        .created_date
        .map(|d| d.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "Unknown date".to_string());
    let mut header = vec![Span::styled(date, Style::default().fg(theme::TEXT_MUTED))];
    if !record.mood.is_empty() {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            record.mood.to_uppercase(),
            Style::default()
                .fg(theme::mood_color(&record.mood))
                .add_modifier(Modifier::BOLD),
        ));
    }
    if !record.images.is_empty() {
        let plural = if record.images.len() > 1 { "s" } else { "" };
        header.push(Span::styled(
            format!("  {} image{}", record.images.len(), plural),
            Style::default().fg(theme::TEXT_DIM),
        ));
    }
    lines.push(Line::from(header));

    if let Some(content) = &record.content {
        if let Some(first) = content.lines().next() {
            lines.push(Line::from(Span::styled(
                truncate(first, width),
                Style::default().fg(theme::TEXT_PRIMARY),
            )));
        }
    }

    let tags = record.keyword_tags();
    if !tags.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate(&format!("[{}]", tags.join("] [")), width),
            Style::default().fg(theme::ACCENT_PRIMARY),
        )));
    }

    if let Some(reflection) = &record.emotional_reflection {
        lines.push(Line::from(Span::styled(
            truncate(&format!("Reflection: {reflection}"), width),
            Style::default().fg(theme::TEXT_MUTED),
        )));
    }
    if let Some(suggestion) = &record.suggestion {
        lines.push(Line::from(Span::styled(
            truncate(&format!("Suggestion: {suggestion}"), width),
            Style::default().fg(theme::ACCENT_BRAND),
        )));
    }

    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn truncate(text: &str, width: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.width() <= width {
        return flat;
    }
    let mut out = String::new();
    for c in flat.chars() {
        if out.width() + 1 >= width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}
