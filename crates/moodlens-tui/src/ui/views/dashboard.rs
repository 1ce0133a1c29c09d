use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use moodlens_core::models::RangeMode;

use crate::ui::{theme, App, FeedStatus};

pub fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(8),
        Constraint::Length(4),
    ])
    .split(area);

    let subtitle = match app.range {
        RangeMode::Today => "Count per hour (today)",
        _ => "Count per day",
    };
    let header = vec![
        Line::from(Span::styled(
            "Diary Creations",
            Style::default()
                .fg(theme::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(subtitle, Style::default().fg(theme::TEXT_MUTED)),
            Span::styled(
                format!("  [{}]", app.range.label()),
                Style::default().fg(theme::ACCENT_PRIMARY),
            ),
            Span::styled("  r cycles range", Style::default().fg(theme::TEXT_DIM)),
        ]),
    ];
    f.render_widget(Paragraph::new(header), chunks[0]);

    match &app.feed_status {
        FeedStatus::Loading => {
            let loading =
                Paragraph::new("Loading...").style(Style::default().fg(theme::TEXT_MUTED));
            f.render_widget(loading, chunks[1]);
        }
        FeedStatus::Unavailable(message) => {
            let unavailable = Paragraph::new(format!("Chart unavailable: {message}"))
                .style(Style::default().fg(theme::ACCENT_ERROR));
            f.render_widget(unavailable, chunks[1]);
        }
        FeedStatus::Ready => render_chart(f, app, chunks[1]),
    }

    render_cards(f, app, chunks[2]);
}

fn render_chart(f: &mut Frame, app: &App, area: Rect) {
    if app.buckets.iter().all(|b| b.count == 0) {
        let empty = Paragraph::new("No diaries in this range.")
            .style(Style::default().fg(theme::TEXT_MUTED));
        f.render_widget(empty, area);
        return;
    }

    // Hourly mode has 24 fixed buckets; shorten labels so they fit.
    let hourly = app.range == RangeMode::Today;
    let bars: Vec<Bar> = app
        .buckets
        .iter()
        .map(|bucket| {
            let label = if hourly {
                bucket.label.trim_end_matches(":00").to_string()
            } else {
                bucket.label.clone()
            };
            Bar::default()
                .value(bucket.count)
                .label(Line::from(label))
                .style(Style::default().fg(theme::ACCENT_BRAND))
                .value_style(
                    Style::default()
                        .fg(theme::TEXT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let bar_width = if hourly { 2 } else { 6 };
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    f.render_widget(chart, area);
}

fn render_cards(f: &mut Frame, app: &App, area: Rect) {
    let columns =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    let active_label = match app.range {
        RangeMode::Today => "Active Hours",
        _ => "Active Days",
    };

    let card = |title: &str, value: String| {
        Paragraph::new(vec![
            Line::from(Span::styled(
                title.to_string(),
                Style::default().fg(theme::TEXT_MUTED),
            )),
            Line::from(Span::styled(
                value,
                Style::default()
                    .fg(theme::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .block(Block::default().borders(Borders::ALL))
    };

    f.render_widget(card("Total in Range", app.summary.total.to_string()), columns[0]);
    f.render_widget(card(active_label, app.summary.active.to_string()), columns[1]);
}
