//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::UiSettings;

const CONTROLS: &[(&str, &str)] = &[
    ("enter", "play"),
    ("space/p", "play/stop"),
    ("s", "stop"),
    ("h/l", "prev/next"),
    ("-/+", "volume"),
    ("r", "reload"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into `frame` from `app`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lyre ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let lines: Vec<Line> = app.now_playing_lines().into_iter().map(Line::from).collect();
    let mut now_playing = Paragraph::new(lines).block(padded(" now playing "));
    if !app.has_media() {
        now_playing = now_playing.style(Style::default().add_modifier(Modifier::DIM));
    }
    frame.render_widget(now_playing, chunks[1]);

    frame.render_widget(
        Paragraph::new(app.time_text()).block(padded(" time ")),
        chunks[2],
    );

    frame.render_widget(
        Paragraph::new(app.cover_text()).block(padded(" cover ")),
        chunks[3],
    );

    frame.render_widget(
        Paragraph::new(app.status_text())
            .block(padded(" status "))
            .wrap(Wrap { trim: true }),
        chunks[4],
    );

    let footer = Paragraph::new(controls_text())
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[6]);
}
