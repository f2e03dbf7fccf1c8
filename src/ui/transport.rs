//! Transport panel rendering.
//!
//! Displays the playback state, what is playing, the volume slider, and the
//! session timer.

use crate::app::App;
use crate::audio::{AudioOutput, PlaybackState};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;
use std::time::Instant;

/// Renders the transport panel.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `area` - The area to render in
/// * `app` - Application state
/// * `now` - Current time, for the countdown
pub fn render_transport<O: AudioOutput>(
    frame: &mut Frame,
    area: Rect,
    app: &App<O>,
    now: Instant,
) {
    let block = Block::default()
        .title(" Transport ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // State
            Constraint::Min(20),    // Now playing
            Constraint::Length(24), // Timer
        ])
        .split(rows[0]);

    let state = match app.audio.playback_state() {
        PlaybackState::Playing => Span::styled(
            " [>] PLAY ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Idle => Span::styled(
            " [.] STOP ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(state)), top[0]);

    let playing = app
        .audio
        .session_kind()
        .map(|kind| kind.describe())
        .unwrap_or_else(|| "Nothing playing".to_string());
    frame.render_widget(
        Paragraph::new(Span::styled(playing, Style::default().fg(Color::Cyan))),
        top[1],
    );

    let timer_style = if app.timer.is_running() {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{} min  ", app.timer.minutes()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(app.timer.label(now), timer_style),
        ])),
        top[2],
    );

    let volume = Gauge::default()
        .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Black))
        .ratio(app.volume_percent as f64 / 100.0)
        .label(format!("Volume {}%", app.volume_percent));
    frame.render_widget(volume, rows[1]);
}
