//! Terminal user interface components.
//!
//! The screen is a tab bar, the selected tab's controls, the transport panel
//! (playback state, volume, session timer), and a status/help footer.

mod pages;
mod transport;

use crate::app::{App, Tab};
use crate::audio::AudioOutput;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;
use std::time::Instant;

pub use pages::render_page;
pub use transport::render_transport;

/// Renders the whole interface.
pub fn render<O: AudioOutput>(frame: &mut Frame, app: &App<O>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(8),    // Page
            Constraint::Length(5), // Transport
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" Neuro Tones ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .select(app.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    render_page(frame, chunks[1], app);
    render_transport(frame, chunks[2], app, Instant::now());

    let status = app.status().unwrap_or("");
    frame.render_widget(
        Paragraph::new(Span::styled(status, Style::default().fg(Color::White))),
        chunks[3],
    );

    frame.render_widget(Paragraph::new(help_line()), chunks[4]);
}

fn help_line() -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let label = |l: &'static str| Span::styled(l, Style::default().fg(Color::DarkGray));
    Line::from(vec![
        key("[Tab]"),
        label(" Page  "),
        key("[Enter]"),
        label(" Start  "),
        key("[s]"),
        label(" Stop  "),
        key("[+/-]"),
        label(" Volume  "),
        key("[d/D]"),
        label(" Duration  "),
        key("[q]"),
        label(" Quit"),
    ])
}
