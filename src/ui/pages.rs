//! Per-tab controls.

use crate::app::{App, Tab};
use crate::audio::binaural::{BASE_FREQUENCY_RANGE, BEAT_FREQUENCY_RANGE};
use crate::audio::{AudioOutput, Preset};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Renders the controls of the selected tab.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `area` - The area to render in
/// * `app` - Application state
pub fn render_page<O: AudioOutput>(frame: &mut Frame, area: Rect, app: &App<O>) {
    let block = Block::default()
        .title(format!(" {} ", app.tab.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let lines = match app.tab {
        Tab::Binaural => binaural_lines(app),
        Tab::BrownNoise => vec![
            Line::from("Low, rumbling noise with energy concentrated in the bass."),
            Line::from(""),
            hint("[Enter]", " Play brown noise"),
        ],
        Tab::WhiteNoise => vec![
            Line::from("Flat, hissing noise with equal energy at every frequency."),
            Line::from(""),
            hint("[Enter]", " Play white noise"),
        ],
        Tab::SoundFile => vec![
            Line::from(vec![
                Span::styled("File: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    app.sound_file.display().to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(""),
            hint("[Enter]", " Loop the sound file"),
        ],
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn binaural_lines<O: AudioOutput>(app: &App<O>) -> Vec<Line<'static>> {
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let checkbox = if app.with_white_noise { "[x]" } else { "[ ]" };

    vec![
        Line::from(vec![
            Span::styled("Base frequency: ", dim),
            Span::styled(format!("{:>6.0} Hz", app.params.base_hz()), value),
            Span::styled(
                format!(
                    "  ({:.0}-{:.0})  [Up/Down]",
                    BASE_FREQUENCY_RANGE.start(),
                    BASE_FREQUENCY_RANGE.end()
                ),
                dim,
            ),
        ]),
        Line::from(vec![
            Span::styled("Beat frequency: ", dim),
            Span::styled(format!("{:>6.0} Hz", app.params.beat_hz()), value),
            Span::styled(
                format!(
                    "  ({:.0}-{:.0})  [Left/Right]",
                    BEAT_FREQUENCY_RANGE.start(),
                    BEAT_FREQUENCY_RANGE.end()
                ),
                dim,
            ),
        ]),
        Line::from(vec![
            Span::styled("Left ear ", dim),
            Span::styled(format!("{:.0} Hz", app.params.left_hz()), value),
            Span::styled("   Right ear ", dim),
            Span::styled(format!("{:.0} Hz", app.params.right_hz()), value),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} ", checkbox), value),
            Span::styled("Play white noise simultaneously  ", Style::default()),
            Span::styled("[w]", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[a]", Style::default().fg(Color::Yellow)),
            Span::styled(format!(" {}   ", Preset::Alpha.label()), dim),
            Span::styled("[t]", Style::default().fg(Color::Yellow)),
            Span::styled(format!(" {}", Preset::Theta.label()), dim),
        ]),
    ]
}

fn hint(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::styled(text, Style::default().fg(Color::DarkGray)),
    ])
}
