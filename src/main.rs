//! neurotones - binaural beats and noise in the terminal.
//!
//! Plays binaural tones, brown noise, white noise, or a looped sound file,
//! with a volume slider and a session timer that stops playback when it runs
//! out.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! RUST_LOG=neurotones=debug cargo run 2> neurotones.log
//! ```

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use neurotones::app::{App, BASE_STEP, BEAT_STEP, VOLUME_STEP};
use neurotones::audio::Preset;
use neurotones::ui;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

/// Prints usage and exits if `--help` was passed; rejects anything else.
fn handle_args() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("neurotones");

    match args.get(1).map(String::as_str) {
        None => {}
        Some("--help") | Some("-h") => {
            eprintln!("neurotones - binaural beats and noise player");
            eprintln!();
            eprintln!("Usage: {}", program);
            eprintln!();
            eprintln!("Set RUST_LOG to enable logging to stderr.");
            std::process::exit(0);
        }
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    }
}

/// Main entry point.
fn main() -> Result<()> {
    handle_args();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;
    let mut app = App::new();

    let result = run_app(&mut terminal, &mut app);

    app.audio.stop();
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    result
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll with a short timeout so the countdown keeps moving
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code);
                }
            }
        }
    }
    Ok(())
}

/// Dispatches a key press to the matching app action.
fn handle_key(app: &mut App, code: KeyCode) {
    let now = Instant::now();
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.prev_tab(),
        KeyCode::Enter | KeyCode::Char(' ') => app.start_selected(now),
        KeyCode::Char('s') => app.stop(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_volume(VOLUME_STEP),
        KeyCode::Char('-') => app.adjust_volume(-VOLUME_STEP),
        KeyCode::Char('d') => app.adjust_duration(-1),
        KeyCode::Char('D') => app.adjust_duration(1),
        KeyCode::Char('w') => app.toggle_white_noise(),
        KeyCode::Char('a') => app.apply_preset(Preset::Alpha, now),
        KeyCode::Char('t') => app.apply_preset(Preset::Theta, now),
        KeyCode::Up => app.adjust_base(BASE_STEP),
        KeyCode::Down => app.adjust_base(-BASE_STEP),
        KeyCode::Right => app.adjust_beat(BEAT_STEP),
        KeyCode::Left => app.adjust_beat(-BEAT_STEP),
        _ => {}
    }
}
