//! Application state and user actions.
//!
//! This module holds the front-end state (selected tab, frequency inputs,
//! volume, session timer) and turns user actions into calls on the
//! [`AudioController`].

use crate::audio::{
    AudioController, AudioOutput, BinauralParams, Preset, RodioOutput, SessionKind,
    SessionRequest,
};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Session length selected at startup, in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 15;

/// Selectable session lengths, in minutes.
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=60;

/// Volume slider step, in percent.
pub const VOLUME_STEP: i16 = 5;

/// Base frequency step for the arrow keys, in Hz.
pub const BASE_STEP: f32 = 10.0;

/// Beat frequency step, in Hz.
pub const BEAT_STEP: f32 = 1.0;

/// Sound file looped by the Sound File tab, looked up next to the executable.
pub const SOUND_FILE_NAME: &str = "mri.wav";

/// How long a status message stays visible.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// The selectable pages of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Binaural,
    BrownNoise,
    WhiteNoise,
    SoundFile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Binaural, Tab::BrownNoise, Tab::WhiteNoise, Tab::SoundFile];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Binaural => "Binaural Beats",
            Tab::BrownNoise => "Brown Noise",
            Tab::WhiteNoise => "White Noise",
            Tab::SoundFile => "Sound File",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Counts a session down and reports when it has run its course.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    duration: Duration,
    deadline: Option<Instant>,
}

impl SessionTimer {
    pub fn new(minutes: u32) -> Self {
        let minutes = minutes.clamp(*DURATION_RANGE.start(), *DURATION_RANGE.end());
        Self {
            duration: Duration::from_secs(minutes as u64 * 60),
            deadline: None,
        }
    }

    pub fn minutes(&self) -> u32 {
        (self.duration.as_secs() / 60) as u32
    }

    /// Changes the session length. A running countdown keeps its deadline.
    pub fn set_minutes(&mut self, minutes: u32) {
        let minutes = minutes.clamp(*DURATION_RANGE.start(), *DURATION_RANGE.end());
        self.duration = Duration::from_secs(minutes as u64 * 60);
    }

    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.duration);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left in the running session, or the full length when stopped.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => self.duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.is_running() && self.remaining(now).is_zero()
    }

    /// Remaining time as `mm:ss`.
    pub fn label(&self, now: Instant) -> String {
        format_remaining(self.remaining(now))
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MINUTES)
    }
}

/// Formats a duration as `mm:ss`, rounding partial seconds up so `00:00`
/// only shows once time has run out.
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Finds the looped sound file next to the running executable.
pub fn default_sound_file() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SOUND_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(SOUND_FILE_NAME))
}

/// Main application state.
pub struct App<O: AudioOutput = RodioOutput> {
    /// The playback core.
    pub audio: AudioController<O>,
    /// Currently selected tab.
    pub tab: Tab,
    /// Frequencies entered on the Binaural tab.
    pub params: BinauralParams,
    /// Whether binaural sessions also play white noise.
    pub with_white_noise: bool,
    /// Volume slider position (0-100).
    pub volume_percent: u8,
    /// Session length countdown.
    pub timer: SessionTimer,
    /// File looped by the Sound File tab.
    pub sound_file: PathBuf,
    /// Transient status message and when it was set.
    pub status_message: Option<(String, Instant)>,
    /// Set when the user asks to quit.
    pub should_quit: bool,
}

impl App<RodioOutput> {
    /// Creates the application with the default output device.
    pub fn new() -> Self {
        Self::with_audio(AudioController::new(), default_sound_file())
    }
}

impl Default for App<RodioOutput> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: AudioOutput> App<O> {
    pub fn with_audio(mut audio: AudioController<O>, sound_file: PathBuf) -> Self {
        audio.set_volume(1.0);
        Self {
            audio,
            tab: Tab::Binaural,
            params: BinauralParams::default(),
            with_white_noise: false,
            volume_percent: 100,
            timer: SessionTimer::default(),
            sound_file,
            status_message: None,
            should_quit: false,
        }
    }

    /// Starts playback for the selected tab and arms the session timer.
    pub fn start_selected(&mut self, now: Instant) {
        let result = match self.tab {
            Tab::Binaural => self.audio.start(SessionRequest::Binaural {
                params: self.params,
                with_white_noise: self.with_white_noise,
            }),
            Tab::BrownNoise => self.audio.start_brown_noise(),
            Tab::WhiteNoise => self.audio.start_white_noise(),
            Tab::SoundFile => self.audio.play_looped_file(&self.sound_file),
        };

        match result {
            Ok(()) => {
                self.timer.start(now);
                let label = self
                    .audio
                    .session_kind()
                    .map(SessionKind::describe)
                    .unwrap_or_default();
                self.set_status(format!("Playing: {}", label));
            }
            Err(e) => {
                tracing::error!("Failed to start playback: {}", e);
                self.timer.stop();
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Stops playback and the session timer.
    pub fn stop(&mut self) {
        self.audio.stop();
        self.timer.stop();
        self.set_status("Stopped");
    }

    /// Loads a preset into the Binaural tab and starts it.
    pub fn apply_preset(&mut self, preset: Preset, now: Instant) {
        self.params = preset.params();
        self.tab = Tab::Binaural;
        self.start_selected(now);
    }

    /// Shifts the base frequency, retuning a running binaural session.
    pub fn adjust_base(&mut self, delta: f32) {
        self.params = self.params.with_base_offset(delta);
        self.retune();
    }

    /// Shifts the beat frequency, retuning a running binaural session.
    pub fn adjust_beat(&mut self, delta: f32) {
        self.params = self.params.with_beat_offset(delta);
        self.retune();
    }

    fn retune(&mut self) {
        self.audio
            .set_frequencies(self.params.base_hz(), self.params.beat_hz());
    }

    /// Toggles white noise alongside binaural sessions.
    /// Takes effect at the next start.
    pub fn toggle_white_noise(&mut self) {
        self.with_white_noise = !self.with_white_noise;
        let state = if self.with_white_noise { "on" } else { "off" };
        self.set_status(format!("White noise alongside binaural: {}", state));
    }

    /// Moves the volume slider by `delta` percent.
    pub fn adjust_volume(&mut self, delta: i16) {
        let percent = (self.volume_percent as i16 + delta).clamp(0, 100);
        self.volume_percent = percent as u8;
        self.audio.set_volume(percent as f32 / 100.0);
    }

    /// Changes the session length by `delta` minutes.
    pub fn adjust_duration(&mut self, delta: i32) {
        let minutes = (self.timer.minutes() as i32 + delta).max(0) as u32;
        self.timer.set_minutes(minutes);
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
    }

    /// Advances time-based state: ends the session when the timer runs out
    /// and clears stale status messages.
    pub fn tick(&mut self, now: Instant) {
        self.clear_expired_status(now);
        if self.timer.is_expired(now) {
            self.audio.stop();
            self.timer.stop();
            self.set_status("Session complete");
        }
    }

    /// Sets a status message to display temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clears expired status messages.
    pub fn clear_expired_status(&mut self, now: Instant) {
        if let Some((_, time)) = &self.status_message {
            if now.saturating_duration_since(*time) > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(m, _)| m.as_str())
    }
}
