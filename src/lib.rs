//! neurotones - binaural beats and noise generation with real-time playback.
//!
//! This library provides the synthesis and playback core plus the terminal
//! front end that drives it.

pub mod app;
pub mod audio;
pub mod ui;

// Re-export commonly used types
pub use app::{App, SessionTimer, Tab};
pub use audio::{
    AudioController, AudioError, BinauralParams, PlaybackState, Preset, SessionRequest,
    SAMPLE_RATE,
};
