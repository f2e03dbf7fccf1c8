//! Signal synthesis and playback.
//!
//! This module generates binaural beats, brown noise, and white noise and
//! plays them via rodio. It provides:
//! - Per-frame signal generators
//! - A buffer engine that fills device buffers from a generator
//! - A session controller with start/stop/volume control

pub mod binaural;
pub mod buffer;
pub mod controller;
pub mod error;
pub mod generator;
pub mod noise;
pub mod output;

/// Sample rate for every generator (44.1 kHz standard).
pub const SAMPLE_RATE: u32 = 44100;

pub use binaural::{Binaural, BinauralParams, Preset};
pub use buffer::{BufferEngine, GeneratorSource, StreamControl, BLOCK_SIZE};
pub use controller::{AudioController, PlaybackState, SessionKind, SessionRequest};
pub use error::AudioError;
pub use generator::{Generator, GeneratorState, SharedGenerator};
pub use noise::{BrownNoise, WhiteNoise};
pub use output::{ActiveStream, AudioOutput, RodioOutput};
