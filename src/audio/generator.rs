//! The generator contract shared by every signal source.
//!
//! A generator produces one frame at a time: two interleaved samples for
//! binaural tones, a single sample for the noise sources. The buffer engine
//! pulls frames until the device buffer is full.

use super::binaural::Binaural;
use super::noise::{BrownNoise, WhiteNoise};
use std::sync::{Arc, Mutex};

/// Largest frame any generator emits.
pub const MAX_CHANNELS: usize = 2;

/// A pull-based source of audio frames.
pub trait Generator {
    /// Number of interleaved samples in each frame.
    fn channels(&self) -> u16;

    /// Writes the next frame into `frame`.
    ///
    /// `frame` holds at least `channels()` slots. Samples are nominally in
    /// `[-1.0, 1.0]`; brown noise may briefly exceed that range.
    fn next_frame(&mut self, frame: &mut [f32]);
}

/// The generator owned by a playback session.
#[derive(Debug, Clone)]
pub enum GeneratorState {
    Binaural(Binaural),
    BrownNoise(BrownNoise),
    WhiteNoise(WhiteNoise),
}

impl GeneratorState {
    /// Wraps the state for sharing between the control and device threads.
    pub fn shared(self) -> SharedGenerator {
        Arc::new(Mutex::new(self))
    }
}

impl Generator for GeneratorState {
    fn channels(&self) -> u16 {
        match self {
            GeneratorState::Binaural(g) => g.channels(),
            GeneratorState::BrownNoise(g) => g.channels(),
            GeneratorState::WhiteNoise(g) => g.channels(),
        }
    }

    fn next_frame(&mut self, frame: &mut [f32]) {
        match self {
            GeneratorState::Binaural(g) => g.next_frame(frame),
            GeneratorState::BrownNoise(g) => g.next_frame(frame),
            GeneratorState::WhiteNoise(g) => g.next_frame(frame),
        }
    }
}

impl From<Binaural> for GeneratorState {
    fn from(g: Binaural) -> Self {
        GeneratorState::Binaural(g)
    }
}

impl From<BrownNoise> for GeneratorState {
    fn from(g: BrownNoise) -> Self {
        GeneratorState::BrownNoise(g)
    }
}

impl From<WhiteNoise> for GeneratorState {
    fn from(g: WhiteNoise) -> Self {
        GeneratorState::WhiteNoise(g)
    }
}

/// Generator state shared with the audio thread.
pub type SharedGenerator = Arc<Mutex<GeneratorState>>;
