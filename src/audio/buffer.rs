//! Playback buffer engine.
//!
//! Bridges the pull-based [`Generator`] contract to the device's demand for
//! "exactly N samples". [`BufferEngine::fill`] always writes the whole
//! buffer; [`GeneratorSource`] exposes the engine to rodio as an endless
//! [`Source`] that renders one block at a time on the audio thread.

use super::generator::{Generator, GeneratorState, SharedGenerator, MAX_CHANNELS};
use super::SAMPLE_RATE;
use rodio::Source;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Samples rendered per audio-thread block.
/// A multiple of every channel count so blocks hold whole frames.
pub const BLOCK_SIZE: usize = 512;

/// Volume and stop flag for one output stream.
///
/// Shared between the controller, which writes, and the audio thread, which
/// reads. Both values are lock-free.
#[derive(Debug, Clone)]
pub struct StreamControl {
    /// Gain as `f32` bits.
    gain: Arc<AtomicU32>,
    stopped: Arc<AtomicBool>,
}

impl StreamControl {
    pub fn new(volume: f32) -> Self {
        Self {
            gain: Arc::new(AtomicU32::new(volume.to_bits())),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        self.gain.store(volume.to_bits(), Ordering::Relaxed);
    }

    /// Marks the stream as finished. The source ends at its next block.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Fills output buffers from a shared generator.
///
/// A stereo request that ends mid-frame keeps the unused half of the frame
/// for the next request, so left/right interleaving never slips.
pub struct BufferEngine<G: Generator = GeneratorState> {
    generator: Arc<Mutex<G>>,
    control: StreamControl,
    channels: usize,
    frame: [f32; MAX_CHANNELS],
    /// Next unread slot in `frame`; `channels` when the frame is used up.
    cursor: usize,
}

impl<G: Generator> BufferEngine<G> {
    pub fn new(generator: Arc<Mutex<G>>, control: StreamControl) -> Self {
        let channels = match generator.lock() {
            Ok(g) => g.channels() as usize,
            Err(poisoned) => poisoned.into_inner().channels() as usize,
        }
        .clamp(1, MAX_CHANNELS);

        Self {
            generator,
            control,
            channels,
            frame: [0.0; MAX_CHANNELS],
            cursor: channels,
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels as u16
    }

    pub fn control(&self) -> &StreamControl {
        &self.control
    }

    /// Writes exactly `out.len()` samples, scaled by the stream volume.
    ///
    /// Never under-delivers: if the generator lock is poisoned the buffer is
    /// zero-filled, and non-finite samples are replaced with silence.
    pub fn fill(&mut self, out: &mut [f32]) {
        let gain = self.control.volume();
        let mut generator = match self.generator.lock() {
            Ok(g) => g,
            Err(_) => {
                out.fill(0.0);
                return;
            }
        };

        for slot in out.iter_mut() {
            if self.cursor >= self.channels {
                generator.next_frame(&mut self.frame[..self.channels]);
                self.cursor = 0;
            }
            let sample = self.frame[self.cursor];
            self.cursor += 1;
            *slot = if sample.is_finite() { sample * gain } else { 0.0 };
        }
    }
}

/// Endless rodio source backed by a [`BufferEngine`].
///
/// Renders [`BLOCK_SIZE`] samples at a time into a preallocated block and
/// ends once its [`StreamControl`] is stopped.
pub struct GeneratorSource {
    engine: BufferEngine,
    block: Vec<f32>,
    pos: usize,
}

impl GeneratorSource {
    pub fn new(generator: SharedGenerator, control: StreamControl) -> Self {
        Self {
            engine: BufferEngine::new(generator, control),
            block: vec![0.0; BLOCK_SIZE],
            pos: BLOCK_SIZE, // Start at end to trigger first render
        }
    }

    pub fn control(&self) -> &StreamControl {
        self.engine.control()
    }
}

impl Iterator for GeneratorSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.block.len() {
            if self.engine.control().is_stopped() {
                return None;
            }
            self.engine.fill(&mut self.block);
            self.pos = 0;
        }

        let sample = self.block[self.pos];
        self.pos += 1;
        Some(sample)
    }
}

impl Source for GeneratorSource {
    fn current_frame_len(&self) -> Option<usize> {
        None // Continuous stream
    }

    fn channels(&self) -> u16 {
        self.engine.channels()
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None // Infinite stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::binaural::{Binaural, BinauralParams};
    use crate::audio::noise::{BrownNoise, WhiteNoise};

    /// Emits NaN on every other frame.
    struct Flaky(bool);

    impl Generator for Flaky {
        fn channels(&self) -> u16 {
            1
        }

        fn next_frame(&mut self, frame: &mut [f32]) {
            self.0 = !self.0;
            frame[0] = if self.0 { f32::NAN } else { 0.5 };
        }
    }

    fn engine(state: impl Into<GeneratorState>, volume: f32) -> BufferEngine {
        BufferEngine::new(state.into().shared(), StreamControl::new(volume))
    }

    #[test]
    fn test_fill_delivers_requested_length() {
        let mut engine = engine(BrownNoise::with_seed(1), 1.0);
        for len in [0, 1, 7, 256, 1000] {
            let mut buf = vec![f32::NAN; len];
            engine.fill(&mut buf);
            assert!(buf.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_stereo_interleaving() {
        let params = BinauralParams::new(200.0, 10.0);
        let mut reference = Binaural::new(params);
        let mut engine = engine(Binaural::new(params), 1.0);

        let mut buf = vec![0.0f32; 64];
        engine.fill(&mut buf);

        let mut frame = [0.0f32; 2];
        for pair in buf.chunks(2) {
            reference.next_frame(&mut frame);
            assert_eq!(pair, &frame[..]);
        }
    }

    #[test]
    fn test_odd_requests_keep_frame_alignment() {
        let params = BinauralParams::new(300.0, 5.0);
        let mut whole = engine(Binaural::new(params), 1.0);
        let mut split = engine(Binaural::new(params), 1.0);

        let mut expected = vec![0.0f32; 30];
        whole.fill(&mut expected);

        let mut actual = Vec::new();
        for len in [3, 5, 1, 9, 12] {
            let mut buf = vec![0.0f32; len];
            split.fill(&mut buf);
            actual.extend_from_slice(&buf);
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_mono_one_sample_per_slot() {
        let mut reference = WhiteNoise::with_seed(4);
        let mut engine = engine(WhiteNoise::with_seed(4), 1.0);

        let mut buf = vec![0.0f32; 100];
        engine.fill(&mut buf);
        for sample in buf {
            assert_eq!(sample, reference.next_sample());
        }
    }

    #[test]
    fn test_volume_scales_samples() {
        let mut full = engine(BrownNoise::with_seed(8), 1.0);
        let mut half = engine(BrownNoise::with_seed(8), 1.0);
        half.control().set_volume(0.5);

        let mut a = vec![0.0f32; 500];
        let mut b = vec![0.0f32; 500];
        full.fill(&mut a);
        half.fill(&mut b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x * 0.5, *y);
        }
    }

    #[test]
    fn test_generator_state_persists_across_fills() {
        let mut reference = BrownNoise::with_seed(21);
        let mut engine = engine(BrownNoise::with_seed(21), 1.0);

        for _ in 0..4 {
            let mut buf = vec![0.0f32; 33];
            engine.fill(&mut buf);
            for sample in buf {
                assert_eq!(sample, reference.next_sample());
            }
        }
    }

    #[test]
    fn test_non_finite_samples_become_silence() {
        let mut engine =
            BufferEngine::new(Arc::new(Mutex::new(Flaky(false))), StreamControl::new(1.0));
        let mut buf = vec![1.0f32; 6];
        engine.fill(&mut buf);
        assert_eq!(buf, vec![0.0, 0.5, 0.0, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_poisoned_generator_zero_fills() {
        let generator: SharedGenerator = GeneratorState::from(WhiteNoise::with_seed(0)).shared();
        let poisoner = Arc::clone(&generator);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the generator lock");
        })
        .join();
        assert!(generator.is_poisoned());

        let mut engine = BufferEngine::new(generator, StreamControl::new(1.0));
        let mut buf = vec![1.0f32; 40];
        engine.fill(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_source_reports_format() {
        let source = GeneratorSource::new(
            GeneratorState::from(Binaural::new(BinauralParams::default())).shared(),
            StreamControl::new(1.0),
        );
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 44100);
        assert_eq!(source.total_duration(), None);

        let source = GeneratorSource::new(
            GeneratorState::from(WhiteNoise::with_seed(1)).shared(),
            StreamControl::new(1.0),
        );
        assert_eq!(source.channels(), 1);
    }

    #[test]
    fn test_source_ends_after_stop() {
        let control = StreamControl::new(1.0);
        let mut source = GeneratorSource::new(
            GeneratorState::from(WhiteNoise::with_seed(1)).shared(),
            control.clone(),
        );

        assert_eq!(source.by_ref().take(BLOCK_SIZE + 10).count(), BLOCK_SIZE + 10);
        control.stop();
        // The block already rendered drains, then the source ends.
        assert_eq!(source.by_ref().count(), BLOCK_SIZE - 10);
        assert_eq!(source.next(), None);
    }
}
