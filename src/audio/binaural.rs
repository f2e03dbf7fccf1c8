//! Binaural beat generator.
//!
//! Two pure sine tones, one per ear. The left ear hears the base frequency
//! and the right ear hears base + beat; the listener perceives a beat at the
//! difference.

use super::generator::Generator;
use super::SAMPLE_RATE;
use std::f64::consts::TAU;
use std::ops::RangeInclusive;

/// Supported base (carrier) frequencies in Hz.
pub const BASE_FREQUENCY_RANGE: RangeInclusive<f32> = 100.0..=1000.0;

/// Supported beat frequencies in Hz.
pub const BEAT_FREQUENCY_RANGE: RangeInclusive<f32> = 1.0..=30.0;

/// Base frequency used when nothing else is selected.
pub const DEFAULT_BASE_FREQUENCY: f32 = 220.0;

/// Beat frequency used when nothing else is selected.
pub const DEFAULT_BEAT_FREQUENCY: f32 = 12.0;

/// Base and beat frequency for a binaural session.
///
/// Values are always inside [`BASE_FREQUENCY_RANGE`] and
/// [`BEAT_FREQUENCY_RANGE`]; out-of-range input is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinauralParams {
    base_hz: f32,
    beat_hz: f32,
}

impl BinauralParams {
    /// Creates parameters, clamping both frequencies into range.
    ///
    /// # Arguments
    ///
    /// * `base_hz` - Left ear frequency
    /// * `beat_hz` - Difference between right and left ear frequency
    pub fn new(base_hz: f32, beat_hz: f32) -> Self {
        Self {
            base_hz: clamp_to(base_hz, &BASE_FREQUENCY_RANGE, DEFAULT_BASE_FREQUENCY),
            beat_hz: clamp_to(beat_hz, &BEAT_FREQUENCY_RANGE, DEFAULT_BEAT_FREQUENCY),
        }
    }

    pub fn base_hz(&self) -> f32 {
        self.base_hz
    }

    pub fn beat_hz(&self) -> f32 {
        self.beat_hz
    }

    /// Frequency played in the left ear.
    pub fn left_hz(&self) -> f32 {
        self.base_hz
    }

    /// Frequency played in the right ear.
    pub fn right_hz(&self) -> f32 {
        self.base_hz + self.beat_hz
    }

    /// Returns a copy with the base frequency shifted by `delta` Hz.
    pub fn with_base_offset(self, delta: f32) -> Self {
        Self::new(self.base_hz + delta, self.beat_hz)
    }

    /// Returns a copy with the beat frequency shifted by `delta` Hz.
    pub fn with_beat_offset(self, delta: f32) -> Self {
        Self::new(self.base_hz, self.beat_hz + delta)
    }
}

impl Default for BinauralParams {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_FREQUENCY, DEFAULT_BEAT_FREQUENCY)
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// Named beat presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 10 Hz beat over a 200 Hz carrier.
    Alpha,
    /// 6 Hz beat over a 200 Hz carrier.
    Theta,
}

impl Preset {
    pub fn params(self) -> BinauralParams {
        match self {
            Preset::Alpha => BinauralParams::new(200.0, 10.0),
            Preset::Theta => BinauralParams::new(200.0, 6.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::Alpha => "Alpha (10Hz)",
            Preset::Theta => "Theta (6Hz)",
        }
    }
}

/// Stereo sine pair.
///
/// Phase is accumulated per channel and wrapped to `[0, 2π)`, so the output
/// stays exact for arbitrarily long sessions and a retune continues from the
/// current phase instead of jumping.
#[derive(Debug, Clone)]
pub struct Binaural {
    left_hz: f64,
    right_hz: f64,
    left_phase: f64,
    right_phase: f64,
    /// Stereo frames generated so far.
    frame_index: u64,
    sample_rate: f64,
}

impl Binaural {
    pub fn new(params: BinauralParams) -> Self {
        Self {
            left_hz: params.left_hz() as f64,
            right_hz: params.right_hz() as f64,
            left_phase: 0.0,
            right_phase: 0.0,
            frame_index: 0,
            sample_rate: SAMPLE_RATE as f64,
        }
    }

    /// Retunes both channels. Takes effect on the next frame.
    pub fn set_frequencies(&mut self, params: BinauralParams) {
        self.left_hz = params.left_hz() as f64;
        self.right_hz = params.right_hz() as f64;
    }

    pub fn left_hz(&self) -> f64 {
        self.left_hz
    }

    pub fn right_hz(&self) -> f64 {
        self.right_hz
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn advance(phase: f64, hz: f64, sample_rate: f64) -> f64 {
        (phase + TAU * hz / sample_rate).rem_euclid(TAU)
    }
}

impl Generator for Binaural {
    fn channels(&self) -> u16 {
        2
    }

    fn next_frame(&mut self, frame: &mut [f32]) {
        if let [left, right, ..] = frame {
            *left = self.left_phase.sin() as f32;
            *right = self.right_phase.sin() as f32;
        }

        self.left_phase = Self::advance(self.left_phase, self.left_hz, self.sample_rate);
        self.right_phase = Self::advance(self.right_phase, self.right_hz, self.sample_rate);
        self.frame_index = self.frame_index.wrapping_add(1);
    }
}
