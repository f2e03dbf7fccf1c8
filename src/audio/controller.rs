//! Audio session controller.
//!
//! Owns at most one playback session. Every start tears the previous session
//! down completely before the new generator and stream are built, so two
//! sessions never play at once.

use super::binaural::{Binaural, BinauralParams};
use super::buffer::{GeneratorSource, StreamControl};
use super::error::AudioError;
use super::generator::{GeneratorState, SharedGenerator};
use super::noise::{BrownNoise, WhiteNoise};
use super::output::{ActiveStream, AudioOutput, RodioOutput};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Volume applied to the first session.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Represents the current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session is open.
    Idle,
    /// A session is playing.
    Playing,
}

/// What to play when a session starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionRequest {
    /// Binaural tones, optionally with a white-noise bed on its own stream.
    Binaural {
        params: BinauralParams,
        with_white_noise: bool,
    },
    BrownNoise,
    WhiteNoise,
}

/// What the current session is playing.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionKind {
    Binaural {
        params: BinauralParams,
        with_white_noise: bool,
    },
    BrownNoise,
    WhiteNoise,
    SoundFile(PathBuf),
}

impl SessionKind {
    /// Short label for display.
    pub fn describe(&self) -> String {
        match self {
            SessionKind::Binaural {
                params,
                with_white_noise,
            } => {
                let noise = if *with_white_noise { " + white noise" } else { "" };
                format!(
                    "Binaural {:.0} Hz / {:.0} Hz{}",
                    params.left_hz(),
                    params.right_hz(),
                    noise
                )
            }
            SessionKind::BrownNoise => "Brown noise".to_string(),
            SessionKind::WhiteNoise => "White noise".to_string(),
            SessionKind::SoundFile(path) => format!("Looping {}", path.display()),
        }
    }
}

/// One open device stream and the control shared with its source.
struct OpenStream {
    control: StreamControl,
    handle: Box<dyn ActiveStream>,
}

/// The streams and generator of one start() call.
///
/// Dropping a session closes every stream it owns.
struct PlaybackSession {
    kind: SessionKind,
    /// The primary generator, kept for in-place retuning.
    generator: Option<SharedGenerator>,
    streams: Vec<OpenStream>,
}

impl PlaybackSession {
    fn new(kind: SessionKind, generator: Option<SharedGenerator>) -> Self {
        Self {
            kind,
            generator,
            streams: Vec::new(),
        }
    }

    fn set_volume(&self, volume: f32) {
        for stream in &self.streams {
            stream.control.set_volume(volume);
        }
    }

    /// Stops every stream. Device errors are logged and otherwise ignored.
    fn close(&mut self) {
        for stream in self.streams.drain(..) {
            stream.control.stop();
            if let Err(e) = stream.handle.stop() {
                warn!("Error while stopping audio stream: {}", e);
            }
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Starts, stops, and adjusts playback sessions.
///
/// The volume lives here rather than on the session, so it carries over
/// from one session to the next.
pub struct AudioController<O: AudioOutput = RodioOutput> {
    output: O,
    session: Option<PlaybackSession>,
    volume: f32,
}

impl AudioController<RodioOutput> {
    /// Creates a controller that plays through the default output device.
    pub fn new() -> Self {
        Self::with_output(RodioOutput)
    }
}

impl Default for AudioController<RodioOutput> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: AudioOutput> AudioController<O> {
    pub fn with_output(output: O) -> Self {
        Self {
            output,
            session: None,
            volume: DEFAULT_VOLUME,
        }
    }

    /// Stops any running session and starts a new one.
    ///
    /// # Errors
    ///
    /// Returns error if an output stream cannot be opened. The controller
    /// is left idle with no stream open.
    pub fn start(&mut self, request: SessionRequest) -> Result<(), AudioError> {
        self.stop();

        let session = self.open_session(request)?;
        info!(
            "Started {} at volume {:.2}",
            session.kind.describe(),
            self.volume
        );
        self.session = Some(session);
        Ok(())
    }

    /// Starts binaural tones at `base_hz` (left) and `base_hz + beat_hz`
    /// (right), both clamped to their supported ranges.
    pub fn start_binaural(
        &mut self,
        base_hz: f32,
        beat_hz: f32,
        with_white_noise: bool,
    ) -> Result<(), AudioError> {
        self.start(SessionRequest::Binaural {
            params: BinauralParams::new(base_hz, beat_hz),
            with_white_noise,
        })
    }

    pub fn start_brown_noise(&mut self) -> Result<(), AudioError> {
        self.start(SessionRequest::BrownNoise)
    }

    pub fn start_white_noise(&mut self) -> Result<(), AudioError> {
        self.start(SessionRequest::WhiteNoise)
    }

    /// Stops any running session and loops the sound file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::MissingSoundFile`] if the file does not exist,
    /// or a device/decode error if it cannot be played.
    pub fn play_looped_file(&mut self, path: impl AsRef<Path>) -> Result<(), AudioError> {
        let path = path.as_ref();
        self.stop();

        if !path.is_file() {
            return Err(AudioError::MissingSoundFile(path.to_path_buf()));
        }

        let control = StreamControl::new(self.volume);
        let handle = self.output.open_looped_file(path, control.clone())?;
        let mut session = PlaybackSession::new(SessionKind::SoundFile(path.to_path_buf()), None);
        session.streams.push(OpenStream { control, handle });

        info!("Started {}", session.kind.describe());
        self.session = Some(session);
        Ok(())
    }

    /// Stops and releases the current session. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
            info!("Stopped {}", session.kind.describe());
        }
    }

    /// Sets the output volume, clamped to `[0.0, 1.0]`.
    ///
    /// Applies to the running session immediately and to every later one.
    pub fn set_volume(&mut self, level: f32) {
        self.volume = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        };
        if let Some(session) = &self.session {
            session.set_volume(self.volume);
        }
        debug!("Volume set to {:.2}", self.volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Retunes a running binaural session without restarting it.
    ///
    /// Returns false if no binaural session is playing.
    pub fn set_frequencies(&mut self, base_hz: f32, beat_hz: f32) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let SessionKind::Binaural { params, .. } = &mut session.kind else {
            return false;
        };
        let Some(generator) = &session.generator else {
            return false;
        };

        let new_params = BinauralParams::new(base_hz, beat_hz);
        match generator.lock() {
            Ok(mut state) => {
                if let GeneratorState::Binaural(binaural) = &mut *state {
                    binaural.set_frequencies(new_params);
                }
            }
            Err(_) => return false,
        }
        *params = new_params;
        debug!(
            "Retuned to {:.0} Hz / {:.0} Hz",
            new_params.left_hz(),
            new_params.right_hz()
        );
        true
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.session.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state() == PlaybackState::Playing
    }

    /// What the current session is playing, if anything.
    pub fn session_kind(&self) -> Option<&SessionKind> {
        self.session.as_ref().map(|s| &s.kind)
    }

    /// Number of device streams the current session holds.
    pub fn active_streams(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.streams.len())
    }

    fn open_session(&self, request: SessionRequest) -> Result<PlaybackSession, AudioError> {
        let (kind, primary): (SessionKind, GeneratorState) = match request {
            SessionRequest::Binaural {
                params,
                with_white_noise,
            } => (
                SessionKind::Binaural {
                    params,
                    with_white_noise,
                },
                Binaural::new(params).into(),
            ),
            SessionRequest::BrownNoise => (SessionKind::BrownNoise, BrownNoise::new().into()),
            SessionRequest::WhiteNoise => (SessionKind::WhiteNoise, WhiteNoise::new().into()),
        };

        let generator = primary.shared();
        let mut session = PlaybackSession::new(kind, Some(generator.clone()));
        session.streams.push(self.open_stream(generator)?);

        if let SessionRequest::Binaural {
            with_white_noise: true,
            ..
        } = request
        {
            // On failure the session drops here and closes the primary stream.
            let noise = GeneratorState::from(WhiteNoise::new()).shared();
            session.streams.push(self.open_stream(noise)?);
        }

        Ok(session)
    }

    fn open_stream(&self, generator: SharedGenerator) -> Result<OpenStream, AudioError> {
        let control = StreamControl::new(self.volume);
        let source = GeneratorSource::new(generator, control.clone());
        let handle = self.output.open(source)?;
        Ok(OpenStream { control, handle })
    }
}

impl<O: AudioOutput> Drop for AudioController<O> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::headless::HeadlessOutput;
    use crate::audio::{BLOCK_SIZE, SAMPLE_RATE};
    use rodio::Source;
    use std::f64::consts::TAU;

    fn controller() -> (AudioController<HeadlessOutput>, HeadlessOutput) {
        let output = HeadlessOutput::default();
        (AudioController::with_output(output.clone()), output)
    }

    #[test]
    fn test_starts_idle() {
        let (audio, output) = controller();
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(audio.volume(), DEFAULT_VOLUME);
        assert_eq!(output.open_streams(), 0);
    }

    #[test]
    fn test_start_opens_one_stream() {
        let (mut audio, output) = controller();
        audio.start_brown_noise().unwrap();

        assert_eq!(audio.playback_state(), PlaybackState::Playing);
        assert_eq!(audio.session_kind(), Some(&SessionKind::BrownNoise));
        assert_eq!(output.open_streams(), 1);
    }

    #[test]
    fn test_stop_twice_is_idle() {
        let (mut audio, output) = controller();
        audio.start_white_noise().unwrap();

        audio.stop();
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        audio.stop();
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(output.open_streams(), 0);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (mut audio, output) = controller();
        audio.stop();
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(output.state.borrow().opened_total, 0);
    }

    #[test]
    fn test_restart_replaces_session() {
        let (mut audio, output) = controller();
        audio.start_binaural(200.0, 10.0, false).unwrap();
        audio.start_brown_noise().unwrap();
        audio.start_white_noise().unwrap();
        audio.start_binaural(300.0, 6.0, false).unwrap();

        assert_eq!(output.open_streams(), 1);
        assert_eq!(audio.active_streams(), 1);
        assert_eq!(output.state.borrow().opened_total, 4);
    }

    #[test]
    fn test_replaced_source_stops_producing() {
        let (mut audio, output) = controller();
        audio.start_white_noise().unwrap();
        audio.start_brown_noise().unwrap();

        let mut state = output.state.borrow_mut();
        let old = &mut state.sources[0];
        assert!(old.control().is_stopped());
        assert_eq!(old.next(), None);
        assert!(!state.sources[1].control().is_stopped());
    }

    #[test]
    fn test_binaural_with_white_noise_opens_two_streams() {
        let (mut audio, output) = controller();
        audio.start_binaural(200.0, 10.0, true).unwrap();

        assert_eq!(output.open_streams(), 2);
        assert_eq!(audio.active_streams(), 2);
        {
            let state = output.state.borrow();
            assert_eq!(state.sources[0].channels(), 2);
            assert_eq!(state.sources[1].channels(), 1);
        }

        audio.stop();
        assert_eq!(output.open_streams(), 0);
    }

    #[test]
    fn test_binaural_output_frequencies() {
        let (mut audio, output) = controller();
        audio.start_binaural(200.0, 10.0, false).unwrap();

        let samples = output.pull_latest(2 * 1000);
        for (n, frame) in samples.chunks(2).enumerate() {
            let t = n as f64 / SAMPLE_RATE as f64;
            assert!((frame[0] as f64 - (TAU * 200.0 * t).sin()).abs() < 1e-4);
            assert!((frame[1] as f64 - (TAU * 210.0 * t).sin()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_failed_start_leaves_idle() {
        let (mut audio, output) = controller();
        output.state.borrow_mut().fail_open_after = Some(0);

        assert!(audio.start_brown_noise().is_err());
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(output.open_streams(), 0);
    }

    #[test]
    fn test_failed_companion_stream_closes_primary() {
        let (mut audio, output) = controller();
        output.state.borrow_mut().fail_open_after = Some(1);

        assert!(audio.start_binaural(200.0, 10.0, true).is_err());
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(output.open_streams(), 0);
        assert!(output.state.borrow().sources[0].control().is_stopped());
    }

    #[test]
    fn test_stop_swallows_device_errors() {
        let (mut audio, output) = controller();
        audio.start_white_noise().unwrap();
        output.state.borrow_mut().fail_stop = true;

        audio.stop();
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(output.open_streams(), 0);
    }

    #[test]
    fn test_volume_clamped() {
        let (mut audio, _output) = controller();
        audio.set_volume(1.5);
        assert_eq!(audio.volume(), 1.0);
        audio.set_volume(-0.2);
        assert_eq!(audio.volume(), 0.0);
        audio.set_volume(f32::NAN);
        assert_eq!(audio.volume(), 0.0);
    }

    #[test]
    fn test_volume_survives_restart() {
        let (mut audio, output) = controller();
        audio.set_volume(0.3);
        audio.start_white_noise().unwrap();
        audio.stop();
        audio.start_brown_noise().unwrap();

        assert_eq!(audio.volume(), 0.3);
        let state = output.state.borrow();
        assert_eq!(state.sources[1].control().volume(), 0.3);
    }

    #[test]
    fn test_set_volume_while_playing_scales_samples() {
        let (mut audio, output) = controller();
        audio.start_binaural(200.0, 10.0, false).unwrap();

        // Drain the first block at full volume.
        let full = output.pull_latest(BLOCK_SIZE);
        audio.set_volume(0.5);
        let half = output.pull_latest(BLOCK_SIZE);

        // The waveform continues; only its amplitude changes.
        let frames = BLOCK_SIZE / 2;
        for (i, frame) in half.chunks(2).enumerate() {
            let t = (frames + i) as f64 / SAMPLE_RATE as f64;
            assert!((frame[0] as f64 - 0.5 * (TAU * 200.0 * t).sin()).abs() < 1e-4);
            assert!((frame[1] as f64 - 0.5 * (TAU * 210.0 * t).sin()).abs() < 1e-4);
        }
        assert!(full.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn test_set_frequencies_retunes_running_session() {
        let (mut audio, _output) = controller();
        assert!(!audio.set_frequencies(300.0, 5.0));

        audio.start_binaural(200.0, 10.0, false).unwrap();
        assert!(audio.set_frequencies(300.0, 5.0));
        assert_eq!(
            audio.session_kind(),
            Some(&SessionKind::Binaural {
                params: BinauralParams::new(300.0, 5.0),
                with_white_noise: false,
            })
        );

        audio.start_brown_noise().unwrap();
        assert!(!audio.set_frequencies(300.0, 5.0));
    }

    #[test]
    fn test_missing_sound_file_reported() {
        let (mut audio, output) = controller();
        audio.start_white_noise().unwrap();

        let err = audio
            .play_looped_file("/definitely/not/here/mri.wav")
            .unwrap_err();
        assert!(matches!(err, AudioError::MissingSoundFile(_)));
        assert!(err.to_string().contains("mri.wav"));
        assert_eq!(audio.playback_state(), PlaybackState::Idle);
        assert_eq!(output.open_streams(), 0);
    }

    #[test]
    fn test_looped_file_is_a_session() {
        let (mut audio, output) = controller();
        let path = std::env::temp_dir().join("neurotones_loop_test.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        audio.play_looped_file(&path).unwrap();
        assert_eq!(audio.session_kind(), Some(&SessionKind::SoundFile(path.clone())));
        assert_eq!(output.state.borrow().files, vec![path.clone()]);

        audio.stop();
        assert_eq!(output.open_streams(), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_drop_closes_streams() {
        let output = HeadlessOutput::default();
        {
            let mut audio = AudioController::with_output(output.clone());
            audio.start_binaural(220.0, 12.0, true).unwrap();
            assert_eq!(output.open_streams(), 2);
        }
        assert_eq!(output.open_streams(), 0);
    }
}
