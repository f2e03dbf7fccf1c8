//! Output device binding.
//!
//! The controller talks to the device through [`AudioOutput`], so sessions
//! can be driven by rodio in the app and by an in-memory output in tests.
//! Every opened stream gets its own rodio `OutputStream`; dropping it stops
//! the device callback.

use super::buffer::{GeneratorSource, StreamControl};
use super::error::AudioError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Opens output streams on an audio device.
pub trait AudioOutput {
    /// Starts playing `source` on a new stream.
    fn open(&self, source: GeneratorSource) -> Result<Box<dyn ActiveStream>, AudioError>;

    /// Starts looping the sound file at `path` on a new stream.
    fn open_looped_file(
        &self,
        path: &Path,
        control: StreamControl,
    ) -> Result<Box<dyn ActiveStream>, AudioError>;
}

/// A stream that is currently playing.
pub trait ActiveStream {
    /// Halts playback and releases the device stream.
    fn stop(self: Box<Self>) -> Result<(), AudioError>;
}

/// Plays through the system's default output device via rodio.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioOutput;

impl RodioOutput {
    fn play<S>(&self, source: S) -> Result<Box<dyn ActiveStream>, AudioError>
    where
        S: Source<Item = f32> + Send + 'static,
    {
        let (stream, handle) = OutputStream::try_default()?;
        handle.play_raw(source)?;
        Ok(Box::new(RodioStream {
            _handle: handle,
            _stream: stream,
        }))
    }
}

impl AudioOutput for RodioOutput {
    fn open(&self, source: GeneratorSource) -> Result<Box<dyn ActiveStream>, AudioError> {
        self.play(source)
    }

    fn open_looped_file(
        &self,
        path: &Path,
        control: StreamControl,
    ) -> Result<Box<dyn ActiveStream>, AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file))?;
        let looped = decoder.repeat_infinite().convert_samples::<f32>();
        self.play(Controlled::new(looped, control))
    }
}

/// A device stream playing one source.
///
/// The source itself ends once its [`StreamControl`] is stopped; dropping
/// the stream then releases the device.
struct RodioStream {
    _handle: OutputStreamHandle,
    /// Dropping this stops the device callback.
    _stream: OutputStream,
}

impl ActiveStream for RodioStream {
    fn stop(self: Box<Self>) -> Result<(), AudioError> {
        drop(self);
        Ok(())
    }
}

/// Applies a [`StreamControl`] to an arbitrary source.
struct Controlled<S> {
    inner: S,
    control: StreamControl,
}

impl<S> Controlled<S> {
    fn new(inner: S, control: StreamControl) -> Self {
        Self { inner, control }
    }
}

impl<S: Source<Item = f32>> Iterator for Controlled<S> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.control.is_stopped() {
            return None;
        }
        self.inner.next().map(|s| s * self.control.volume())
    }
}

impl<S: Source<Item = f32>> Source for Controlled<S> {
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn test_controlled_applies_volume() {
        let control = StreamControl::new(0.5);
        let source = SamplesBuffer::new(1, 44100, vec![1.0f32, -1.0, 0.5]);
        let samples: Vec<f32> = Controlled::new(source, control).collect();
        assert_eq!(samples, vec![0.5, -0.5, 0.25]);
    }

    #[test]
    fn test_controlled_ends_when_stopped() {
        let control = StreamControl::new(1.0);
        let source = SamplesBuffer::new(2, 44100, vec![0.1f32; 8]);
        let mut controlled = Controlled::new(source, control.clone());

        assert_eq!(controlled.next(), Some(0.1));
        control.stop();
        assert_eq!(controlled.next(), None);
    }

    #[test]
    fn test_controlled_passes_format_through() {
        let source = SamplesBuffer::new(2, 48000, vec![0.0f32; 4]);
        let controlled = Controlled::new(source, StreamControl::new(1.0));
        assert_eq!(controlled.channels(), 2);
        assert_eq!(controlled.sample_rate(), 48000);
    }
}
