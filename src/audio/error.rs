//! Errors reported by the playback core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening or driving an output stream.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The default output device could not be opened.
    #[error("failed to open audio output: {0}")]
    Stream(#[from] rodio::StreamError),

    /// A sink could not be attached to the output stream.
    #[error("failed to start audio playback: {0}")]
    Play(#[from] rodio::PlayError),

    /// The looped sound file exists but could not be decoded.
    #[error("failed to decode sound file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    /// The looped sound file could not be read.
    #[error("failed to read sound file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The looped sound file does not exist.
    #[error("sound file not found: {}", .0.display())]
    MissingSoundFile(PathBuf),
}
