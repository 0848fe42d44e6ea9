//! Error types shared by the library scanner, the playback session and the
//! audio engine.
//!
//! Nothing here is fatal: the runtime turns every `PlayerError` into a status
//! line and keeps going.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures reported by an [`AudioEngine`](crate::playback::AudioEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("seek rejected by engine: {0}")]
    Seek(String),

    #[error("no media loaded")]
    NothingLoaded,

    #[error("{0} is not supported by this engine")]
    Unsupported(&'static str),
}

/// User-facing playback and library errors.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("no audio files found in {}", .0.display())]
    NoAudioFilesFound(PathBuf),

    #[error("failed to load {}: {source}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("failed to seek to {target:?}: {source}")]
    SeekFailure {
        target: Duration,
        #[source]
        source: EngineError,
    },

    #[error("no track at index {0}")]
    NoSuchTrack(usize),

    #[error("duration unknown for {}", .0.display())]
    ProbeFailure(PathBuf),

    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("equalizer: {0}")]
    Equalizer(#[source] EngineError),

    #[error("playback error: {0}")]
    Playback(#[source] EngineError),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
