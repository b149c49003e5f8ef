//! Error types for the playback pipeline

use stillvox_session::SessionError;
use stillvox_tts::TtsError;
use thiserror::Error;

/// Errors that terminate a session run.
///
/// Per-segment synthesis failures are not listed here: they are isolated,
/// reported at harvest time, and the segment is skipped. The `Synthesis`
/// variant only occurs in generate mode, where segments are materialized
/// sequentially and an error aborts generation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Playback failures are fatal to the run.
    #[error("playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("synthesis failed for segment {index}: {source}")]
    Synthesis { index: usize, source: TtsError },

    #[error("synthesis worker pool shut down unexpectedly")]
    PoolClosed,

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output sink errors. Always fatal: a failing audio device is not
/// something the run can narrate around.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("failed to launch audio player '{player}': {source}")]
    Spawn {
        player: String,
        source: std::io::Error,
    },

    #[error("audio player '{player}' exited with {status}")]
    PlayerFailed {
        player: String,
        status: std::process::ExitStatus,
    },

    /// Device-level failure (device unavailable, decode error).
    #[error("playback device error: {0}")]
    Device(String),
}
