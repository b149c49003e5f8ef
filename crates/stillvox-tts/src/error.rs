//! Error types for speech synthesis

use thiserror::Error;

/// Synthesis backend errors.
///
/// A failure for one segment is isolated: the scheduler reports it and
/// skips that segment, the run continues.
#[derive(Error, Debug)]
pub enum TtsError {
    /// Transport-level failure reaching the backend.
    #[error("network error: {0}")]
    Network(String),

    /// Credential rejected (HTTP 401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Quota or rate limit exhausted (HTTP 429).
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Backend accepted the request but synthesis failed.
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Backend response did not carry usable audio.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// Configuration error (missing credential, bad endpoint).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid text input.
    #[error("invalid text input: {0}")]
    InvalidInput(String),

    /// Audio materialization error (encoding the artifact).
    #[error("audio error: {0}")]
    AudioError(String),

    /// IO error writing an artifact.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for synthesis operations.
pub type TtsResult<T> = Result<T, TtsError>;
