//! Error types for session parsing

use thiserror::Error;

/// Session parsing errors. These surface before any synthesis or playback
/// begins; malformed durations are not an error (they degrade to a
/// zero-length hold).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Input is not an ordered list of statement records.
    #[error("malformed session input: {0}")]
    Malformed(String),
}
