//! Text-to-speech backend abstraction for Stillvox
//!
//! This crate provides the foundational types for speech synthesis: the
//! backend trait, configuration, audio data, and errors. Concrete backends
//! (the Gemini REST client) live in sibling crates.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod error;
pub mod types;

pub use error::{TtsError, TtsResult};
pub use types::{AudioData, TtsConfig, GEMINI_SAMPLE_RATE};

/// Generates unique synthesis request IDs
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique synthesis request ID, used for log correlation.
pub fn next_request_id() -> u64 {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Remote speech-synthesis interface.
///
/// Implementations accept text plus a voice identifier and return fully
/// materialized raw PCM audio (mono, 16-bit signed). Backends are shared
/// across worker tasks, so synthesis takes `&self`; failures carry the
/// backend taxonomy in [`TtsError`].
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Backend name/identifier, for logs.
    fn name(&self) -> &str;

    /// Synthesize `text` with the given voice, returning the complete
    /// audio for the utterance.
    async fn synthesize(&self, text: &str, voice: &str) -> TtsResult<AudioData>;
}
