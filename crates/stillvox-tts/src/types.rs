//! Core types for speech synthesis

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sample rate of Gemini TTS output (24 kHz mono 16-bit PCM).
pub const GEMINI_SAMPLE_RATE: u32 = 24_000;

/// Synthesis backend configuration.
///
/// Constructed once and passed by reference into the scheduler and its
/// workers; there is no process-wide client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Base URL of the synthesis API.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// API credential.
    pub api_key: String,
    /// Voice used when a segment does not name one.
    pub default_voice: String,
    /// Per-request timeout. `None` waits indefinitely; a hung backend call
    /// then blocks its look-ahead slot until the run ends.
    pub request_timeout: Option<Duration>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-preview-tts".to_string(),
            api_key: String::new(),
            default_voice: "Algieba".to_string(),
            request_timeout: None,
        }
    }
}

/// One synthesized utterance: raw mono 16-bit signed PCM.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    /// Audio length, derived from the PCM byte count.
    pub fn duration(&self) -> Duration {
        let bytes_per_second = self.sample_rate as u64 * self.channels as u64 * 2;
        if bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.pcm.len() as f64 / bytes_per_second as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TtsConfig::default();
        assert_eq!(config.default_voice, "Algieba");
        assert!(config.endpoint.starts_with("https://"));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn audio_duration_from_pcm_length() {
        let audio = AudioData {
            pcm: vec![0; GEMINI_SAMPLE_RATE as usize * 2], // one second, mono 16-bit
            sample_rate: GEMINI_SAMPLE_RATE,
            channels: 1,
        };
        assert_eq!(audio.duration(), Duration::from_secs(1));
    }
}
