//! Playback sink
//!
//! The sink plays one artifact to completion, synchronously from the
//! scheduler's point of view. The production sink shells out to ffplay;
//! any sink failure is fatal to the run.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::artifact::AudioArtifact;
use crate::error::PlaybackError;

/// Audio output interface.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Play the artifact to completion, or fail with a fatal error.
    async fn play(&self, artifact: &AudioArtifact) -> Result<(), PlaybackError>;
}

/// Plays WAV files through an external `ffplay` process.
pub struct FfplaySink {
    player: String,
}

impl FfplaySink {
    pub fn new() -> Self {
        Self {
            player: "ffplay".to_string(),
        }
    }

    pub fn with_player(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }

    /// Check whether the player binary can be executed.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.player)
            .arg("-version")
            .output()
            .await
            .is_ok()
    }
}

impl Default for FfplaySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackSink for FfplaySink {
    async fn play(&self, artifact: &AudioArtifact) -> Result<(), PlaybackError> {
        debug!(
            segment = artifact.segment_index,
            path = %artifact.path.display(),
            "playing artifact"
        );
        let status = Command::new(&self.player)
            .args(["-autoexit", "-nodisp", "-loglevel", "quiet"])
            .arg(&artifact.path)
            .status()
            .await
            .map_err(|source| PlaybackError::Spawn {
                player: self.player.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PlaybackError::PlayerFailed {
                player: self.player.clone(),
                status,
            });
        }
        Ok(())
    }
}
