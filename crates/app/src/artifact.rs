//! Audio artifact materialization
//!
//! Workers hand synthesized PCM to an [`ArtifactStore`], which materializes
//! it as a WAV file: either a kept temp file (deleted after playback) or a
//! deterministically named file under an output directory (retained).

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use stillvox_tts::{AudioData, TtsError, TtsResult};
use tracing::{debug, warn};

/// Where segment audio lands on disk.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    out_dir: Option<PathBuf>,
}

impl ArtifactStore {
    /// Temp-file store; artifacts are deleted once played.
    pub fn ephemeral() -> Self {
        Self { out_dir: None }
    }

    /// Persistent store; artifacts are written as `segment_NNN.wav` under
    /// `dir` and retained after playback.
    pub fn persistent(dir: PathBuf) -> Self {
        Self { out_dir: Some(dir) }
    }

    pub fn is_persistent(&self) -> bool {
        self.out_dir.is_some()
    }

    /// Create the output directory if this store persists artifacts.
    pub fn prepare(&self) -> std::io::Result<()> {
        match &self.out_dir {
            Some(dir) => std::fs::create_dir_all(dir),
            None => Ok(()),
        }
    }

    /// File name used for a persisted segment.
    pub fn segment_file_name(segment_index: usize) -> String {
        format!("segment_{:03}.wav", segment_index)
    }

    /// Write one segment's audio, returning the artifact handle.
    pub fn write(&self, segment_index: usize, audio: &AudioData) -> TtsResult<AudioArtifact> {
        let (path, persisted) = match &self.out_dir {
            Some(dir) => (dir.join(Self::segment_file_name(segment_index)), true),
            None => {
                let path = tempfile::Builder::new()
                    .prefix("stillvox-")
                    .suffix(".wav")
                    .tempfile()?
                    .into_temp_path()
                    .keep()
                    .map_err(|e| TtsError::Io(e.error))?;
                (path, false)
            }
        };
        write_wav(&path, audio)?;
        debug!(
            segment = segment_index,
            path = %path.display(),
            bytes = audio.pcm.len(),
            "artifact written"
        );
        Ok(AudioArtifact {
            segment_index,
            path,
            persisted,
        })
    }
}

fn write_wav(path: &Path, audio: &AudioData) -> TtsResult<()> {
    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(path, spec).map_err(|e| TtsError::AudioError(e.to_string()))?;
    for frame in audio.pcm.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([frame[0], frame[1]]))
            .map_err(|e| TtsError::AudioError(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| TtsError::AudioError(e.to_string()))?;
    Ok(())
}

/// A reference to one segment's synthesized audio on disk.
///
/// Produced by a synthesis worker, handed to the scheduler, consumed by the
/// playback step, then released.
#[derive(Debug)]
pub struct AudioArtifact {
    pub segment_index: usize,
    pub path: PathBuf,
    persisted: bool,
}

impl AudioArtifact {
    /// Handle for audio that already exists on disk (play-existing mode);
    /// never deleted on release.
    pub fn for_existing(segment_index: usize, path: PathBuf) -> Self {
        Self {
            segment_index,
            path,
            persisted: true,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Release the artifact after playback: ephemeral files are deleted,
    /// persisted ones retained. The audio has already played, so a failed
    /// delete is reported but does not end the run.
    pub fn release(self) {
        if self.persisted {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                segment = self.segment_index,
                path = %self.path.display(),
                error = %e,
                "failed to delete ephemeral artifact"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stillvox_tts::GEMINI_SAMPLE_RATE;

    fn audio(samples: usize) -> AudioData {
        AudioData {
            pcm: vec![0u8; samples * 2],
            sample_rate: GEMINI_SAMPLE_RATE,
            channels: 1,
        }
    }

    #[test]
    fn ephemeral_artifact_is_deleted_on_release() {
        let artifact = ArtifactStore::ephemeral().write(0, &audio(128)).unwrap();
        assert!(!artifact.is_persisted());
        let path = artifact.path.clone();
        assert!(path.exists());
        artifact.release();
        assert!(!path.exists());
    }

    #[test]
    fn persistent_artifact_uses_deterministic_name_and_survives_release() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::persistent(dir.path().to_path_buf());
        store.prepare().unwrap();
        let artifact = store.write(7, &audio(64)).unwrap();
        assert!(artifact.is_persisted());
        assert_eq!(artifact.path, dir.path().join("segment_007.wav"));
        let path = artifact.path.clone();
        artifact.release();
        assert!(path.exists());
    }

    #[test]
    fn wav_header_matches_backend_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::persistent(dir.path().to_path_buf());
        let artifact = store.write(0, &audio(240)).unwrap();

        let reader = hound::WavReader::open(&artifact.path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, GEMINI_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 240);
    }
}
