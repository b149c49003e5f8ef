//! Pre-generated session support
//!
//! Generate mode synthesizes every narration up front into an output
//! directory and writes a `segments.json` manifest; play mode replays such
//! a directory later with no backend at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifact::{ArtifactStore, AudioArtifact};
use crate::error::PipelineError;
use crate::playback::PlaybackSink;
use stillvox_session::{Segment, Session};
use stillvox_tts::SynthesisBackend;

pub const MANIFEST_FILE: &str = "segments.json";

/// One manifest entry. Audio paths are file names relative to the
/// manifest's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManifestSegment {
    Narration { audio: PathBuf },
    Hold { seconds: f64 },
}

/// Synthesize every narration of `session` into `out_dir`, sequentially,
/// and write the manifest. Unlike the pipelined run, a synthesis failure
/// here aborts generation.
pub async fn generate_session_audio(
    session: &Session,
    backend: &dyn SynthesisBackend,
    out_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(out_dir)?;
    let store = ArtifactStore::persistent(out_dir.to_path_buf());

    let mut entries = Vec::with_capacity(session.len());
    for segment in session.segments() {
        match segment {
            Segment::Narration { index, text, voice } => {
                info!(segment = index, "generating audio");
                let audio = backend
                    .synthesize(text, voice)
                    .await
                    .map_err(|source| PipelineError::Synthesis {
                        index: *index,
                        source,
                    })?;
                let artifact = store
                    .write(*index, &audio)
                    .map_err(|source| PipelineError::Synthesis {
                        index: *index,
                        source,
                    })?;
                entries.push(ManifestSegment::Narration {
                    audio: PathBuf::from(ArtifactStore::segment_file_name(
                        artifact.segment_index,
                    )),
                });
            }
            Segment::Hold { seconds, .. } => {
                entries.push(ManifestSegment::Hold { seconds: *seconds });
            }
        }
    }

    let manifest_path = out_dir.join(MANIFEST_FILE);
    let file = std::fs::File::create(&manifest_path)?;
    serde_json::to_writer_pretty(file, &entries)
        .map_err(|e| PipelineError::Manifest(e.to_string()))?;
    info!(
        manifest = %manifest_path.display(),
        segments = entries.len(),
        "session audio generated"
    );
    Ok(manifest_path)
}

/// Load a previously generated manifest.
pub fn read_manifest(dir: &Path) -> Result<Vec<ManifestSegment>, PipelineError> {
    let path = dir.join(MANIFEST_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        PipelineError::Manifest(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| PipelineError::Manifest(e.to_string()))
}

/// Replay a pre-generated session directory in order, honoring holds.
/// Persisted artifacts are never deleted after playback.
pub async fn play_session_audio(
    dir: &Path,
    sink: &dyn PlaybackSink,
) -> Result<(), PipelineError> {
    let entries = read_manifest(dir)?;
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            ManifestSegment::Narration { audio } => {
                info!(segment = index, "playing {}", audio.display());
                let artifact = AudioArtifact::for_existing(index, dir.join(audio));
                sink.play(&artifact).await?;
            }
            ManifestSegment::Hold { seconds } => {
                info!(segment = index, seconds, "holding");
                tokio::time::sleep(std::time::Duration::from_secs_f64(seconds.max(0.0))).await;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips_through_json() {
        let entries = vec![
            ManifestSegment::Narration {
                audio: PathBuf::from("segment_000.wav"),
            },
            ManifestSegment::Hold { seconds: 30.0 },
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        serde_json::to_writer(std::fs::File::create(&path).unwrap(), &entries).unwrap();

        let loaded = read_manifest(dir.path()).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn missing_manifest_is_a_manifest_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_manifest(dir.path()),
            Err(PipelineError::Manifest(_))
        ));
    }

    #[test]
    fn manifest_json_shape() {
        let entry = ManifestSegment::Hold { seconds: 5.0 };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "hold");
        assert_eq!(value["seconds"], 5.0);
    }
}
