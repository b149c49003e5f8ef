//! Shared test doubles: a scripted synthesis backend and a recording sink.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stillvox_app::artifact::AudioArtifact;
use stillvox_app::error::PlaybackError;
use stillvox_app::playback::PlaybackSink;
use stillvox_tts::{AudioData, SynthesisBackend, TtsError, TtsResult, GEMINI_SAMPLE_RATE};

/// Backend with scripted per-text latencies and failures. Records every
/// call in arrival order so tests can assert call counts and timing.
pub struct MockBackend {
    latencies: HashMap<String, Duration>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            latencies: HashMap::new(),
            failures: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn latency(mut self, text: &str, millis: u64) -> Self {
        self.latencies
            .insert(text.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn fail(mut self, text: &str) -> Self {
        self.failures.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, text: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == text).count()
    }
}

#[async_trait]
impl SynthesisBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn synthesize(&self, text: &str, _voice: &str) -> TtsResult<AudioData> {
        self.calls.lock().unwrap().push(text.to_string());
        let delay = self
            .latencies
            .get(text)
            .copied()
            .unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;
        if self.failures.contains(text) {
            return Err(TtsError::SynthesisFailed(format!(
                "scripted failure for '{}'",
                text
            )));
        }
        Ok(AudioData {
            pcm: vec![0u8; 64],
            sample_rate: GEMINI_SAMPLE_RATE,
            channels: 1,
        })
    }
}

/// Observations shared between a [`RecordingSink`] and the test body.
#[derive(Clone, Default)]
pub struct SinkProbe {
    played: Arc<Mutex<Vec<usize>>>,
    backend_calls_at_play: Arc<Mutex<Vec<usize>>>,
}

impl SinkProbe {
    /// Segment indices in the order they were played.
    pub fn played(&self) -> Vec<usize> {
        self.played.lock().unwrap().clone()
    }

    /// Snapshot of the backend call count taken at each play, in play
    /// order. Used to bound the look-ahead window.
    pub fn backend_calls_at_play(&self) -> Vec<usize> {
        self.backend_calls_at_play.lock().unwrap().clone()
    }
}

/// Sink that records play order instead of producing sound, optionally
/// failing on one segment to exercise fatal playback errors.
pub struct RecordingSink {
    backend: Arc<MockBackend>,
    probe: SinkProbe,
    fail_on: Option<usize>,
}

impl RecordingSink {
    pub fn new(backend: Arc<MockBackend>) -> (Self, SinkProbe) {
        let probe = SinkProbe::default();
        (
            Self {
                backend,
                probe: probe.clone(),
                fail_on: None,
            },
            probe,
        )
    }

    pub fn failing_on(backend: Arc<MockBackend>, segment_index: usize) -> (Self, SinkProbe) {
        let (mut sink, probe) = Self::new(backend);
        sink.fail_on = Some(segment_index);
        (sink, probe)
    }
}

#[async_trait]
impl PlaybackSink for RecordingSink {
    async fn play(&self, artifact: &AudioArtifact) -> Result<(), PlaybackError> {
        if self.fail_on == Some(artifact.segment_index) {
            return Err(PlaybackError::Device(
                "scripted device failure".to_string(),
            ));
        }
        assert!(
            artifact.path.exists(),
            "artifact for segment {} missing on disk",
            artifact.segment_index
        );
        self.probe
            .backend_calls_at_play
            .lock()
            .unwrap()
            .push(self.backend.calls().len());
        self.probe
            .played
            .lock()
            .unwrap()
            .push(artifact.segment_index);
        Ok(())
    }
}
