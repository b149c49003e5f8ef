//! Pipelined playback scheduler
//!
//! Walks the session's segments exactly once, in index order, producing the
//! real-time narration/hold timeline while keeping a bounded number of
//! upcoming narrations pre-synthesized. Completion order is whatever the
//! network gives us; playback order is strictly segment order, enforced by
//! a results map keyed by segment index that only the coordinator touches.
//!
//! A run moves through priming (the first `buffer_size` narrations are
//! submitted before any playback), streaming (play/hold each segment while
//! harvesting completions and topping the window up), and draining (close
//! the job queue, join the workers).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactStore, AudioArtifact};
use crate::error::PipelineError;
use crate::pipeline::pool::{SynthesisJob, SynthesisOutcome, WorkerPool};
use crate::playback::PlaybackSink;
use stillvox_session::{Segment, Session};
use stillvox_tts::SynthesisBackend;

/// Scheduler tuning. The look-ahead window and the worker count are
/// deliberately independent knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Max narrations in flight or completed-but-unplayed ahead of the
    /// current playback position.
    pub buffer_size: usize,
    /// Fixed synthesis worker count.
    pub worker_count: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            buffer_size: 2,
            worker_count: 3,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    /// Narration segments played.
    pub narrated: usize,
    /// Narration segments skipped because their synthesis failed.
    pub skipped: usize,
}

/// Drives one session run. Owns the session, the worker pool, and the
/// playback sink for the duration of the run.
pub struct SessionScheduler {
    segments: Vec<Segment>,
    /// Synthesis jobs in narration order; `next_to_submit`/`consumed` are
    /// ordinals into this list.
    jobs: Vec<SynthesisJob>,
    pool: WorkerPool,
    sink: Box<dyn PlaybackSink>,
    buffer_size: usize,
    /// Completed results keyed by segment index; `None` marks a failed
    /// synthesis whose segment will be skipped.
    results: HashMap<usize, Option<AudioArtifact>>,
    next_to_submit: usize,
    consumed: usize,
    summary: RunSummary,
}

impl SessionScheduler {
    pub fn new(
        session: Session,
        backend: Arc<dyn SynthesisBackend>,
        sink: Box<dyn PlaybackSink>,
        store: ArtifactStore,
        config: SchedulerConfig,
    ) -> Self {
        let jobs: Vec<SynthesisJob> = session
            .segments()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Narration { index, text, voice } => Some(SynthesisJob {
                    segment_index: *index,
                    text: text.clone(),
                    voice: voice.clone(),
                }),
                Segment::Hold { .. } => None,
            })
            .collect();

        let buffer_size = config.buffer_size.max(1);
        let pool = WorkerPool::spawn(backend, store, config.worker_count, buffer_size);

        Self {
            segments: session.segments().to_vec(),
            jobs,
            pool,
            sink,
            buffer_size,
            results: HashMap::new(),
            next_to_submit: 0,
            consumed: 0,
            summary: RunSummary::default(),
        }
    }

    /// Run the session to completion.
    ///
    /// Synthesis failures are isolated (their segments are skipped);
    /// playback failures abort the run, abandoning submitted-but-unplayed
    /// work without awaiting it.
    pub async fn run(mut self) -> Result<RunSummary, PipelineError> {
        let result = self.stream().await;
        self.pool.close();
        match result {
            Ok(()) => {
                self.pool.join().await;
                info!(
                    narrated = self.summary.narrated,
                    skipped = self.summary.skipped,
                    "session complete"
                );
                Ok(self.summary)
            }
            Err(e) => Err(e),
        }
    }

    async fn stream(&mut self) -> Result<(), PipelineError> {
        // Priming: the first buffer_size narrations go out before any
        // playback.
        self.top_up().await?;

        for position in 0..self.segments.len() {
            let segment = self.segments[position].clone();
            match segment {
                Segment::Narration { index, text, .. } => {
                    info!(segment = index, "narrating: {}", preview(&text));
                    let artifact = self.await_artifact(index).await?;
                    self.consumed += 1;
                    self.top_up().await?;
                    match artifact {
                        Some(artifact) => {
                            self.sink.play(&artifact).await?;
                            artifact.release();
                            self.summary.narrated += 1;
                        }
                        None => {
                            self.summary.skipped += 1;
                        }
                    }
                }
                Segment::Hold { index, seconds } => {
                    info!(segment = index, seconds, "holding");
                    self.hold(Duration::from_secs_f64(seconds.max(0.0))).await?;
                }
            }
        }
        Ok(())
    }

    /// Block until the outcome for `index` has been harvested, harvesting
    /// every other completion that arrives along the way.
    async fn await_artifact(
        &mut self,
        index: usize,
    ) -> Result<Option<AudioArtifact>, PipelineError> {
        loop {
            if let Some(entry) = self.results.remove(&index) {
                return Ok(entry);
            }
            match self.pool.recv().await {
                Some(outcome) => {
                    self.record(outcome);
                    self.top_up().await?;
                }
                None => return Err(PipelineError::PoolClosed),
            }
        }
    }

    /// Wait out a hold while synthesis keeps making progress: completions
    /// are harvested as they arrive until the deadline elapses.
    async fn hold(&mut self, duration: Duration) -> Result<(), PipelineError> {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                _ = time::sleep_until(deadline) => return Ok(()),
                outcome = self.pool.recv() => match outcome {
                    Some(outcome) => {
                        self.record(outcome);
                        self.top_up().await?;
                    }
                    None => {
                        time::sleep_until(deadline).await;
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Submit narrations until the look-ahead window is full or the
    /// session runs out. Submission order is narration index order; no
    /// segment is ever submitted twice.
    async fn top_up(&mut self) -> Result<(), PipelineError> {
        while self.next_to_submit < self.jobs.len()
            && self.next_to_submit - self.consumed < self.buffer_size
        {
            let job = self.jobs[self.next_to_submit].clone();
            debug!(segment = job.segment_index, "submitting synthesis");
            self.pool.submit(job).await?;
            self.next_to_submit += 1;
        }
        Ok(())
    }

    fn record(&mut self, outcome: SynthesisOutcome) {
        match outcome.result {
            Ok(artifact) => {
                debug!(segment = outcome.segment_index, "synthesis ready");
                self.results.insert(outcome.segment_index, Some(artifact));
            }
            Err(e) => {
                warn!(
                    segment = outcome.segment_index,
                    error = %e,
                    "synthesis failed, segment will be skipped"
                );
                self.results.insert(outcome.segment_index, None);
            }
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 60;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}
