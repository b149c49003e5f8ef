//! Fixed-size synthesis worker pool
//!
//! Workers pull jobs off a shared bounded queue, perform the backend call,
//! materialize the artifact, and report the terminal result over a
//! completion channel. Only the coordinator touches the queue's sending
//! side and the completion receiver; workers never see scheduler state.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::artifact::{ArtifactStore, AudioArtifact};
use crate::error::PipelineError;
use stillvox_tts::{SynthesisBackend, TtsError};

/// One outstanding request to synthesize a narration segment.
#[derive(Debug, Clone)]
pub(crate) struct SynthesisJob {
    pub segment_index: usize,
    pub text: String,
    pub voice: String,
}

/// Terminal result of one synthesis job.
pub(crate) struct SynthesisOutcome {
    pub segment_index: usize,
    pub result: Result<AudioArtifact, TtsError>,
}

pub(crate) struct WorkerPool {
    job_tx: Option<mpsc::Sender<SynthesisJob>>,
    outcome_rx: mpsc::Receiver<SynthesisOutcome>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` tasks sharing one backend and artifact store.
    ///
    /// `capacity` bounds both channels; the scheduler's look-ahead window
    /// keeps at most `buffer_size` jobs in the system, so a capacity of
    /// `buffer_size` means sends never block.
    pub fn spawn(
        backend: Arc<dyn SynthesisBackend>,
        store: ArtifactStore,
        workers: usize,
        capacity: usize,
    ) -> Self {
        let workers = workers.max(1);
        let capacity = capacity.max(1);
        let (job_tx, job_rx) = mpsc::channel::<SynthesisJob>(capacity);
        let (outcome_tx, outcome_rx) = mpsc::channel::<SynthesisOutcome>(capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let handles = (0..workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&job_rx),
                    Arc::clone(&backend),
                    store.clone(),
                    outcome_tx.clone(),
                ))
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            outcome_rx,
            handles,
        }
    }

    pub async fn submit(&self, job: SynthesisJob) -> Result<(), PipelineError> {
        let tx = self.job_tx.as_ref().ok_or(PipelineError::PoolClosed)?;
        tx.send(job).await.map_err(|_| PipelineError::PoolClosed)
    }

    /// Receive the next completed or failed job. `None` once all workers
    /// have exited.
    pub async fn recv(&mut self) -> Option<SynthesisOutcome> {
        self.outcome_rx.recv().await
    }

    /// Close the job queue; workers exit after draining it.
    pub fn close(&mut self) {
        self.job_tx = None;
    }

    /// Await worker shutdown. Call after `close`.
    pub async fn join(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    job_rx: Arc<Mutex<mpsc::Receiver<SynthesisJob>>>,
    backend: Arc<dyn SynthesisBackend>,
    store: ArtifactStore,
    outcome_tx: mpsc::Sender<SynthesisOutcome>,
) {
    loop {
        // Hold the lock only while waiting for the next job.
        let job = {
            let mut rx = job_rx.lock().await;
            match rx.recv().await {
                Some(job) => job,
                None => break,
            }
        };

        debug!(
            worker = worker_id,
            segment = job.segment_index,
            "synthesis started"
        );
        let result = synthesize_job(backend.as_ref(), &store, &job).await;
        let outcome = SynthesisOutcome {
            segment_index: job.segment_index,
            result,
        };
        if outcome_tx.send(outcome).await.is_err() {
            break;
        }
    }
    debug!(worker = worker_id, "synthesis worker stopped");
}

async fn synthesize_job(
    backend: &dyn SynthesisBackend,
    store: &ArtifactStore,
    job: &SynthesisJob,
) -> Result<AudioArtifact, TtsError> {
    let audio = backend.synthesize(&job.text, &job.voice).await?;
    store.write(job.segment_index, &audio)
}
