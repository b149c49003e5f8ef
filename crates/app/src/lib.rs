//! Stillvox application library
//!
//! Plays scripted narration sessions: a pipelined scheduler keeps a bounded
//! look-ahead window of segments synthesizing in the background while the
//! current segment is narrated or a hold elapses, so playback never stalls
//! on backend latency.

pub mod artifact;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod playback;

pub use error::{PipelineError, PlaybackError};
pub use pipeline::{RunSummary, SchedulerConfig, SessionScheduler};
