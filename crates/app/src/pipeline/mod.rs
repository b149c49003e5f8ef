//! Pipelined playback: worker pool and scheduler

mod pool;
mod scheduler;

pub use scheduler::{RunSummary, SchedulerConfig, SessionScheduler};
