//! Timer + continuation queue that drives pipeline runs.

use crate::domain::schedule::{PipelineStep, RunId, ScheduledStep};
use std::time::Duration;

pub trait SchedulerPort {
    /// Time since the scheduler's epoch.
    fn now(&self) -> Duration;

    /// Queue `step` for `run`, due `delay` from now.
    fn schedule(&mut self, run: RunId, step: PipelineStep, delay: Duration) -> ScheduledStep;

    /// Remove and return the earliest continuation once it is due. Steps
    /// due at the same instant come out in the order they were queued.
    fn next_due(&mut self) -> Option<ScheduledStep>;

    fn pending(&self) -> usize;
}
