//! Scheduler driven by a virtual clock.
//!
//! `next_due` jumps the clock straight to the earliest pending step, so a
//! whole pipeline run completes instantly and deterministically.

use crate::domain::schedule::{PipelineStep, RunId, ScheduledStep};
use crate::ports::scheduler_port::SchedulerPort;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    step: ScheduledStep,
    seq: u64,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.step.due, self.seq).cmp(&(other.step.due, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without firing anything.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Earliest pending step, if any, without removing it.
    pub fn peek(&self) -> Option<ScheduledStep> {
        self.queue.peek().map(|Reverse(entry)| entry.step)
    }
}

impl SchedulerPort for VirtualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, run: RunId, step: PipelineStep, delay: Duration) -> ScheduledStep {
        let scheduled = ScheduledStep {
            run,
            step,
            due: self.now + delay,
        };
        self.seq += 1;
        self.queue.push(Reverse(Entry {
            step: scheduled,
            seq: self.seq,
        }));
        scheduled
    }

    fn next_due(&mut self) -> Option<ScheduledStep> {
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.step.due);
        Some(entry.step)
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
