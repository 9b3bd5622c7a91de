//! Scheduler paced by the wall clock.
//!
//! Keeps the same queue as [`VirtualScheduler`] but sleeps the calling
//! thread until each step is due.

use crate::adapters::virtual_scheduler::VirtualScheduler;
use crate::domain::schedule::{PipelineStep, RunId, ScheduledStep};
use crate::ports::scheduler_port::SchedulerPort;
use std::time::{Duration, Instant};

pub struct RealtimeScheduler {
    epoch: Instant,
    queue: VirtualScheduler,
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeScheduler {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            queue: VirtualScheduler::new(),
        }
    }

    fn sync_clock(&mut self) {
        let elapsed = self.epoch.elapsed();
        let behind = elapsed.saturating_sub(self.queue.now());
        self.queue.advance(behind);
    }
}

impl SchedulerPort for RealtimeScheduler {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn schedule(&mut self, run: RunId, step: PipelineStep, delay: Duration) -> ScheduledStep {
        self.sync_clock();
        self.queue.schedule(run, step, delay)
    }

    fn next_due(&mut self) -> Option<ScheduledStep> {
        let due = self.queue.peek()?.due;
        let wait = due.saturating_sub(self.epoch.elapsed());
        if !wait.is_zero() {
            log::trace!("sleeping {:?} until next step", wait);
            std::thread::sleep(wait);
        }
        self.sync_clock();
        self.queue.next_due()
    }

    fn pending(&self) -> usize {
        self.queue.pending()
    }
}
