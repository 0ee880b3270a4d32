use std::time::{Duration, Instant};

/// A deadline for one deferred action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    due: Instant,
}

impl ScheduledTask {
    pub fn after(now: Instant, delay: Duration) -> Self {
        Self { due: now + delay }
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

/// Holds at most one pending task for a single purpose
#[derive(Debug, Default)]
pub struct TaskSlot {
    task: Option<ScheduledTask>,
}

impl TaskSlot {
    /// Replace any pending task with a new one
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.task = Some(ScheduledTask::after(now, delay));
    }

    /// Returns true when a task was pending
    pub fn cancel(&mut self) -> bool {
        self.task.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.task.map(|task| task.due())
    }

    /// Clear the task and report true if it is due at `now`
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.task.is_some_and(|task| task.is_due(now)) {
            self.task = None;
            true
        } else {
            false
        }
    }
}
