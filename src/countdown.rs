use std::time::{Duration, Instant};

/// Cancellable periodic task. Time is supplied by the caller so the owner
/// decides when ticks are delivered.
#[derive(Debug, Clone)]
pub struct Countdown {
    period: Duration,
    next_due: Option<Instant>,
}

impl Countdown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// (Re)arm the task; any previous schedule is dropped.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Consume one tick if it is due at `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(due + self.period);
                true
            }
            _ => false,
        }
    }
}
