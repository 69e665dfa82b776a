//! Quiescence timer for text inputs that trigger fetches.

use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Fires once after input events stop arriving for `wait`.
///
/// Each [`touch`](Debouncer::touch) pushes the deadline back; the owner polls
/// [`fire`](Debouncer::fire) from its tick loop (or awaits
/// [`settled`](Debouncer::settled)) and runs the action when it returns true.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Record an input event now.
    pub fn touch(&mut self) {
        self.touch_at(Instant::now());
    }

    pub fn touch_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once per quiet period, when the deadline has passed.
    pub fn fire(&mut self) -> bool {
        self.fire_at(Instant::now())
    }

    pub fn fire_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Wait for the pending deadline and consume it. Returns immediately with
    /// `false` when nothing is pending.
    pub async fn settled(&mut self) -> bool {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.fire_at(deadline)
            }
            None => false,
        }
    }
}
