use std::collections::VecDeque;
use std::time::Duration;

use librarian_core::Notice;
use tokio::time::Instant;

/// Most toasts kept at once; older ones are dropped first.
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub expires_at: Instant,
}

/// Transient notifications shown in the footer.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    ttl: Duration,
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            toasts: VecDeque::with_capacity(MAX_TOASTS),
        }
    }

    pub fn push(&mut self, notice: Notice) {
        self.push_at(notice, Instant::now());
    }

    pub fn push_at(&mut self, notice: Notice, now: Instant) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            notice,
            expires_at: now + self.ttl,
        });
    }

    /// Drop every toast whose time is up.
    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    /// Newest live toast.
    pub fn current(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let start = Instant::now();
        let mut q = ToastQueue::new(Duration::from_secs(4));
        q.push_at(Notice::success("Book added!"), start);
        q.push_at(Notice::info("later"), start + Duration::from_secs(2));

        q.expire(start + Duration::from_secs(3));
        assert_eq!(q.len(), 2);
        assert_eq!(q.current().unwrap().notice.message, "later");

        q.expire(start + Duration::from_secs(5));
        assert_eq!(q.len(), 1);
        q.expire(start + Duration::from_secs(7));
        assert!(q.is_empty());
    }

    #[test]
    fn oldest_dropped_when_full() {
        let start = Instant::now();
        let mut q = ToastQueue::new(Duration::from_secs(4));
        for i in 0..6 {
            q.push_at(Notice::info(format!("n{i}")), start);
        }
        assert_eq!(q.len(), MAX_TOASTS);
        assert_eq!(q.current().unwrap().notice.message, "n5");
    }
}
