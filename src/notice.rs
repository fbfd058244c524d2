//! Non-blocking user notices.
//!
//! Every failure path and every rejected file ends up here as a [`Notice`]
//! instead of an interrupting alert. The host (CLI, GUI shell, test) drains
//! or dismisses them at its own pace; the flow never waits on the user.
//!
//! [`NoticeQueue`] is a cheap `Clone` handle over shared state, so the
//! widget and the coordinator can both push into the same queue.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Monotonic id, used by [`NoticeQueue::dismiss`].
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    capacity: usize,
    pending: VecDeque<Notice>,
}

/// Bounded FIFO of pending notices, shared between components.
///
/// When full, pushing drops the oldest notice.
#[derive(Debug, Clone)]
pub struct NoticeQueue {
    inner: Arc<Mutex<Inner>>,
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::with_capacity(32)
    }
}

impl NoticeQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                capacity: capacity.max(1),
                pending: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a notice and return its id.
    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let message = message.into();
        match level {
            NoticeLevel::Info | NoticeLevel::Success => info!("[notice] {}", message),
            NoticeLevel::Warning => warn!("[notice] {}", message),
            NoticeLevel::Error => error!("[notice] {}", message),
        }

        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        if inner.pending.len() == inner.capacity {
            inner.pending.pop_front();
        }
        inner.pending.push_back(Notice { id, level, message });
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message)
    }

    /// Remove one notice. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.pending.len();
        inner.pending.retain(|n| n.id != id);
        inner.pending.len() != before
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().pending.drain(..).collect()
    }

    /// Copy of the pending notices without removing them.
    pub fn pending(&self) -> Vec<Notice> {
        self.lock().pending.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_in_order() {
        let q = NoticeQueue::default();
        q.info("one");
        q.error("two");
        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "one");
        assert_eq!(drained[1].level, NoticeLevel::Error);
        assert!(q.is_empty());
    }

    #[test]
    fn dismiss_by_id() {
        let q = NoticeQueue::default();
        let a = q.warning("a");
        let b = q.warning("b");
        assert!(q.dismiss(a));
        assert!(!q.dismiss(a));
        let left = q.pending();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b);
    }

    #[test]
    fn bounded_drops_oldest() {
        let q = NoticeQueue::with_capacity(2);
        q.info("1");
        q.info("2");
        q.info("3");
        let msgs: Vec<_> = q.pending().into_iter().map(|n| n.message).collect();
        assert_eq!(msgs, vec!["2", "3"]);
    }

    #[test]
    fn clones_share_state() {
        let q = NoticeQueue::default();
        let handle = q.clone();
        handle.success("done");
        assert_eq!(q.len(), 1);
    }
}
