//! crates/attendance_core/src/notice.rs
//!
//! The notification slot of a view model: at most one live message, cleared
//! automatically after a fixed delay unless a newer message replaces it first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::domain::Notice;
use crate::signal::StateSignal;

/// How long a notice stays visible.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(3);

/// A cloneable handle to one notification slot.
///
/// Setting or clearing needs to happen inside a Tokio runtime, since expiry is
/// driven by a spawned timer. The timer is aborted when the last handle drops.
#[derive(Clone)]
pub struct NoticeBoard {
    inner: Arc<NoticeInner>,
}

struct NoticeInner {
    current: Mutex<Option<Notice>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Bumped on every set/clear; a timer only clears the generation it was started for.
    generation: AtomicU64,
    timeout: Duration,
    signal: StateSignal,
}

impl NoticeBoard {
    pub fn new(signal: StateSignal) -> Self {
        Self::with_timeout(signal, NOTICE_TIMEOUT)
    }

    pub fn with_timeout(signal: StateSignal, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(NoticeInner {
                current: Mutex::new(None),
                timer: Mutex::new(None),
                generation: AtomicU64::new(0),
                timeout,
                signal,
            }),
        }
    }

    pub fn current(&self) -> Option<Notice> {
        lock(&self.inner.current).clone()
    }

    /// Replaces the current notice and restarts the countdown.
    pub fn set(&self, notice: Notice) {
        let generation = {
            let mut current = lock(&self.inner.current);
            *current = Some(notice);
            self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let weak = Arc::downgrade(&self.inner);
        let timeout = self.inner.timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            expire(weak, generation);
        });
        if let Some(previous) = lock(&self.inner.timer).replace(timer) {
            previous.abort();
        }
        self.inner.signal.notify();
    }

    pub fn clear(&self) {
        let had_notice = {
            let mut current = lock(&self.inner.current);
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            current.take().is_some()
        };
        if let Some(timer) = lock(&self.inner.timer).take() {
            timer.abort();
        }
        if had_notice {
            self.inner.signal.notify();
        }
    }
}

fn expire(weak: Weak<NoticeInner>, generation: u64) {
    // The owning view model may be gone already.
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let cleared = {
        let mut current = lock(&inner.current);
        if inner.generation.load(Ordering::SeqCst) != generation {
            trace!(generation, "stale notice timer fired, ignoring");
            return;
        }
        current.take().is_some()
    };
    if cleared {
        inner.signal.notify();
    }
}

impl Drop for NoticeInner {
    fn drop(&mut self) {
        let timer = match self.timer.get_mut() {
            Ok(timer) => timer.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(timer) = timer {
            timer.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
