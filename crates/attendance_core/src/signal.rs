//! crates/attendance_core/src/signal.rs
//!
//! A change counter shared by the view models of one screen. Presentation code
//! subscribes and re-renders whenever it moves.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct StateSignal {
    revision: Arc<watch::Sender<u64>>,
}

impl StateSignal {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            revision: Arc::new(revision),
        }
    }

    /// Marks the observable state as changed.
    pub fn notify(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }
}

impl Default for StateSignal {
    fn default() -> Self {
        Self::new()
    }
}
