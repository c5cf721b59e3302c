use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::lock_or_recover;

struct SlotState<T> {
    latest: Option<T>,
    closed: bool,
}

/// Single-frame mailbox between capture and the detector worker.
///
/// Publishing while a frame is still waiting replaces it; the stale frame is
/// discarded and counted, never queued.
pub struct FrameSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
    dropped: AtomicUsize,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                latest: None,
                closed: false,
            }),
            ready: Condvar::new(),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Store `frame` as the newest pending frame. Returns false once the slot is closed.
    pub fn publish(&self, frame: T) -> bool {
        let mut state = lock_or_recover(&self.state, "FrameSlot::publish");
        if state.closed {
            return false;
        }
        if state.latest.replace(frame).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        drop(state);
        self.ready.notify_one();
        true
    }

    /// Block until a frame is available. `None` means the slot was closed.
    pub fn take(&self) -> Option<T> {
        let mut state = lock_or_recover(&self.state, "FrameSlot::take");
        loop {
            if let Some(frame) = state.latest.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Like [`FrameSlot::take`] but gives up after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let state = lock_or_recover(&self.state, "FrameSlot::take_timeout");
        let (mut state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |state| {
                state.latest.is_none() && !state.closed
            })
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.latest.take()
    }

    /// Wake the worker and refuse further frames. Any pending frame is discarded.
    pub fn close(&self) {
        let mut state = lock_or_recover(&self.state, "FrameSlot::close");
        state.closed = true;
        if state.latest.take().is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        drop(state);
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        lock_or_recover(&self.state, "FrameSlot::is_closed").closed
    }

    /// Frames replaced before the worker got to them.
    pub fn dropped_frames(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}
