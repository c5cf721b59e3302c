//! One-deadline-per-purpose timer table driven by the session loop.
//!
//! Nothing here sleeps or polls. The dispatcher asks for [`TimerTable::next_deadline`],
//! waits on a `crossbeam_channel::at` receiver for it, and then drains
//! [`TimerTable::take_expired`]. Cancelling a timer removes its entry, so a cancelled
//! timer can never fire against a state it no longer belongs to.

use std::time::{Duration, Instant};

/// What a pending deadline is for. At most one deadline per key is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKey {
    /// Press held long enough to count as a hold.
    Hold,
    /// Pause after a confirmed specific mode before prompting for a target.
    TargetPromptDelay,
    /// Pause after the target prompt before reading the label under the cursor.
    TargetPromptAnnounce,
    /// Give up waiting for a confirmation utterance to complete.
    ConfirmTimeout,
}

impl TimerKey {
    pub const ALL: [TimerKey; 4] = [
        TimerKey::Hold,
        TimerKey::TargetPromptDelay,
        TimerKey::TargetPromptAnnounce,
        TimerKey::ConfirmTimeout,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKey::Hold => 0,
            TimerKey::TargetPromptDelay => 1,
            TimerKey::TargetPromptAnnounce => 2,
            TimerKey::ConfirmTimeout => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerKey::Hold => "hold",
            TimerKey::TargetPromptDelay => "target_prompt_delay",
            TimerKey::TargetPromptAnnounce => "target_prompt_announce",
            TimerKey::ConfirmTimeout => "confirm_timeout",
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerTable {
    deadlines: [Option<Instant>; TimerKey::ALL.len()],
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire at `deadline`, replacing any pending deadline for it.
    pub fn arm_at(&mut self, key: TimerKey, deadline: Instant) {
        self.deadlines[key.slot()] = Some(deadline);
    }

    pub fn arm(&mut self, key: TimerKey, now: Instant, delay: Duration) {
        self.arm_at(key, now + delay);
    }

    /// Returns true when a pending deadline was removed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines[key.slot()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = Default::default();
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.deadlines[key.slot()].is_some()
    }

    pub fn deadline(&self, key: TimerKey) -> Option<Instant> {
        self.deadlines[key.slot()]
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Remove and return the earliest key whose deadline is at or before `now`.
    ///
    /// Handlers may cancel or re-arm other timers, so callers that react to each
    /// expiry should drain with this rather than [`TimerTable::take_expired`].
    pub fn pop_expired(&mut self, now: Instant) -> Option<TimerKey> {
        let key = TimerKey::ALL
            .iter()
            .filter_map(|key| self.deadlines[key.slot()].map(|deadline| (deadline, *key)))
            .filter(|(deadline, _)| *deadline <= now)
            .min_by_key(|(deadline, _)| *deadline)
            .map(|(_, key)| key)?;
        self.deadlines[key.slot()] = None;
        Some(key)
    }

    /// Remove and return every key whose deadline is at or before `now`, earliest first.
    pub fn take_expired(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut expired: Vec<(Instant, TimerKey)> = TimerKey::ALL
            .iter()
            .filter_map(|key| match self.deadlines[key.slot()] {
                Some(deadline) if deadline <= now => Some((deadline, *key)),
                _ => None,
            })
            .collect();
        expired.sort_by_key(|(deadline, _)| *deadline);
        for (_, key) in &expired {
            self.deadlines[key.slot()] = None;
        }
        expired.into_iter().map(|(_, key)| key).collect()
    }
}
