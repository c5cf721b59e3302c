use std::time::Instant;

use super::{
    ActiveMode, CycleDirection, GestureEvent, InteractionSnapshot, Phase, RETURN_PROMPT,
    ROOT_PROMPT, TARGET_PROMPT,
};
use crate::config::InteractionTimings;
use crate::detection::spoken_label;
use crate::feedback::{ConfirmKind, FeedbackRequest, UtteranceTag};
use crate::gesture::Gesture;
use crate::log_debug;
use crate::timers::{TimerKey, TimerTable};

/// Sole owner and writer of the interaction state. Runs on the session thread.
#[derive(Debug)]
pub struct InteractionMachine {
    timings: InteractionTimings,
    labels: Vec<String>,
    label_index: usize,
    selected_mode: ActiveMode,
    phase: Phase,
    last_seq: u64,
}

impl InteractionMachine {
    pub fn new(labels: Vec<String>, timings: InteractionTimings) -> Self {
        Self {
            timings,
            labels,
            label_index: 0,
            selected_mode: ActiveMode::General,
            phase: Phase::Menu,
            last_seq: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn selected_mode(&self) -> ActiveMode {
        self.selected_mode
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        InteractionSnapshot {
            phase: self.phase.label(),
            current_mode: self.phase.current_mode(),
            selected_mode: self.selected_mode.as_app_mode(),
            target_object: self.phase.target().map(str::to_string),
            current_label_index: self.label_index,
            label_count: self.labels.len(),
            selecting_target: matches!(self.phase, Phase::SelectingTarget),
            awaiting_target_confirmation: matches!(self.phase, Phase::TargetPending { .. }),
            detection_enabled: self.phase.detection_enabled(),
        }
    }

    /// Spoken once the speech engine reports it is ready.
    pub fn greeting(&self) -> FeedbackRequest {
        FeedbackRequest::say(ROOT_PROMPT)
    }

    /// Give a raw gesture its meaning in the current phase. `None` means ignored.
    pub fn interpret(&self, gesture: Gesture) -> Option<GestureEvent> {
        match (gesture, &self.phase) {
            (Gesture::Hold, _) => Some(GestureEvent::HoldConfirm),
            (Gesture::TapLeft | Gesture::TapRight, Phase::Menu) => {
                Some(GestureEvent::ModeToggleTap)
            }
            (Gesture::TapLeft, Phase::SelectingTarget) => {
                Some(GestureEvent::LabelCycleTap(CycleDirection::Previous))
            }
            (Gesture::TapRight, Phase::SelectingTarget) => {
                Some(GestureEvent::LabelCycleTap(CycleDirection::Next))
            }
            // Taps in active or pending phases must not disturb navigation.
            (Gesture::TapLeft | Gesture::TapRight, _) => None,
        }
    }

    pub fn handle_gesture(
        &mut self,
        gesture: Gesture,
        now: Instant,
        timers: &mut TimerTable,
    ) -> Vec<FeedbackRequest> {
        match self.interpret(gesture) {
            Some(event) => self.handle_event(event, now, timers),
            None => Vec::new(),
        }
    }

    pub fn handle_event(
        &mut self,
        event: GestureEvent,
        now: Instant,
        timers: &mut TimerTable,
    ) -> Vec<FeedbackRequest> {
        match (event, &self.phase) {
            (GestureEvent::ModeToggleTap, Phase::Menu) => {
                self.selected_mode = self.selected_mode.toggled();
                vec![FeedbackRequest::say(format!(
                    "{} mode",
                    self.selected_mode.name()
                ))]
            }
            (GestureEvent::HoldConfirm, Phase::Menu) => {
                let mode = self.selected_mode;
                let tag = self.next_tag(ConfirmKind::Mode);
                self.enter(Phase::ModePending { mode, tag }, timers);
                self.arm_confirm_timeout(now, timers);
                vec![FeedbackRequest::say_tagged(
                    format!("{} mode selected", mode.name()),
                    tag,
                )]
            }
            (GestureEvent::LabelCycleTap(direction), Phase::SelectingTarget) => {
                let Some(label) = self.cycle_label(direction) else {
                    return Vec::new();
                };
                vec![FeedbackRequest::say(spoken_label(&label))]
            }
            (GestureEvent::HoldConfirm, Phase::SelectingTarget) => {
                let Some(target) = self.labels.get(self.label_index).cloned() else {
                    return Vec::new();
                };
                let tag = self.next_tag(ConfirmKind::Target);
                let text = format!("{} selected", spoken_label(&target));
                crate::log_debug_content(&format!("target chosen: {target}"));
                self.enter(Phase::TargetPending { target, tag }, timers);
                self.arm_confirm_timeout(now, timers);
                vec![FeedbackRequest::say_tagged(text, tag)]
            }
            (
                GestureEvent::HoldConfirm,
                Phase::ModePending { .. }
                | Phase::ActiveGeneral
                | Phase::AwaitingTargetPrompt
                | Phase::TargetPending { .. }
                | Phase::ActiveSpecific { .. },
            ) => {
                self.enter(Phase::Menu, timers);
                vec![FeedbackRequest::say(RETURN_PROMPT)]
            }
            (GestureEvent::ModeToggleTap | GestureEvent::LabelCycleTap(_), _) => Vec::new(),
        }
    }

    /// A speech completion (or failure) for `utterance_id` arrived.
    ///
    /// Only the completion of the currently pending confirmation moves the machine;
    /// anything else is late or unrelated and is dropped.
    pub fn on_utterance_finished(
        &mut self,
        utterance_id: &str,
        now: Instant,
        timers: &mut TimerTable,
    ) -> Vec<FeedbackRequest> {
        let Some(tag) = UtteranceTag::parse(utterance_id) else {
            return Vec::new();
        };
        if self.phase.pending_tag() != Some(tag) {
            log_debug(&format!(
                "ignoring stale completion {tag} in phase {}",
                self.phase.label()
            ));
            return Vec::new();
        }
        self.settle_confirmation(now, timers);
        Vec::new()
    }

    pub fn on_timer(
        &mut self,
        key: TimerKey,
        now: Instant,
        timers: &mut TimerTable,
    ) -> Vec<FeedbackRequest> {
        match (key, &self.phase) {
            (TimerKey::TargetPromptDelay, Phase::AwaitingTargetPrompt) => {
                if self.labels.is_empty() {
                    tracing::warn!(
                        target: "sightline::interaction",
                        "no selectable labels; target selection skipped"
                    );
                    return Vec::new();
                }
                self.enter(Phase::SelectingTarget, timers);
                timers.arm(
                    TimerKey::TargetPromptAnnounce,
                    now,
                    self.timings.target_announce_delay,
                );
                vec![FeedbackRequest::say(TARGET_PROMPT)]
            }
            (TimerKey::TargetPromptAnnounce, Phase::SelectingTarget) => self
                .labels
                .get(self.label_index)
                .map(|label| vec![FeedbackRequest::say(spoken_label(label))])
                .unwrap_or_default(),
            (TimerKey::ConfirmTimeout, Phase::ModePending { .. } | Phase::TargetPending { .. }) => {
                tracing::warn!(
                    target: "sightline::interaction",
                    phase = self.phase.label(),
                    "confirmation speech never completed; settling"
                );
                self.settle_confirmation(now, timers);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Drop every timer the machine owns. Used on teardown.
    pub fn shutdown(&mut self, timers: &mut TimerTable) {
        for key in [
            TimerKey::TargetPromptDelay,
            TimerKey::TargetPromptAnnounce,
            TimerKey::ConfirmTimeout,
        ] {
            timers.cancel(key);
        }
    }

    fn settle_confirmation(&mut self, now: Instant, timers: &mut TimerTable) {
        let next = match &self.phase {
            Phase::ModePending {
                mode: ActiveMode::General,
                ..
            } => Phase::ActiveGeneral,
            Phase::ModePending {
                mode: ActiveMode::Specific,
                ..
            } => Phase::AwaitingTargetPrompt,
            Phase::TargetPending { target, .. } => Phase::ActiveSpecific {
                target: target.clone(),
            },
            _ => return,
        };
        self.enter(next, timers);
        if matches!(self.phase, Phase::AwaitingTargetPrompt) {
            timers.arm(
                TimerKey::TargetPromptDelay,
                now,
                self.timings.target_prompt_delay,
            );
        }
    }

    fn cycle_label(&mut self, direction: CycleDirection) -> Option<String> {
        let count = self.labels.len();
        if count == 0 {
            return None;
        }
        self.label_index = match direction {
            CycleDirection::Previous => (self.label_index + count - 1) % count,
            CycleDirection::Next => (self.label_index + 1) % count,
        };
        self.labels.get(self.label_index).cloned()
    }

    fn next_tag(&mut self, kind: ConfirmKind) -> UtteranceTag {
        self.last_seq += 1;
        UtteranceTag::new(kind, self.last_seq)
    }

    fn arm_confirm_timeout(&self, now: Instant, timers: &mut TimerTable) {
        if let Some(timeout) = self.timings.confirm_timeout {
            timers.arm(TimerKey::ConfirmTimeout, now, timeout);
        }
    }

    /// Switch phase and cancel the timers the new phase has no use for.
    fn enter(&mut self, next: Phase, timers: &mut TimerTable) {
        for key in [
            TimerKey::TargetPromptDelay,
            TimerKey::TargetPromptAnnounce,
            TimerKey::ConfirmTimeout,
        ] {
            if !keeps_timer(&next, key) {
                timers.cancel(key);
            }
        }
        tracing::info!(
            target: "sightline::interaction",
            from = self.phase.label(),
            to = next.label(),
            "phase transition"
        );
        self.phase = next;
    }
}

fn keeps_timer(phase: &Phase, key: TimerKey) -> bool {
    match key {
        TimerKey::Hold => true,
        TimerKey::TargetPromptDelay => matches!(phase, Phase::AwaitingTargetPrompt),
        TimerKey::TargetPromptAnnounce => matches!(phase, Phase::SelectingTarget),
        TimerKey::ConfirmTimeout => {
            matches!(phase, Phase::ModePending { .. } | Phase::TargetPending { .. })
        }
    }
}
