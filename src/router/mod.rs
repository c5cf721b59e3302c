//! Per-frame detection feedback policy.
//!
//! The router never touches interaction state. It reads an
//! [`InteractionSnapshot`] taken on the session thread and returns the feedback
//! the frame deserves, if any.

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use crate::config::RouterConfig;
use crate::detection::{spoken_label, BoundingBox};
use crate::feedback::{Cooldown, FeedbackRequest, QueueMode, DEFAULT_PULSE_INTENSITY};
use crate::interaction::{AppMode, InteractionSnapshot};

const MIN_TARGET_INTENSITY: f32 = 50.0;
const MAX_TARGET_INTENSITY: f32 = 255.0;

/// Coarse distance bucket from a normalized box height.
pub fn distance_description(h: f32) -> &'static str {
    if h > 0.5 {
        "very close"
    } else if h > 0.3 {
        "close"
    } else if h > 0.15 {
        "medium distance"
    } else {
        "far"
    }
}

/// Pulse strength for a target at horizontal center `cx`; stronger near the middle.
pub fn pulse_intensity(cx: f32) -> u8 {
    let offset = (0.5 - cx).abs();
    let raw = ((1.0 - offset) * 255.0).round();
    // NaN falls through clamp unchanged; treat it as the weakest pulse.
    if raw.is_nan() {
        return MIN_TARGET_INTENSITY as u8;
    }
    raw.clamp(MIN_TARGET_INTENSITY, MAX_TARGET_INTENSITY) as u8
}

#[derive(Debug)]
pub struct DetectionRouter {
    config: RouterConfig,
    cooldown: Cooldown,
}

impl DetectionRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            cooldown: Cooldown::new(config.speak_cooldown),
            config,
        }
    }

    /// Whether frames should reach the user at all in this state.
    pub fn accepts(snapshot: &InteractionSnapshot) -> bool {
        snapshot.detection_enabled && !snapshot.awaiting_target_confirmation
    }

    pub fn last_spoken(&self) -> Option<Instant> {
        self.cooldown.last()
    }

    /// Decide the feedback for one frame. `speaking` is the engine state at `now`.
    pub fn route(
        &mut self,
        snapshot: &InteractionSnapshot,
        boxes: &[BoundingBox],
        now: Instant,
        speaking: bool,
    ) -> Vec<FeedbackRequest> {
        if !Self::accepts(snapshot) || boxes.is_empty() {
            return Vec::new();
        }
        match (snapshot.current_mode, snapshot.target_object.as_deref()) {
            (AppMode::General, _) => self.route_general(boxes, now, speaking),
            (AppMode::Specific, Some(target)) => self.route_specific(target, boxes, now),
            (AppMode::Specific, None) | (AppMode::None, _) => Vec::new(),
        }
    }

    fn route_general(
        &mut self,
        boxes: &[BoundingBox],
        now: Instant,
        speaking: bool,
    ) -> Vec<FeedbackRequest> {
        let Some(nearest) = most_centered(boxes) else {
            return Vec::new();
        };
        if speaking || !self.cooldown.ready(now) {
            return Vec::new();
        }
        self.cooldown.mark(now);
        let text = format!(
            "{} is {}",
            spoken_label(&nearest.class_name),
            distance_description(nearest.h)
        );
        tracing::debug!(
            target: "sightline::router",
            label = %nearest.class_name,
            h = nearest.h,
            "announcing nearest object"
        );
        vec![
            FeedbackRequest::Speak {
                text,
                queue: QueueMode::Enqueue,
                tag: None,
            },
            FeedbackRequest::pulse(
                DEFAULT_PULSE_INTENSITY,
                duration_ms(self.config.general_pulse),
            ),
        ]
    }

    fn route_specific(
        &mut self,
        target: &str,
        boxes: &[BoundingBox],
        now: Instant,
    ) -> Vec<FeedbackRequest> {
        if let Some(hit) = boxes
            .iter()
            .find(|bbox| bbox.class_name.eq_ignore_ascii_case(target))
        {
            return vec![FeedbackRequest::pulse(
                pulse_intensity(hit.cx),
                duration_ms(self.config.target_pulse),
            )];
        }
        if !self.cooldown.ready(now) {
            return Vec::new();
        }
        let Some(other) = boxes
            .iter()
            .find(|bbox| !bbox.class_name.eq_ignore_ascii_case(target))
        else {
            return Vec::new();
        };
        self.cooldown.mark(now);
        vec![FeedbackRequest::say(spoken_label(&other.class_name))]
    }
}

/// First box minimizing the horizontal distance to the frame center.
fn most_centered(boxes: &[BoundingBox]) -> Option<&BoundingBox> {
    boxes.iter().fold(None, |best: Option<&BoundingBox>, bbox| match best {
        Some(current) if current.center_offset() <= bbox.center_offset() => Some(current),
        _ => Some(bbox),
    })
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
